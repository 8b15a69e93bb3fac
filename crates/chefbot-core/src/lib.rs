//! Core types and decision logic for ChefBot.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the catalog entities, the storage and collaborator traits, and the
//! logic that turns one inbound message into catalog reads and writes:
//! text normalization, recipe matching, intent and command recognition, and
//! the restriction, rating and ingestion managers.

pub mod answer;
pub mod assistant;
pub mod callback;
pub mod channel;
pub mod command;
pub mod draft;
pub mod error;
pub mod ingest;
pub mod intent;
pub mod matcher;
pub mod normalize;
pub mod prompt;
pub mod ratings;
pub mod recipe;
pub mod recommend;
pub mod restrictions;
pub mod store;
pub mod turn;
pub mod user;

pub use error::{Error, Result};
