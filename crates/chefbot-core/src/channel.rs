//! The `Messenger` trait and the message shapes it delivers.
//!
//! Implemented by the messaging transport (e.g. the Telegram client in
//! `chefbot-bot`). Delivery failures are reported to the caller, which logs
//! them and carries on.

use std::future::Future;

use serde::{Deserialize, Serialize};

pub type ChatId = i64;

/// An inline button: a label and the opaque payload sent back when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
  pub label:   String,
  pub payload: String,
}

impl Button {
  pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
    Self {
      label:   label.into(),
      payload: payload.into(),
    }
  }
}

/// Rows of buttons, top to bottom.
pub type Keyboard = Vec<Vec<Button>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
  #[default]
  Markdown,
  Plain,
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
  pub text:     String,
  pub format:   Format,
  pub keyboard: Keyboard,
}

impl Reply {
  pub fn markdown(text: impl Into<String>) -> Self {
    Self {
      text:     text.into(),
      format:   Format::Markdown,
      keyboard: Vec::new(),
    }
  }

  /// Text sent without markup, for content that may contain stray `*`/`_`.
  pub fn plain(text: impl Into<String>) -> Self {
    Self {
      format: Format::Plain,
      ..Self::markdown(text)
    }
  }

  pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
    self.keyboard = keyboard;
    self
  }
}

/// The answer to a button press.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
  pub text:  Option<String>,
  /// Show `text` as a modal alert instead of a toast.
  pub alert: bool,
}

impl Ack {
  pub fn plain() -> Self { Self::default() }

  pub fn toast(text: impl Into<String>) -> Self {
    Self {
      text:  Some(text.into()),
      alert: false,
    }
  }

  pub fn alert(text: impl Into<String>) -> Self {
    Self {
      text:  Some(text.into()),
      alert: true,
    }
  }
}

/// Outbound side of the messaging platform.
pub trait Messenger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send(
    &self,
    chat: ChatId,
    reply: &Reply,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Answer a callback query. Must be called once per button press.
  fn acknowledge(
    &self,
    callback_id: &str,
    ack: &Ack,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Show a "typing..." indicator in the chat.
  fn typing(
    &self,
    chat: ChatId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
