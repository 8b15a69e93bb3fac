//! The platform-neutral shape of one inbound event.

use crate::{channel::ChatId, user::UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
  Message(MessageTurn),
  Callback(CallbackTurn),
}

/// A chat message. `user` is absent when the platform did not identify the
/// sender; `text` is absent for non-text messages (photos, stickers...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTurn {
  pub chat: ChatId,
  pub user: Option<UserId>,
  pub text: Option<String>,
}

/// An inline-button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTurn {
  pub id:      String,
  pub user:    Option<UserId>,
  /// The chat of the message carrying the button.
  pub chat:    Option<ChatId>,
  pub payload: String,
}
