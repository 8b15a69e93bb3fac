//! Decoding Telegram webhook updates into [`Turn`]s.
//!
//! Only the fields the dispatcher reads are modelled; everything else in the
//! update is ignored.

use chefbot_core::turn::{CallbackTurn, MessageTurn, Turn};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Update {
  #[serde(default)]
  pub message:        Option<Message>,
  #[serde(default)]
  pub edited_message: Option<Message>,
  #[serde(default)]
  pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
  pub chat: Chat,
  #[serde(default)]
  pub from: Option<Sender>,
  #[serde(default)]
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
  pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
  pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
  pub id:      String,
  #[serde(default)]
  pub from:    Option<Sender>,
  #[serde(default)]
  pub message: Option<CallbackMessage>,
  #[serde(default)]
  pub data:    Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackMessage {
  #[serde(default)]
  pub chat: Option<Chat>,
}

impl Update {
  /// Parse a webhook body. Bodies that are not a decodable update are
  /// treated as an empty update.
  pub fn from_slice(body: &[u8]) -> Self {
    serde_json::from_slice(body).unwrap_or_default()
  }

  /// Callback queries take precedence over messages; an edited message is
  /// handled like a new one.
  pub fn into_turn(self) -> Option<Turn> {
    if let Some(query) = self.callback_query {
      return Some(Turn::Callback(CallbackTurn {
        id:      query.id,
        user:    query.from.map(|f| f.id),
        chat:    query.message.and_then(|m| m.chat).map(|c| c.id),
        payload: query.data.unwrap_or_default(),
      }));
    }
    let message = self.message.or(self.edited_message)?;
    Some(Turn::Message(MessageTurn {
      chat: message.chat.id,
      user: message.from.map(|f| f.id),
      text: message.text,
    }))
  }
}
