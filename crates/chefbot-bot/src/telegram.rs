//! Telegram Bot API client: the live [`Messenger`].

use std::time::Duration;

use chefbot_core::channel::{Ack, ChatId, Format, Keyboard, Messenger, Reply};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Error, Result, TelegramConfig};

const SEND_TIMEOUT: Duration = Duration::from_secs(15);
const ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramClient {
  client:   Client,
  base_url: String,
}

#[derive(Serialize)]
struct InlineButton<'a> {
  text:          &'a str,
  callback_data: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
  ok:          bool,
  #[serde(default)]
  description: Option<String>,
}

impl TelegramClient {
  pub fn new(config: &TelegramConfig) -> Result<Self> {
    let client = Client::builder().timeout(SEND_TIMEOUT).build()?;
    Ok(Self {
      client,
      base_url: format!(
        "{}/bot{}",
        config.api_base.trim_end_matches('/'),
        config.token
      ),
    })
  }

  async fn call(
    &self,
    method: &str,
    body: serde_json::Value,
    timeout: Duration,
  ) -> Result<()> {
    let response = self
      .client
      .post(format!("{}/{method}", self.base_url))
      .timeout(timeout)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    let parsed: ApiResponse = response.json().await?;
    if !parsed.ok {
      return Err(Error::Telegram(format!(
        "{method} → {status}: {}",
        parsed.description.unwrap_or_default()
      )));
    }
    Ok(())
  }
}

fn inline_keyboard(keyboard: &Keyboard) -> Vec<Vec<InlineButton<'_>>> {
  keyboard
    .iter()
    .map(|row| {
      row
        .iter()
        .map(|b| InlineButton {
          text:          &b.label,
          callback_data: &b.payload,
        })
        .collect()
    })
    .collect()
}

/// The `sendMessage` body for a reply.
fn message_body(chat: ChatId, reply: &Reply) -> serde_json::Value {
  let mut body = json!({ "chat_id": chat, "text": reply.text });
  if reply.format == Format::Markdown {
    body["parse_mode"] = json!("Markdown");
  }
  if !reply.keyboard.is_empty() {
    body["reply_markup"] =
      json!({ "inline_keyboard": inline_keyboard(&reply.keyboard) });
  }
  body
}

impl Messenger for TelegramClient {
  type Error = Error;

  async fn send(&self, chat: ChatId, reply: &Reply) -> Result<()> {
    self
      .call("sendMessage", message_body(chat, reply), SEND_TIMEOUT)
      .await
  }

  async fn acknowledge(&self, callback_id: &str, ack: &Ack) -> Result<()> {
    let mut body = json!({ "callback_query_id": callback_id });
    if let Some(text) = &ack.text {
      body["text"] = json!(text);
    }
    if ack.alert {
      body["show_alert"] = json!(true);
    }
    self.call("answerCallbackQuery", body, ACTION_TIMEOUT).await
  }

  async fn typing(&self, chat: ChatId) -> Result<()> {
    self
      .call(
        "sendChatAction",
        json!({ "chat_id": chat, "action": "typing" }),
        ACTION_TIMEOUT,
      )
      .await
  }
}
