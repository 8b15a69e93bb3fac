//! Turn dispatch: which pathway one inbound message or button press takes.
//!
//! Text turns run the cascade command → recommendation → small-talk →
//! free-text lookup. Button presses skip classification and go to the
//! callback handlers. Every pathway computes its replies first and only then
//! delivers them, so a failed turn sends one apology and nothing else.

mod answer;
mod callbacks;
mod commands;

use std::sync::Arc;

use chefbot_core::{
  assistant::{Assistant, PageSource},
  channel::{Ack, ChatId, Messenger, Reply},
  command::Command,
  intent::{self, Intent},
  matcher::Matcher,
  recommend,
  store::{Catalog, Store},
  turn::{CallbackTurn, MessageTurn, Turn},
  user::UserId,
};
use tracing::{error, info, warn};

use crate::{Error, Limits, Result, reply};

/// The dispatcher and its collaborators.
pub struct Bot<S, M, A, P> {
  store:     Arc<S>,
  messenger: M,
  /// `None` disables the AI features.
  assistant: Option<A>,
  pages:     P,
  limits:    Limits,
}

impl<S, M, A, P> Bot<S, M, A, P>
where
  S: Store,
  M: Messenger,
  A: Assistant,
  P: PageSource,
{
  pub fn new(
    store: Arc<S>,
    messenger: M,
    assistant: Option<A>,
    pages: P,
    limits: Limits,
  ) -> Self {
    Self {
      store,
      messenger,
      assistant,
      pages,
      limits,
    }
  }

  /// Handle one turn to completion. Failures are logged and answered in the
  /// chat; nothing is returned to the transport.
  pub async fn handle(&self, turn: Turn) {
    match turn {
      Turn::Message(message) => self.on_message(message).await,
      Turn::Callback(callback) => self.on_callback(callback).await,
    }
  }

  // ─── Text turns ────────────────────────────────────────────────────────────

  async fn on_message(&self, turn: MessageTurn) {
    let chat = turn.chat;
    let Some(user) = turn.user else {
      self.deliver(chat, &reply::unidentified_user()).await;
      return;
    };
    let Some(text) = turn.text else {
      self.deliver(chat, &reply::text_only()).await;
      return;
    };
    let text = text.trim();
    if text.is_empty() {
      self.deliver(chat, &reply::empty_text()).await;
      return;
    }

    if let Err(e) = self.messenger.typing(chat).await {
      warn!(chat, error = %e, "failed to send typing indicator");
    }

    match self.respond(user, text).await {
      Ok(replies) => {
        for r in &replies {
          self.deliver(chat, r).await;
        }
      }
      Err(e) => {
        error!(chat, user, error = %e, "turn failed");
        self.deliver(chat, &reply::apology()).await;
      }
    }
  }

  /// Register the sender, then run the cascade.
  async fn respond(&self, user: UserId, text: &str) -> Result<Vec<Reply>> {
    self.transact(move |c| c.ensure_user(user)).await?;

    if Command::is_command(text) {
      return self.on_command(user, text).await.map(|r| vec![r]);
    }
    match intent::classify(text) {
      Some(Intent::Recommendation) => {
        info!(user, "recommendation request");
        self.recommendations().await.map(|r| vec![r])
      }
      Some(Intent::SmallTalk(kind)) => {
        info!(user, ?kind, "small talk");
        Ok(vec![reply::small_talk(kind)])
      }
      None => self.on_free_text(user, text).await,
    }
  }

  // ─── Button presses ────────────────────────────────────────────────────────

  async fn on_callback(&self, turn: CallbackTurn) {
    let (Some(chat), Some(user)) = (turn.chat, turn.user) else {
      warn!(callback = %turn.id, "callback without chat or user");
      self.acknowledge(&turn.id, &Ack::plain()).await;
      return;
    };

    info!(chat, user, payload = %turn.payload, "callback");
    let (reply, ack) = match self.on_button(user, &turn.payload).await {
      Ok(outcome) => outcome,
      Err(e) => {
        error!(chat, user, payload = %turn.payload, error = %e, "callback failed");
        (Some(reply::apology()), Ack::plain())
      }
    };
    if let Some(reply) = &reply {
      self.deliver(chat, reply).await;
    }
    self.acknowledge(&turn.id, &ack).await;
  }

  // ─── Shared pathways ───────────────────────────────────────────────────────

  /// A uniform sample of the catalog.
  async fn recommendations(&self) -> Result<Reply> {
    let limit = self.limits.recommendations;
    let recipes = self
      .transact(move |catalog| {
        recommend::recommend(catalog, &mut rand::thread_rng(), limit)
      })
      .await?;
    Ok(reply::recommendations(&recipes))
  }

  fn matcher(&self) -> Matcher { Matcher::new(self.limits.matches) }

  /// Run one unit of work in a store transaction.
  async fn transact<T, F>(&self, work: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&dyn Catalog<Error = S::Error>) -> Result<T, S::Error>
      + Send
      + 'static,
  {
    self.store.transact(work).await.map_err(Error::store)
  }

  async fn deliver(&self, chat: ChatId, reply: &Reply) {
    if let Err(e) = self.messenger.send(chat, reply).await {
      error!(chat, error = %e, "failed to deliver reply");
    }
  }

  async fn acknowledge(&self, callback_id: &str, ack: &Ack) {
    if let Err(e) = self.messenger.acknowledge(callback_id, ack).await {
      error!(callback = %callback_id, error = %e, "failed to acknowledge callback");
    }
  }
}
