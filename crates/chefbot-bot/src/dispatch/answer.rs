//! Free-text recipe queries.
//!
//! The catalog is read in one transaction, the assistant is called outside
//! any transaction, and the view is recorded in a second one. A failed
//! assistant call ends the turn before anything is written.

use chefbot_core::{
  answer,
  assistant::{Assistant, PageSource},
  channel::{Messenger, Reply},
  prompt,
  store::Store,
  user::{NewHistoryEntry, UserId},
};
use tracing::info;

use super::Bot;
use crate::{Error, Result, reply};

impl<S, M, A, P> Bot<S, M, A, P>
where
  S: Store,
  M: Messenger,
  A: Assistant,
  P: PageSource,
{
  /// The answer, then either the rating buttons for the primary match or
  /// a hint when nothing matched.
  pub(super) async fn on_free_text(
    &self,
    user: UserId,
    text: &str,
  ) -> Result<Vec<Reply>> {
    let matcher = self.matcher();
    let query = text.to_owned();
    let lookup = self
      .transact(move |c| answer::lookup(c, user, &query, &matcher))
      .await?;
    info!(user, matches = lookup.matches.len(), "free-text lookup");

    let context = prompt::menu_context(&lookup);
    let mut body = match &self.assistant {
      Some(assistant) => assistant
        .complete(&prompt::chef_answer(text, &context))
        .await
        .map_err(Error::assistant)?,
      None => reply::database_answer(&context),
    };

    if let Some(url) = lookup.primary().and_then(|r| r.source_url.as_deref()) {
      body.push_str("\n\n");
      body.push_str(&reply::source_note(url));
    }
    if let Some(warnings) = reply::warnings(&lookup) {
      body.push_str("\n\n");
      body.push_str(&warnings);
    }

    let Some(primary) = lookup.primary().cloned() else {
      return Ok(vec![Reply::plain(body), reply::no_match_hint()]);
    };

    let entry = NewHistoryEntry::new(user, primary.id, text);
    self.transact(move |c| c.append_history(&entry)).await?;

    Ok(vec![Reply::plain(body), reply::rating_prompt(&primary)])
  }
}
