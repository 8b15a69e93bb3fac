//! Inline-button presses.
//!
//! Each action mirrors the command it stands for and uses the same managers,
//! so a button and its command leave the same rows behind.

use chefbot_core::{
  assistant::{Assistant, PageSource},
  callback::CallbackAction,
  channel::{Ack, Messenger, Reply},
  command::RestrictionCommand,
  ratings,
  store::Store,
  user::UserId,
};
use tracing::debug;

use super::Bot;
use crate::{Result, reply};

impl<S, M, A, P> Bot<S, M, A, P>
where
  S: Store,
  M: Messenger,
  A: Assistant,
  P: PageSource,
{
  /// The reply (if any) and the acknowledgement for one button press.
  pub(super) async fn on_button(
    &self,
    user: UserId,
    payload: &str,
  ) -> Result<(Option<Reply>, Ack)> {
    self.transact(move |c| c.ensure_user(user)).await?;
    let action = CallbackAction::parse(payload);
    let shown = |reply: Reply| (Some(reply), Ack::plain());

    Ok(match action {
      CallbackAction::History => (
        Some(self.history(user).await?),
        Ack::toast(reply::ACK_HISTORY_SHOWN),
      ),
      CallbackAction::Help => shown(reply::help()),
      CallbackAction::ManageRestrictions => shown(reply::manage_restrictions()),
      CallbackAction::ViewRestrictions => {
        shown(self.restrictions(user, RestrictionCommand::List).await?)
      }
      CallbackAction::MenuList => {
        let recipes = self.transact(|c| c.list_recipes()).await?;
        shown(reply::menu_list_with_actions(&recipes, self.limits.menu_list))
      }
      CallbackAction::MenuAdd => shown(reply::menu_add_hint()),
      CallbackAction::MenuAddLink => shown(reply::menu_add_link_hint()),
      CallbackAction::Recommend => shown(self.recommendations().await?),
      CallbackAction::Rate { recipe_id, score } => {
        let outcome = self
          .transact(move |c| ratings::rate_score(c, user, recipe_id, score))
          .await?;
        let ack = match outcome {
          ratings::RatingOutcome::UnknownRecipe(_) => Ack::plain(),
          _ => Ack::toast(reply::ACK_THANKS_FOR_RATING),
        };
        (Some(reply::rating_button_saved(&outcome)), ack)
      }
      CallbackAction::ScoreOutOfRange => {
        (None, Ack::alert(reply::ACK_SCORE_OUT_OF_RANGE))
      }
      CallbackAction::Malformed | CallbackAction::Unknown => {
        debug!(user, payload, "ignoring button payload");
        (None, Ack::plain())
      }
    })
  }
}
