//! Slash commands.

use chefbot_core::{
  assistant::{Assistant, PageSource, is_web_url},
  channel::{Messenger, Reply},
  command::{Command, RestrictionCommand},
  draft::RecipeDraft,
  ingest::{self, ASSISTANT_SOURCE},
  prompt, ratings, restrictions,
  store::Store,
  user::UserId,
};
use tracing::{error, info};

use super::Bot;
use crate::{Error, Result, reply};

impl<S, M, A, P> Bot<S, M, A, P>
where
  S: Store,
  M: Messenger,
  A: Assistant,
  P: PageSource,
{
  pub(super) async fn on_command(&self, user: UserId, text: &str) -> Result<Reply> {
    let Some(command) = Command::parse(text) else {
      info!(user, text, "unknown command");
      return Ok(reply::unknown_command());
    };
    info!(user, command = command.name(), "command");

    match command {
      Command::Start => Ok(reply::start()),
      Command::Help => Ok(reply::help()),
      Command::Id => Ok(reply::identity(user)),
      Command::History => self.history(user).await,
      Command::Restrictions(sub) => self.restrictions(user, sub).await,
      Command::Rating(Err(rejection)) => Ok(reply::rating_rejected(rejection)),
      Command::Rating(Ok(request)) => {
        let outcome = self
          .transact(move |c| ratings::rate(c, user, &request))
          .await?;
        Ok(reply::rating_saved(&outcome))
      }
      Command::Menu => {
        let recipes = self.transact(|c| c.list_recipes()).await?;
        Ok(reply::menu_list(&recipes, self.limits.menu_list))
      }
      Command::AddRecipe(description) => {
        let Some(assistant) = &self.assistant else {
          return Ok(reply::ai_disabled("/addmenu"));
        };
        let Some(description) = description else {
          return Ok(reply::add_recipe_usage());
        };
        match self.add_recipe(assistant, &description).await {
          Ok(reply) => Ok(reply),
          Err(e) => {
            error!(user, error = %e, "/addmenu failed");
            Ok(reply::add_recipe_failed())
          }
        }
      }
      Command::AddRecipeFromLink(url) => {
        let Some(assistant) = &self.assistant else {
          return Ok(reply::ai_disabled("/addmenulink"));
        };
        let Some(url) = url else {
          return Ok(reply::add_link_usage());
        };
        if !is_web_url(&url) {
          return Ok(reply::invalid_url());
        }
        match self.add_recipe_from_link(assistant, &url).await {
          Ok(reply) => Ok(reply),
          Err(e) => {
            error!(user, %url, error = %e, "/addmenulink failed");
            Ok(reply::add_link_failed())
          }
        }
      }
    }
  }

  pub(super) async fn history(&self, user: UserId) -> Result<Reply> {
    let limit = self.limits.history;
    let entries = self
      .transact(move |c| c.recent_history(user, limit))
      .await?;
    Ok(reply::history(&entries))
  }

  pub(super) async fn restrictions(
    &self,
    user: UserId,
    command: RestrictionCommand,
  ) -> Result<Reply> {
    match command {
      RestrictionCommand::List => {
        let entries = self
          .transact(move |c| restrictions::list(c, user))
          .await?;
        Ok(reply::restriction_list(&entries))
      }
      RestrictionCommand::Add { phrase, kind } => {
        let added = self
          .transact(move |c| restrictions::add(c, user, &phrase, kind))
          .await?;
        info!(
          user,
          %kind,
          added = added.added,
          updated = added.updated,
          "restrictions applied"
        );
        Ok(reply::restrictions_added(&added))
      }
      RestrictionCommand::Remove { fragment } => {
        let needle = fragment.clone();
        let removed = self
          .transact(move |c| restrictions::remove(c, user, &needle))
          .await?;
        Ok(reply::restrictions_removed(&fragment, &removed))
      }
      RestrictionCommand::Usage(usage) => Ok(reply::restriction_usage(usage)),
    }
  }

  /// Ask the assistant for a recipe record and save it. The record is
  /// validated before the store is touched.
  async fn add_recipe(&self, assistant: &A, description: &str) -> Result<Reply> {
    let completion = assistant
      .complete(&prompt::recipe_from_description(description))
      .await
      .map_err(Error::assistant)?;
    let draft = RecipeDraft::from_reply(&completion)?;
    let ingested = self
      .transact(move |c| ingest::ingest(c, &draft, Some(ASSISTANT_SOURCE)))
      .await?;
    info!(
      recipe = ingested.recipe.id,
      created = ingested.created,
      "recipe saved from description"
    );
    Ok(reply::recipe_added(&ingested))
  }

  async fn add_recipe_from_link(&self, assistant: &A, url: &str) -> Result<Reply> {
    let html = self.pages.fetch(url).await.map_err(Error::page)?;
    let completion = assistant
      .complete(&prompt::recipe_from_page(url, &html))
      .await
      .map_err(Error::assistant)?;
    let draft = RecipeDraft::from_reply(&completion)?;
    let source = url.to_owned();
    let ingested = self
      .transact(move |c| ingest::ingest(c, &draft, Some(&source)))
      .await?;
    info!(
      recipe = ingested.recipe.id,
      created = ingested.created,
      "recipe saved from link"
    );
    Ok(reply::recipe_added_from_link(&ingested))
  }
}
