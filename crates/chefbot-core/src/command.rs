//! Slash-command recognition and argument parsing.
//!
//! Parsing never touches storage. Argument problems that can be detected
//! from the text alone are returned as values so the dispatcher can answer
//! with a usage message.

use crate::{
  recipe::RecipeId,
  user::{RestrictionKind, Score},
};

/// A recognised command with its parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  Start,
  Help,
  /// Echo the sender's platform identity.
  Id,
  History,
  Restrictions(RestrictionCommand),
  Rating(Result<RatingRequest, RatingRejection>),
  Menu,
  /// Create a recipe from a free-text description. `None` if no
  /// description was given.
  AddRecipe(Option<String>),
  /// Extract a recipe from a web page. `None` if no URL was given.
  AddRecipeFromLink(Option<String>),
}

// Command words and their aliases. Matching is on the whole first word, so
// `/addmenulink` is never taken for `/addmenu`.
const COMMANDS: &[(&str, CommandWord)] = &[
  ("/start", CommandWord::Start),
  ("/help", CommandWord::Help),
  ("/id", CommandWord::Id),
  ("/history", CommandWord::History),
  ("/pantang", CommandWord::Restrictions),
  ("/rating", CommandWord::Rating),
  ("/menu", CommandWord::Menu),
  ("/addmenu", CommandWord::AddRecipe),
  ("/buatmenu", CommandWord::AddRecipe),
  ("/addmenulink", CommandWord::AddRecipeFromLink),
  ("/addmenufromlink", CommandWord::AddRecipeFromLink),
];

#[derive(Debug, Clone, Copy)]
enum CommandWord {
  Start,
  Help,
  Id,
  History,
  Restrictions,
  Rating,
  Menu,
  AddRecipe,
  AddRecipeFromLink,
}

impl Command {
  /// `true` if `text` should be routed to the command dispatcher, whether or
  /// not [`Command::parse`] recognises it.
  pub fn is_command(text: &str) -> bool { text.trim_start().starts_with('/') }

  /// Recognise a command. Returns `None` for anything that is not a known
  /// command word (case-insensitive, an `@botname` suffix is ignored).
  pub fn parse(text: &str) -> Option<Self> {
    let (word, args) = split_word(text.trim());
    let word = word.to_lowercase();
    let word = word.split('@').next().unwrap_or_default();
    let (_, kind) = COMMANDS.iter().find(|(name, _)| *name == word)?;

    Some(match kind {
      CommandWord::Start => Self::Start,
      CommandWord::Help => Self::Help,
      CommandWord::Id => Self::Id,
      CommandWord::History => Self::History,
      CommandWord::Restrictions => {
        Self::Restrictions(RestrictionCommand::parse(args))
      }
      CommandWord::Rating => Self::Rating(RatingRequest::parse(args)),
      CommandWord::Menu => Self::Menu,
      CommandWord::AddRecipe => Self::AddRecipe(non_empty(args)),
      CommandWord::AddRecipeFromLink => {
        Self::AddRecipeFromLink(non_empty(args))
      }
    })
  }

  /// A short label for logging.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Start => "start",
      Self::Help => "help",
      Self::Id => "id",
      Self::History => "history",
      Self::Restrictions(_) => "pantang",
      Self::Rating(_) => "rating",
      Self::Menu => "menu",
      Self::AddRecipe(_) => "addmenu",
      Self::AddRecipeFromLink(_) => "addmenulink",
    }
  }
}

// ─── /pantang ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RestrictionCommand {
  List,
  Add { phrase: String, kind: RestrictionKind },
  Remove { fragment: String },
  Usage(RestrictionUsage),
}

/// Which help text a malformed `/pantang` invocation gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionUsage {
  /// `add` without an ingredient phrase.
  Add,
  /// `add` where the only token was a kind.
  EmptyIngredient,
  /// `remove` without a fragment.
  Remove,
  /// Unrecognised subcommand.
  Unknown,
}

impl RestrictionCommand {
  /// Parse the arguments after `/pantang`. No subcommand means `list`.
  pub fn parse(args: &str) -> Self {
    let (sub, rest) = split_word(args);
    match sub.to_lowercase().as_str() {
      "" | "list" => Self::List,
      "tambah" | "add" | "+" => Self::parse_add(rest),
      "hapus" | "del" | "delete" | "-" => {
        if rest.is_empty() {
          Self::Usage(RestrictionUsage::Remove)
        } else {
          Self::Remove { fragment: rest.to_owned() }
        }
      }
      _ => Self::Usage(RestrictionUsage::Unknown),
    }
  }

  /// The trailing token names the kind only if it is a kind word; otherwise
  /// the whole remainder is the ingredient phrase.
  fn parse_add(rest: &str) -> Self {
    if rest.is_empty() {
      return Self::Usage(RestrictionUsage::Add);
    }
    let (head, last) = match rest.rsplit_once(char::is_whitespace) {
      Some((head, last)) => (head.trim(), last),
      None => ("", rest),
    };
    match RestrictionKind::from_token(last) {
      Some(_) if head.is_empty() => {
        Self::Usage(RestrictionUsage::EmptyIngredient)
      }
      Some(kind) => Self::Add { phrase: head.to_owned(), kind },
      None => Self::Add {
        phrase: rest.to_owned(),
        kind:   RestrictionKind::Avoid,
      },
    }
  }
}

// ─── /rating ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RatingRequest {
  pub recipe_id: RecipeId,
  pub score:     Score,
  /// The remainder of the line; `None` leaves an existing review untouched.
  pub review:    Option<String>,
}

/// Rating arguments that fail validation before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingRejection {
  /// Fewer than two arguments.
  Usage,
  NotNumeric,
  ScoreOutOfRange,
}

impl RatingRequest {
  /// Parse `<recipe_id> <score> [review...]`.
  pub fn parse(args: &str) -> Result<Self, RatingRejection> {
    let (id, rest) = split_word(args);
    let (score, review) = split_word(rest);
    if id.is_empty() || score.is_empty() {
      return Err(RatingRejection::Usage);
    }
    let (Ok(recipe_id), Ok(score)) = (id.parse::<i64>(), score.parse::<i64>())
    else {
      return Err(RatingRejection::NotNumeric);
    };
    let score = Score::new(score).ok_or(RatingRejection::ScoreOutOfRange)?;
    Ok(Self {
      recipe_id,
      score,
      review: non_empty(review),
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Split off the first whitespace-delimited word; the rest is trimmed.
fn split_word(s: &str) -> (&str, &str) {
  let s = s.trim_start();
  match s.split_once(char::is_whitespace) {
    Some((word, rest)) => (word, rest.trim()),
    None => (s.trim_end(), ""),
  }
}

fn non_empty(s: &str) -> Option<String> {
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_owned())
}
