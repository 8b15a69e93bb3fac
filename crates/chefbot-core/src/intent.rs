//! Pattern-based recognition of non-recipe messages.
//!
//! Patterns run against the lowercased raw text rather than normalized
//! tokens: small-talk depends on phrase fragments that normalization would
//! break apart.

use std::sync::LazyLock;

use regex::RegexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
  Greeting,
  Farewell,
  Thanks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
  /// The user is undecided or asks for ideas.
  Recommendation,
  SmallTalk(SmallTalk),
}

static RECOMMENDATION: LazyLock<RegexSet> = LazyLock::new(|| {
  RegexSet::new([
    r"\bbingung\b.*\bmasak\b",
    r"\bkasih(kan)?\s*ide\b",
    r"\brekom(endasi)?\b",
    r"\bmasak apa\b",
  ])
  .expect("recommendation patterns compile")
});

static SMALL_TALK: LazyLock<Vec<(SmallTalk, RegexSet)>> = LazyLock::new(|| {
  let set = |patterns: &[&str]| {
    RegexSet::new(patterns).expect("small-talk patterns compile")
  };
  vec![
    (
      SmallTalk::Greeting,
      set(&[
        r"\bhalo+\b",
        r"\bhai+\b",
        r"\bhallo+\b",
        r"\bselamat\s*(pagi|siang|sore|malam)\b",
      ]),
    ),
    (
      SmallTalk::Farewell,
      set(&[r"\bbye+\b", r"\bdada(h)?\b", r"\bsampai jumpa\b", r"\bsee you\b"]),
    ),
    (
      SmallTalk::Thanks,
      set(&[r"\bterima kasih\b", r"\bmakasih\b", r"\bthank(s| you)\b"]),
    ),
  ]
});

/// Classify `text`. Recommendation is checked before small-talk; the first
/// category with any matching pattern wins.
pub fn classify(text: &str) -> Option<Intent> {
  let text = text.to_lowercase();
  if RECOMMENDATION.is_match(&text) {
    return Some(Intent::Recommendation);
  }
  SMALL_TALK
    .iter()
    .find(|(_, patterns)| patterns.is_match(&text))
    .map(|(label, _)| Intent::SmallTalk(*label))
}
