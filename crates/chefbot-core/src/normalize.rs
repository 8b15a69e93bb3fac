//! Text folding used to compare free text with recipe names.

/// Words that carry no information about which dish is meant: connectors,
/// politeness markers and generic cooking nouns.
pub const STOPWORDS: &[&str] = &[
  "resep", "tolong", "buatkan", "bikinkan", "bikin", "minta", "dong", "ya",
  "yg", "yang", "untuk", "buat", "cara", "masak", "masakan", "menu",
  "rekomendasi", "khas", "versi", "aku", "saya", "sedikit", "banget",
  "please",
];

/// Lowercase `text`, split it on every run of non-alphanumeric characters,
/// and drop stopwords. Order and duplicates are preserved.
pub fn tokens(text: &str) -> Vec<String> {
  text
    .to_lowercase()
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|t| !t.is_empty() && !STOPWORDS.iter().any(|w| w == t))
    .map(str::to_owned)
    .collect()
}

/// [`tokens`] joined by single spaces.
pub fn normalize(text: &str) -> String { tokens(text).join(" ") }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn folds_case_punctuation_and_stopwords() {
    assert_eq!(
      tokens("Tolong, resep SAPI rica-rica ya!!"),
      vec!["sapi", "rica", "rica"]
    );
  }

  #[test]
  fn empty_and_stopword_only_inputs() {
    assert!(tokens("").is_empty());
    assert!(tokens("  ...  ").is_empty());
    assert!(tokens("resep masakan dong").is_empty());
  }

  #[test]
  fn non_ascii_letters_separate_tokens() {
    assert_eq!(normalize("crème brûlée"), "cr me br l e");
  }

  #[test]
  fn normalize_is_idempotent() {
    for s in [
      "Nasi Goreng Sosis!!",
      "aku punya telur, nasi, kecap",
      "  Sapi   RICA_rica  ",
      "crème brûlée 2x",
      "",
    ] {
      let once = normalize(s);
      assert_eq!(normalize(&once), once, "input: {s:?}");
    }
  }
}
