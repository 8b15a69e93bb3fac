//! The generative-AI collaborator and the page fetcher used alongside it.
//!
//! Both are optional at runtime. Callers check for their presence before
//! building prompts, so an unconfigured assistant is never called.

use std::future::Future;

pub trait Assistant: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Complete `prompt`, returning the model's text. An empty reply is
  /// reported as an error by implementations.
  fn complete(
    &self,
    prompt: &str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Fetches the HTML of a recipe page.
pub trait PageSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch(
    &self,
    url: &str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// `true` for absolute `http://` or `https://` URLs.
pub fn is_web_url(url: &str) -> bool {
  let lower = url.to_ascii_lowercase();
  ["http://", "https://"]
    .iter()
    .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}
