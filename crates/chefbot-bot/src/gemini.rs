//! Google Gemini `generateContent` client (the live [`Assistant`]) and the
//! HTTP page fetcher used by link extraction.

use std::time::Duration;

use chefbot_core::assistant::{Assistant, PageSource};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, GeminiConfig, Result};

const BASE_URL: &str =
  "https://generativelanguage.googleapis.com/v1beta/models";

const PAGE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct GeminiClient {
  client:  Client,
  model:   String,
  api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
  #[serde(default)]
  text: String,
}

impl GenerateResponse {
  /// The first candidate's text parts, concatenated and trimmed.
  fn text(&self) -> String {
    self
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect::<String>())
      .unwrap_or_default()
      .trim()
      .to_owned()
  }
}

impl GeminiClient {
  /// `None` when no API key is configured.
  pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
      return Ok(None);
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Some(Self {
      client,
      model: config.model.clone(),
      api_key: api_key.to_owned(),
    }))
  }
}

impl Assistant for GeminiClient {
  type Error = Error;

  async fn complete(&self, prompt: &str) -> Result<String> {
    let url = format!("{BASE_URL}/{}:generateContent", self.model);
    let body = GenerateRequest {
      contents: [Content {
        parts: [Part { text: prompt }],
      }],
    };

    debug!(model = %self.model, prompt_chars = prompt.len(), "gemini request");
    let response = self
      .client
      .post(&url)
      .query(&[("key", &self.api_key)])
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      warn!(%status, "gemini returned an error");
      return Err(Error::AssistantReply(format!("HTTP {status}: {detail}")));
    }

    let text = response.json::<GenerateResponse>().await?.text();
    if text.is_empty() {
      return Err(Error::AssistantReply("empty completion".to_owned()));
    }
    Ok(text)
  }
}

/// Fetches recipe pages over HTTP.
#[derive(Clone)]
pub struct PageFetcher {
  client: Client,
}

impl PageFetcher {
  pub fn new() -> Result<Self> {
    let client = Client::builder().timeout(PAGE_TIMEOUT).build()?;
    Ok(Self { client })
  }
}

impl PageSource for PageFetcher {
  type Error = Error;

  async fn fetch(&self, url: &str) -> Result<String> {
    let response = self.client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_shape() {
    let body = GenerateRequest {
      contents: [Content {
        parts: [Part { text: "halo" }],
      }],
    };
    assert_eq!(
      serde_json::to_value(&body).unwrap(),
      serde_json::json!({ "contents": [{ "parts": [{ "text": "halo" }] }] })
    );
  }

  #[test]
  fn response_text_joins_parts_of_first_candidate() {
    let response: GenerateResponse = serde_json::from_str(
      r#"{"candidates":[
           {"content":{"parts":[{"text":" Sapi "},{"text":"Rica\n"}]}},
           {"content":{"parts":[{"text":"ignored"}]}}]}"#,
    )
    .unwrap();
    assert_eq!(response.text(), "Sapi Rica");

    let blocked: GenerateResponse =
      serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)
        .unwrap();
    assert_eq!(blocked.text(), "");
    let none: GenerateResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(none.text(), "");
  }

  #[test]
  fn blank_key_disables_the_client() {
    let config = GeminiConfig {
      api_key:      "  ".into(),
      model:        "gemini-1.5-flash".into(),
      timeout_secs: 30,
    };
    assert!(GeminiClient::from_config(&config).unwrap().is_none());
  }
}
