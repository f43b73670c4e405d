//! Adapters for the upstream translation services.
//!
//! Each adapter makes exactly one HTTP call and folds every way that call can
//! go wrong into [`ProviderOutcome::Failure`]. Nothing in here returns an
//! error to the caller.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Why a single provider call did not produce a usable translation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection failure, timeout, or an unreadable body
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    /// Well-formed exchange, but no translated text we can use
    #[error("unusable response: {0}")]
    Content(String),
}

/// Result of asking one provider for a translation.
#[derive(Debug)]
pub enum ProviderOutcome {
    Success(String),
    Failure(ProviderError),
    /// Nothing to translate; no request was made
    Skipped,
}

/// A translation service in the fallback chain.
///
/// Variants share one contract (`translate`) and differ only in request
/// shape, endpoint and response parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// LibreTranslate: JSON POST, source language auto-detected
    LibreTranslate { url: String },
    /// MyMemory: GET with query parameters, result nested under `responseData`
    MyMemory { url: String },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::LibreTranslate { .. } => "LibreTranslate",
            Provider::MyMemory { .. } => "MyMemory",
        }
    }

    /// Ask this provider to translate `text` into `target_language`.
    ///
    /// The language code is passed through unchecked. Request timeout and
    /// `User-Agent` come from `client`.
    pub async fn translate(
        &self,
        client: &reqwest::Client,
        text: &str,
        target_language: &str,
    ) -> ProviderOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ProviderOutcome::Skipped;
        }

        let result = match self {
            Provider::LibreTranslate { url } => {
                libretranslate(client, url, text, target_language).await
            }
            Provider::MyMemory { url } => mymemory(client, url, text, target_language).await,
        };

        match result {
            Ok(translated) => ProviderOutcome::Success(translated),
            Err(e) => {
                warn!("{} translation to '{}' failed: {}", self.name(), target_language, e);
                ProviderOutcome::Failure(e)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

async fn libretranslate(
    client: &reqwest::Client,
    url: &str,
    text: &str,
    target_language: &str,
) -> Result<String, ProviderError> {
    let request = LibreRequest {
        q: text,
        source: "auto",
        target: target_language,
        format: "text",
    };

    let response = client.post(url).json(&request).send().await?;
    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status()));
    }

    let body: LibreResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Content(format!("malformed body: {}", e)))?;

    non_blank(body.translated_text)
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseStatus", default)]
    response_status: serde_json::Value,
    #[serde(rename = "responseData")]
    response_data: Option<MyMemoryData>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

async fn mymemory(
    client: &reqwest::Client,
    url: &str,
    text: &str,
    target_language: &str,
) -> Result<String, ProviderError> {
    let langpair = format!("en|{}", target_language);

    let response = client
        .get(url)
        .query(&[("q", text), ("langpair", langpair.as_str())])
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status()));
    }

    let body: MyMemoryResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Content(format!("malformed body: {}", e)))?;

    // MyMemory reports quota and validation errors with HTTP 200 and a
    // different responseStatus; the error text then sits in translatedText.
    if !is_status_ok(&body.response_status) {
        return Err(ProviderError::Content(format!(
            "responseStatus {}",
            body.response_status
        )));
    }

    non_blank(body.response_data.and_then(|d| d.translated_text))
}

/// `responseStatus` arrives as a number or as a numeric string.
fn is_status_ok(status: &serde_json::Value) -> bool {
    match status {
        serde_json::Value::Number(n) => n.as_u64() == Some(200),
        serde_json::Value::String(s) => s.trim() == "200",
        _ => false,
    }
}

fn non_blank(text: Option<String>) -> Result<String, ProviderError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        Some(_) => Err(ProviderError::Content("empty translation".to_string())),
        None => Err(ProviderError::Content("missing translatedText".to_string())),
    }
}
