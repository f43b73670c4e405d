use crate::config::Config;
use crate::i18n::LanguageRegistry;
use crate::providers::{Provider, ProviderOutcome};
use anyhow::{Context, Result};
use futures::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Outcome of translating one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    /// Translated text, or the original input when no provider delivered
    pub text: String,
    /// True when a translation was attempted and every provider failed
    pub used_fallback: bool,
    /// Provider that produced `text`, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
}

impl TranslationResult {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            used_fallback: false,
            provider: None,
        }
    }
}

/// Best-effort translator over an ordered chain of providers.
///
/// Providers are tried one after another, never concurrently, and the first
/// usable translation wins. When all of them fail the caller gets the
/// original text back; no method here returns an error.
#[derive(Debug, Clone)]
pub struct Translator {
    client: reqwest::Client,
    providers: Vec<Provider>,
    pacing: Duration,
}

impl Translator {
    /// Build the production chain: LibreTranslate first, MyMemory second.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.translation_timeout)
            .user_agent(config.translation_user_agent.clone())
            .build()
            .context("Failed to build translation HTTP client")?;

        let providers = vec![
            Provider::LibreTranslate {
                url: config.libretranslate_url.clone(),
            },
            Provider::MyMemory {
                url: config.mymemory_url.clone(),
            },
        ];

        Ok(Self::with_providers(client, providers, config.translation_pacing))
    }

    pub fn with_providers(
        client: reqwest::Client,
        providers: Vec<Provider>,
        pacing: Duration,
    ) -> Self {
        Self {
            client,
            providers,
            pacing,
        }
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Translate one text, reporting which provider (if any) produced it.
    pub async fn translate(&self, text: &str, target_language: &str) -> TranslationResult {
        if needs_no_translation(target_language) || text.trim().is_empty() {
            return TranslationResult::unchanged(text);
        }

        if !LanguageRegistry::get().is_supported(target_language) {
            debug!(
                "Target language '{}' is not in the registry, passing it through",
                target_language
            );
        }

        for provider in &self.providers {
            match provider.translate(&self.client, text, target_language).await {
                ProviderOutcome::Success(translated) => {
                    debug!("Translated to '{}' via {}", target_language, provider.name());
                    return TranslationResult {
                        text: translated,
                        used_fallback: false,
                        provider: Some(provider.name()),
                    };
                }
                ProviderOutcome::Failure(_) | ProviderOutcome::Skipped => {}
            }
        }

        warn!(
            "Translation failed for text \"{}...\" to {}",
            preview(text),
            target_language
        );

        TranslationResult {
            text: text.to_string(),
            used_fallback: true,
            provider: None,
        }
    }

    /// Translate one text. Never fails; worst case returns `text` unchanged.
    pub async fn translate_one(&self, text: &str, target_language: &str) -> String {
        self.translate(text, target_language).await.text
    }

    /// Translate `texts` in order, one at a time, pausing between items.
    ///
    /// `output[i]` is always either the translation of `texts[i]` or
    /// `texts[i]` itself.
    pub async fn translate_batch(&self, texts: &[String], target_language: &str) -> Vec<String> {
        translate_batch_with(texts, target_language, self.pacing, move |text| async move {
            self.translate_one(&text, target_language).await
        })
        .await
    }
}

/// Batch driver shared by [`Translator::translate_batch`].
///
/// A panic while translating one item only costs that item its
/// translation. Anything escaping the per-item guard degrades the whole
/// batch to the input.
pub async fn translate_batch_with<F, Fut>(
    texts: &[String],
    target_language: &str,
    pacing: Duration,
    translate: F,
) -> Vec<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = String>,
{
    if texts.is_empty() {
        return Vec::new();
    }

    if needs_no_translation(target_language) {
        return texts.to_vec();
    }

    let batch = async {
        let mut translations = Vec::with_capacity(texts.len());

        for (i, text) in texts.iter().enumerate() {
            let item = AssertUnwindSafe(async { translate(text.clone()).await })
                .catch_unwind()
                .await;

            match item {
                Ok(translated) => translations.push(translated),
                Err(panic) => {
                    warn!(
                        "Translation failed for text {}: {}",
                        i + 1,
                        panic_message(panic.as_ref())
                    );
                    translations.push(text.clone());
                }
            }

            if i + 1 < texts.len() {
                tokio::time::sleep(pacing).await;
            }
        }

        translations
    };

    match AssertUnwindSafe(batch).catch_unwind().await {
        Ok(translations) => translations,
        Err(panic) => {
            error!("Batch translation error: {}", panic_message(panic.as_ref()));
            texts.to_vec()
        }
    }
}

/// Target is the language records are written in.
fn needs_no_translation(target_language: &str) -> bool {
    target_language == LanguageRegistry::get().canonical().code
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
