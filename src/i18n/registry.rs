//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is built once on first access through a `OnceLock` and is
//! read-only afterwards, so it can be shared freely across requests.

use serde::Serialize;
use std::sync::OnceLock;

/// A supported language as exposed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English display name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Whether this is the source language of stored records
    #[serde(skip)]
    pub is_canonical: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages, in display order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language
    /// (this indicates a programming error in `default_languages`).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is in the registry.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// Code of the language records are written in. Translating into it is a no-op.
pub(crate) const CANONICAL_CODE: &str = "en";

fn default_languages() -> Vec<LanguageConfig> {
    const LANGUAGES: &[(&str, &str)] = &[
        ("en", "English"),
        ("es", "Spanish"),
        ("fr", "French"),
        ("de", "German"),
        ("it", "Italian"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("zh", "Chinese"),
        ("hi", "Hindi"),
        ("ar", "Arabic"),
        ("tr", "Turkish"),
        ("pl", "Polish"),
        ("nl", "Dutch"),
        ("sv", "Swedish"),
        ("da", "Danish"),
        ("no", "Norwegian"),
        ("fi", "Finnish"),
        ("cs", "Czech"),
        ("el", "Greek"),
        ("he", "Hebrew"),
        ("th", "Thai"),
        ("vi", "Vietnamese"),
        ("id", "Indonesian"),
        ("ms", "Malay"),
        ("tl", "Filipino"),
        ("sw", "Swahili"),
        ("bn", "Bengali"),
        ("ta", "Tamil"),
        ("te", "Telugu"),
        ("mr", "Marathi"),
        ("gu", "Gujarati"),
        ("kn", "Kannada"),
        ("ml", "Malayalam"),
        ("pa", "Punjabi"),
        ("ur", "Urdu"),
    ];

    LANGUAGES
        .iter()
        .map(|&(code, name)| LanguageConfig {
            code,
            name,
            is_canonical: code == CANONICAL_CODE,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_english() {
        let config = LanguageRegistry::get().get_by_code("en").unwrap();
        assert_eq!(config.code, "en");
        assert_eq!(config.name, "English");
        assert!(config.is_canonical);
    }

    #[test]
    fn test_get_by_code_spanish() {
        let config = LanguageRegistry::get().get_by_code("es").unwrap();
        assert_eq!(config.name, "Spanish");
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("xx").is_none());
        assert!(LanguageRegistry::get().get_by_code("").is_none());
    }

    #[test]
    fn test_list_has_fixed_size() {
        assert_eq!(LanguageRegistry::get().list().len(), 37);
    }

    #[test]
    fn test_list_starts_with_english_and_ends_with_urdu() {
        let list = LanguageRegistry::get().list();
        assert_eq!(list.first().map(|l| l.code), Some("en"));
        assert_eq!(list.last().map(|l| l.name), Some("Urdu"));
    }

    #[test]
    fn test_codes_are_unique_two_letter() {
        let list = LanguageRegistry::get().list();
        let codes: HashSet<_> = list.iter().map(|l| l.code).collect();

        assert_eq!(codes.len(), list.len());
        assert!(list.iter().all(|l| l.code.len() == 2));
    }

    #[test]
    fn test_canonical_returns_english() {
        assert_eq!(LanguageRegistry::get().canonical().code, CANONICAL_CODE);
    }

    #[test]
    fn test_is_supported() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_supported("tl"));
        assert!(!registry.is_supported("EN"));
    }

    #[test]
    fn test_serializes_code_and_name_only() {
        let config = LanguageRegistry::get().get_by_code("fr").unwrap();
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json, serde_json::json!({ "code": "fr", "name": "French" }));
    }
}
