//! Narration phrase tables.
//!
//! Phrases live in key-value `.ftl` files (one per language) with `{ $arg }`
//! placeholders substituted at render time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supported narration languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    French,
    English,
}

impl Language {
    /// Get the locale identifier handed to speech engines.
    pub fn locale(&self) -> &'static str {
        match self {
            Language::French => "fr-FR",
            Language::English => "en-US",
        }
    }

    /// Parse from a locale identifier such as "fr-FR" or "en".
    pub fn from_locale(id: &str) -> Option<Self> {
        let id = id.to_lowercase();
        if id.starts_with("fr") {
            Some(Language::French)
        } else if id.starts_with("en") {
            Some(Language::English)
        } else {
            None
        }
    }

    /// Get all supported languages.
    pub fn all() -> &'static [Language] {
        &[Language::French, Language::English]
    }

    fn builtin_phrases(&self) -> &'static str {
        match self {
            Language::French => include_str!("locales/fr/narration.ftl"),
            Language::English => include_str!("locales/en-US/narration.ftl"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.locale())
    }
}

/// Phrase keys used by the narrator.
pub mod keys {
    pub const LEAD_IN: &str = "narration-lead-in";
    pub const CLAUSE: &str = "narration-clause";
    pub const NOTHING_NEARBY: &str = "narration-nothing-nearby";
    pub const METERS: &str = "distance-meters";
    pub const KILOMETERS: &str = "distance-kilometers";
}

/// Phrase lookup for one language, falling back to French then to the key.
#[derive(Debug, Clone)]
pub struct Phrasebook {
    language: Language,
    phrases: HashMap<Language, HashMap<String, String>>,
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl Phrasebook {
    /// Create a phrasebook with the built-in tables.
    pub fn new(language: Language) -> Self {
        let phrases = Language::all()
            .iter()
            .map(|lang| (*lang, parse_ftl(lang.builtin_phrases())))
            .collect();
        Self { language, phrases }
    }

    /// Build from a locale identifier, defaulting to French when unsupported.
    pub fn for_locale(locale: &str) -> Self {
        let language = Language::from_locale(locale).unwrap_or_else(|| {
            tracing::warn!("Unsupported narration locale {}, using French", locale);
            Language::French
        });
        Self::new(language)
    }

    /// Override phrases of the current language from an `.ftl` file.
    ///
    /// Keys absent from the file keep their built-in phrase.
    pub fn with_overrides(mut self, path: &Path) -> Result<Self, PhraseLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| PhraseLoadError {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides = parse_ftl(&content);
        tracing::debug!("Loaded {} phrase overrides from {}", overrides.len(), path.display());
        self.phrases
            .entry(self.language)
            .or_default()
            .extend(overrides);
        Ok(self)
    }

    /// Get the current language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Look up a phrase by key.
    pub fn phrase(&self, key: &str) -> String {
        if let Some(value) = self.phrases.get(&self.language).and_then(|p| p.get(key)) {
            return value.clone();
        }

        if self.language != Language::French {
            if let Some(value) = self.phrases.get(&Language::French).and_then(|p| p.get(key)) {
                return value.clone();
            }
        }

        key.to_string()
    }

    /// Look up a phrase and substitute `{ $name }` arguments.
    pub fn phrase_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut result = self.phrase(key);
        for (arg_key, arg_value) in args {
            result = result.replace(&format!("{{ ${} }}", arg_key), arg_value);
            result = result.replace(&format!("{{${}}}", arg_key), arg_value);
        }
        result
    }
}

/// Failure to read a phrase override file.
#[derive(Debug, thiserror::Error)]
#[error("Cannot read phrase file {}: {source}", .path.display())]
pub struct PhraseLoadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Parse `key = value` lines, skipping comments and blanks.
pub(crate) fn parse_ftl(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}
