//! Locale identifiers and parsing

use crate::error::{I18nError, I18nResult};
use std::fmt;
use unic_langid::LanguageIdentifier;

/// A resolved `language[-REGION]` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleId {
    language: String,
    region: Option<String>,
}

impl LocaleId {
    /// Build from parts, normalizing case (language lower, region upper)
    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region
                .filter(|r| !r.is_empty())
                .map(str::to_ascii_uppercase),
        }
    }

    /// Parse `language[-region]` without filling in anything missing
    pub fn parse(code: &str) -> Self {
        let (language, region) = split_locale(code);
        Self::new(language, region)
    }

    /// Parse `code`, taking any missing language or region from `system`
    pub fn resolve(code: &str, system: &str) -> Self {
        let requested = Self::parse(code);
        let system = Self::parse(system);

        let language = if requested.language.is_empty() {
            system.language
        } else {
            requested.language
        };

        Self {
            language,
            region: requested.region.or(system.region),
        }
    }

    /// Lower-cased language subtag
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Upper-cased region subtag, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Get the `language-REGION` code for this locale
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

/// Split `language[-Script][-region]` (either `-` or `_` separated) into
/// its language and region; a four-letter script subtag is skipped.
pub fn split_locale(code: &str) -> (&str, Option<&str>) {
    let mut parts = code.trim().split(['-', '_']);
    let language = parts.next().unwrap_or_default();
    let region = parts
        .find(|p| !is_script_subtag(p))
        .filter(|r| !r.is_empty());
    (language, region)
}

fn is_script_subtag(subtag: &str) -> bool {
    subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic())
}

/// Validate a mandatory locale argument.
///
/// The locale must parse as a language identifier whose language subtag is
/// two or three letters; anything else (including an empty string or a
/// dotted string identifier passed in the wrong position) is rejected.
pub fn parse_locale_argument(locale: &str) -> I18nResult<LanguageIdentifier> {
    let invalid = || I18nError::InvalidLocaleArgument(locale.to_string());

    let trimmed = locale.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let langid: LanguageIdentifier = trimmed.parse().map_err(|_| invalid())?;
    let language = langid.language.as_str();
    if langid.language.is_empty()
        || !(2..=3).contains(&language.len())
        || !language.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(invalid());
    }

    Ok(langid)
}
