//! Pluralization and ordinal support
//!
//! Category selection combines per-language [`PluralRules`] registered in a
//! [`PluralRuleRegistry`] with an optional system [`PluralService`]. The
//! selected category picks a suffixed table entry (`id.plural`, `id.few`,
//! ...) or, when the table has no such entry, the rules' word transforms.
//!
//! Table suffixes follow the CLDR category names with two exceptions:
//! `one` uses the bare identifier and `other` uses `.plural`.

use crate::error::{I18nError, I18nResult};
use crate::loader::LocaleTable;
use crate::locale::parse_locale_argument;
use intl_pluralrules::{PluralRuleType, PluralRules as IntlPluralRules};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// Grammatical plural categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// CLDR name of the category
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }

    /// Suffix appended to a string identifier for this category's form
    pub fn table_suffix(self) -> Option<&'static str> {
        match self {
            Self::One => None,
            Self::Other => Some("plural"),
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<intl_pluralrules::PluralCategory> for PluralCategory {
    fn from(category: intl_pluralrules::PluralCategory) -> Self {
        use intl_pluralrules::PluralCategory as Intl;
        match category {
            Intl::ZERO => Self::Zero,
            Intl::ONE => Self::One,
            Intl::TWO => Self::Two,
            Intl::FEW => Self::Few,
            Intl::MANY => Self::Many,
            Intl::OTHER => Self::Other,
        }
    }
}

/// Counting mode for pluralization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PluralMode {
    /// Quantities: "1 cow", "12 cows"
    #[default]
    Cardinal,
    /// Positions: "first item", "21st item"
    Ordinal,
}

impl PluralMode {
    /// Name of the mode
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cardinal => "cardinal",
            Self::Ordinal => "ordinal",
        }
    }
}

impl fmt::Display for PluralMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralMode {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cardinal" => Ok(Self::Cardinal),
            "ordinal" => Ok(Self::Ordinal),
            _ => Err(I18nError::UnrecognizedMode(s.to_string())),
        }
    }
}

impl From<PluralMode> for PluralRuleType {
    fn from(mode: PluralMode) -> Self {
        match mode {
            PluralMode::Cardinal => Self::CARDINAL,
            PluralMode::Ordinal => Self::ORDINAL,
        }
    }
}

/// Per-language pluralization rules.
///
/// Every method is optional; the default implementations decline with
/// `None` and the dispatcher falls back accordingly.
pub trait PluralRules: Send + Sync {
    /// Category for `count` in `mode`
    fn select(&self, _count: i64, _mode: PluralMode) -> Option<PluralCategory> {
        None
    }

    /// Plural form of `singular` for `count`
    fn pluralize(&self, _singular: &str, _count: i64) -> Option<String> {
        None
    }

    /// Ordinal phrase for `word` at position `count`
    fn make_ordinal(&self, _word: &str, _count: i64) -> Option<String> {
        None
    }
}

const ENGLISH_ORDINALS: [&str; 20] = [
    "zeroth",
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
];

/// English rules: `one` for exactly 1, `other` otherwise.
///
/// Automatic plurals append `es` after `o`, `x` or `s` and `s` otherwise.
/// Irregular words (`sheep`, `ox`) need `.plural` table entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishRules;

impl EnglishRules {
    /// Spelled-out ordinal for 0 through 19, digits with a suffix beyond
    pub fn ordinal_number(count: i64) -> String {
        if let Some(word) = usize::try_from(count)
            .ok()
            .and_then(|i| ENGLISH_ORDINALS.get(i))
        {
            return (*word).to_string();
        }

        let n = count.unsigned_abs();
        let suffix = if (11..=13).contains(&(n % 100)) {
            "th"
        } else {
            match n % 10 {
                1 => "st",
                2 => "nd",
                3 => "rd",
                _ => "th",
            }
        };
        format!("{count}{suffix}")
    }
}

impl PluralRules for EnglishRules {
    fn select(&self, count: i64, _mode: PluralMode) -> Option<PluralCategory> {
        Some(if count == 1 {
            PluralCategory::One
        } else {
            PluralCategory::Other
        })
    }

    fn pluralize(&self, singular: &str, count: i64) -> Option<String> {
        if count == 1 {
            return Some(singular.to_string());
        }
        if singular.ends_with(['o', 'x', 's']) {
            Some(format!("{singular}es"))
        } else {
            Some(format!("{singular}s"))
        }
    }

    fn make_ordinal(&self, word: &str, count: i64) -> Option<String> {
        Some(format!("{} {}", Self::ordinal_number(count), word))
    }
}

/// Plural rules registered by language code
#[derive(Default)]
pub struct PluralRuleRegistry {
    rules: HashMap<String, Arc<dyn PluralRules>>,
    /// Languages already reported as having no rules
    unavailable: Mutex<HashSet<String>>,
}

impl fmt::Debug for PluralRuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralRuleRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

impl PluralRuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the bundled English rules
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("en", Arc::new(EnglishRules));
        registry
    }

    /// Register (or replace) the rules for a language
    pub fn register(&mut self, language: &str, rules: Arc<dyn PluralRules>) {
        let language = language.to_ascii_lowercase();
        self.unavailable.lock().remove(&language);
        self.rules.insert(language, rules);
    }

    /// Rules for a language, logging the first miss per language
    pub fn resolve(&self, language: &str) -> Option<Arc<dyn PluralRules>> {
        let language = language.to_ascii_lowercase();
        let rules = self.rules.get(&language).cloned();
        if rules.is_none() && self.unavailable.lock().insert(language.clone()) {
            warn!("No plural rules registered for language '{}'", language);
        }
        rules
    }

    /// Registered language codes, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }
}

/// System-supplied category selection
pub trait PluralService: Send + Sync + fmt::Debug {
    /// Category for `count` in `locale`, if the service knows the locale
    fn select(
        &self,
        locale: &LanguageIdentifier,
        mode: PluralMode,
        count: i64,
    ) -> Option<PluralCategory>;
}

/// CLDR category selection backed by `intl_pluralrules`
#[derive(Default)]
pub struct IntlPluralService {
    cache: Mutex<HashMap<(String, PluralMode), Option<Arc<IntlPluralRules>>>>,
}

impl fmt::Debug for IntlPluralService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntlPluralService")
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

impl IntlPluralService {
    /// Create a service with an empty rules cache
    pub fn new() -> Self {
        Self::default()
    }

    fn create_rules(locale: &LanguageIdentifier, mode: PluralMode) -> Option<IntlPluralRules> {
        IntlPluralRules::create(locale.clone(), mode.into())
            .or_else(|_| {
                let language: LanguageIdentifier = locale
                    .language
                    .as_str()
                    .parse()
                    .map_err(|_| "invalid language subtag")?;
                IntlPluralRules::create(language, mode.into())
            })
            .map_err(|e| debug!("No CLDR {} rules for {}: {}", mode, locale, e))
            .ok()
    }
}

impl PluralService for IntlPluralService {
    fn select(
        &self,
        locale: &LanguageIdentifier,
        mode: PluralMode,
        count: i64,
    ) -> Option<PluralCategory> {
        let rules = self
            .cache
            .lock()
            .entry((locale.to_string(), mode))
            .or_insert_with(|| Self::create_rules(locale, mode).map(Arc::new))
            .clone()?;

        rules.select(count).ok().map(PluralCategory::from)
    }
}

/// Result returned when no category source knows the language
pub fn no_plurals_marker(language: &str) -> String {
    format!("%$<NO PLURALS {language}>$%")
}

/// Resolves plural and ordinal forms against a locale table
#[derive(Debug, Default)]
pub struct Pluralizer {
    rules: PluralRuleRegistry,
    service: Option<Arc<dyn PluralService>>,
}

impl Pluralizer {
    /// Create a pluralizer from registered rules and an optional service
    pub fn new(rules: PluralRuleRegistry, service: Option<Arc<dyn PluralService>>) -> Self {
        Self { rules, service }
    }

    /// Registered per-language rules
    pub fn rules(&self) -> &PluralRuleRegistry {
        &self.rules
    }

    /// Category for `count`: rules first, then the system service
    pub fn select_category(
        &self,
        locale: &LanguageIdentifier,
        rules: Option<&dyn PluralRules>,
        count: i64,
        mode: PluralMode,
    ) -> Option<PluralCategory> {
        rules
            .and_then(|r| r.select(count, mode))
            .or_else(|| {
                self.service
                    .as_ref()
                    .and_then(|s| s.select(locale, mode, count))
            })
    }

    /// Resolve the form of the word identified by `string_id` for `count`.
    ///
    /// # Errors
    ///
    /// [`I18nError::InvalidLocaleArgument`] when `locale` does not parse.
    pub fn pluralized_string(
        &self,
        table: &LocaleTable,
        locale: &str,
        string_id: &str,
        count: i64,
        mode: PluralMode,
    ) -> I18nResult<String> {
        let langid = parse_locale_argument(locale)?;
        let language = langid.language.as_str().to_ascii_lowercase();
        let rules = self.rules.resolve(&language);

        let Some(category) = self.select_category(&langid, rules.as_deref(), count, mode) else {
            return Ok(no_plurals_marker(&language));
        };

        let Some(single) = table.get_string(string_id) else {
            return Ok(String::new());
        };

        if mode == PluralMode::Ordinal {
            return Ok(Self::word_form(rules.as_deref(), &language, single, count, mode));
        }

        let Some(suffix) = category.table_suffix() else {
            return Ok(single.to_string());
        };

        let plural_id = format!("{string_id}.{suffix}");
        if let Some(text) = table.get_string(&plural_id) {
            return Ok(text.to_string());
        }
        if let Some(word) = rules.as_deref().and_then(|r| r.pluralize(single, count)) {
            return Ok(word);
        }
        Ok(table.resolve(&plural_id, None, true))
    }

    /// Transform a literal word for `count` without consulting any table.
    ///
    /// # Errors
    ///
    /// [`I18nError::InvalidLocaleArgument`] when `locale` does not parse.
    pub fn pluralize(
        &self,
        locale: &str,
        word: &str,
        count: i64,
        mode: PluralMode,
    ) -> I18nResult<String> {
        let langid = parse_locale_argument(locale)?;
        let language = langid.language.as_str().to_ascii_lowercase();
        let rules = self.rules.resolve(&language);
        Ok(Self::word_form(rules.as_deref(), &language, word, count, mode))
    }

    fn word_form(
        rules: Option<&dyn PluralRules>,
        language: &str,
        word: &str,
        count: i64,
        mode: PluralMode,
    ) -> String {
        let transformed = rules.and_then(|r| match mode {
            PluralMode::Cardinal => r.pluralize(word, count),
            PluralMode::Ordinal => r.make_ordinal(word, count),
        });

        transformed.unwrap_or_else(|| {
            debug!(
                "No {} transform for language '{}', returning '{}' unchanged",
                mode, language, word
            );
            word.to_string()
        })
    }
}
