//! Locale registry and string lookups
//!
//! [`LocaleStrings`] owns the installed-locale cache, the active table and
//! the plural dispatcher for one application (or tenant). Every cache
//! mutation happens under a single write lock; the active table is swapped
//! atomically so readers always see a whole table.

use crate::config::I18nConfig;
use crate::error::{I18nError, I18nResult};
use crate::file_ops::{FileOps, FsFileOps};
use crate::loader::{LoadStats, LocaleTable, TableLoader};
use crate::locale::{split_locale, LocaleId};
use crate::pluralization::{
    IntlPluralService, PluralMode, PluralRuleRegistry, PluralService, Pluralizer,
};
use crate::template;
use arc_swap::ArcSwapOption;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

type SystemLocaleFn = dyn Fn() -> String + Send + Sync;

/// A loaded table and the statistics of the load that produced it
#[derive(Debug, Clone)]
struct InstalledLocale {
    table: Arc<LocaleTable>,
    stats: LoadStats,
}

/// Languages and regions named by the sources in the string-table folder
#[derive(Debug, Default)]
struct AvailableSources {
    languages: Vec<String>,
    regions: IndexMap<String, Vec<String>>,
}

impl AvailableSources {
    fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut available = Self::default();

        for name in names {
            let (language, region) = split_locale(&name);
            if language.is_empty() {
                continue;
            }
            if language != "common" && !available.languages.iter().any(|l| l == language) {
                available.languages.push(language.to_string());
            }
            if let Some(region) = region {
                let regions = available.regions.entry(language.to_string()).or_default();
                if !regions.iter().any(|r| r == region) {
                    regions.push(region.to_string());
                }
            }
        }

        available
    }

    fn regions_for(&self, language: &str) -> Vec<String> {
        let mut regions: Vec<String> = Vec::new();
        let own = self.regions.get(language).into_iter().flatten();
        let common = self.regions.get("common").into_iter().flatten();
        for region in own.chain(common) {
            if !regions.contains(region) {
                regions.push(region.clone());
            }
        }
        regions
    }
}

/// Locale string context: installed tables, the active table and plurals
pub struct LocaleStrings {
    config: I18nConfig,
    loader: TableLoader,
    system_locale: Arc<SystemLocaleFn>,
    installed: RwLock<IndexMap<String, InstalledLocale>>,
    active: ArcSwapOption<LocaleTable>,
    pluralizer: Pluralizer,
    available: OnceCell<AvailableSources>,
}

impl fmt::Debug for LocaleStrings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleStrings")
            .field("folder", &self.loader.folder())
            .field("installed", &self.installed_locales())
            .field("active", &self.active_locale())
            .field("pluralizer", &self.pluralizer)
            .finish()
    }
}

impl LocaleStrings {
    /// Create an uninitialized context reading sources through `file_ops`.
    ///
    /// Plural rules default to the bundled English rules, with the CLDR
    /// service as fallback when `config.use_system_plurals` is set. The
    /// system locale comes from `config.default_locale` or, failing that,
    /// the process environment.
    pub fn new(file_ops: Arc<dyn FileOps>, config: I18nConfig) -> Self {
        let service: Option<Arc<dyn PluralService>> = if config.use_system_plurals {
            Some(Arc::new(IntlPluralService::new()))
        } else {
            None
        };

        let system_locale: Arc<SystemLocaleFn> = match config.default_locale.clone() {
            Some(locale) => Arc::new(move || locale.clone()),
            None => Arc::new(locale_strings_common::system_locale),
        };

        Self {
            loader: TableLoader::new(file_ops, &config.folder),
            config,
            system_locale,
            installed: RwLock::new(IndexMap::new()),
            active: ArcSwapOption::empty(),
            pluralizer: Pluralizer::new(PluralRuleRegistry::with_defaults(), service),
            available: OnceCell::new(),
        }
    }

    /// Build a filesystem-backed context from configuration and initialize it
    pub fn from_config(config: &I18nConfig) -> I18nResult<Self> {
        config.validate()?;
        let file_ops = Arc::new(FsFileOps::new(&config.root_path));
        let strings = Self::new(file_ops, config.clone());
        strings.init()?;
        Ok(strings)
    }

    /// Replace the system locale collaborator
    pub fn with_system_locale<F>(mut self, system_locale: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.system_locale = Arc::new(system_locale);
        self
    }

    /// Replace the plural dispatcher (rules and system service)
    pub fn with_pluralizer(mut self, pluralizer: Pluralizer) -> Self {
        self.pluralizer = pluralizer;
        self
    }

    /// Configuration this context was built from
    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// The plural dispatcher
    pub fn pluralizer(&self) -> &Pluralizer {
        &self.pluralizer
    }

    /// Locale reported by the system locale collaborator
    pub fn system_locale(&self) -> String {
        (self.system_locale)()
    }

    /// Drop every installed locale, then load and activate the system locale.
    ///
    /// # Errors
    ///
    /// Propagates load failures; the context is left with nothing active.
    pub fn init(&self) -> I18nResult<LoadStats> {
        {
            let mut installed = self.installed.write();
            installed.clear();
            self.active.store(None);
        }
        info!("Initializing locale strings from {:?}", self.loader.folder());
        self.set_locale("")
    }

    /// Load (or fetch from cache) the table for `locale` without activating it.
    ///
    /// An empty `locale` means the system locale. A locale missing its
    /// language or region takes that part from the system locale.
    ///
    /// # Errors
    ///
    /// [`I18nError::MalformedSource`] or [`I18nError::Io`] for the first
    /// source file that cannot be merged; nothing is cached in that case.
    pub fn load_for_locale(&self, locale: &str) -> I18nResult<LoadStats> {
        let mut installed = self.installed.write();
        self.install(&mut installed, locale).map(|entry| entry.stats)
    }

    /// Load `locale` if needed and make its table the active one
    pub fn set_locale(&self, locale: &str) -> I18nResult<LoadStats> {
        let mut installed = self.installed.write();
        let loaded = self.install(&mut installed, locale)?;
        let name = loaded.table.name();

        let Some(entry) = installed.get(name) else {
            return Err(I18nError::LocaleNotLoaded(name.to_string()));
        };

        self.active.store(Some(Arc::clone(&entry.table)));
        info!("Active locale set to {}", name);
        Ok(entry.stats.clone())
    }

    /// Shared handle to the table for `locale`, loading it if needed.
    ///
    /// The active table is not changed.
    pub fn table_for_locale(&self, locale: &str) -> I18nResult<Arc<LocaleTable>> {
        let mut installed = self.installed.write();
        self.install(&mut installed, locale).map(|entry| entry.table)
    }

    fn install(
        &self,
        installed: &mut IndexMap<String, InstalledLocale>,
        locale: &str,
    ) -> I18nResult<InstalledLocale> {
        let system = self.system_locale();
        let name = if locale.trim().is_empty() {
            system.clone()
        } else {
            locale.to_string()
        };

        if let Some(entry) = installed.get(&name) {
            debug!("Locale {} already installed", name);
            return Ok(entry.clone());
        }

        let id = LocaleId::resolve(&name, &system);
        let (table, stats) = self.loader.build(&name, id)?;
        let entry = InstalledLocale {
            table: Arc::new(table),
            stats,
        };
        installed.insert(name, entry.clone());
        Ok(entry)
    }

    /// Whether `locale` is in the installed cache
    pub fn is_locale_loaded(&self, locale: &str) -> bool {
        self.installed.read().contains_key(locale)
    }

    /// Installed locale names in first-installed order
    pub fn installed_locales(&self) -> Vec<String> {
        self.installed.read().keys().cloned().collect()
    }

    /// Statistics recorded when `locale` was installed
    pub fn load_stats(&self, locale: &str) -> Option<LoadStats> {
        self.installed.read().get(locale).map(|e| e.stats.clone())
    }

    /// Evict `locale` from the installed cache.
    ///
    /// Returns `false` when the locale is not installed or is the active one;
    /// the active locale is never evicted.
    pub fn clear_installed_locale(&self, locale: &str) -> bool {
        let mut installed = self.installed.write();

        if self.active_locale().as_deref() == Some(locale) {
            warn!("Refusing to clear active locale {}", locale);
            return false;
        }

        let removed = installed.shift_remove(locale).is_some();
        if removed {
            info!("Cleared installed locale {}", locale);
        }
        removed
    }

    /// Name of the active locale, if any
    pub fn active_locale(&self) -> Option<String> {
        self.active
            .load()
            .as_ref()
            .map(|table| table.name().to_string())
    }

    /// Shared handle to the active table
    pub fn active_table(&self) -> I18nResult<Arc<LocaleTable>> {
        self.active.load_full().ok_or(I18nError::NotInitialized)
    }

    /// Whether the active table has an entry for `id`
    pub fn has_locale_string(&self, id: &str) -> I18nResult<bool> {
        Ok(self.active_table()?.contains(id))
    }

    /// Text for `id` from the active table.
    ///
    /// Falls back to `default`, then to the decorated placeholder
    /// `%$$>id<$$%`. With `warn` set, a miss is logged with the value
    /// returned.
    pub fn get_locale_string(
        &self,
        id: &str,
        default: Option<&str>,
        warn: bool,
    ) -> I18nResult<String> {
        Ok(self.active_table()?.resolve(id, default, warn))
    }

    /// Expand every `@token[:default]` reference in `input`
    pub fn resolve_template(&self, input: &str) -> I18nResult<String> {
        let table = self.active_table()?;
        Ok(template::resolve_template(&table, input))
    }

    /// Expand every string leaf of `value` in place
    pub fn populate_object_strings(&self, value: &mut Value, shallow: bool) -> I18nResult<()> {
        let table = self.active_table()?;
        template::populate_object_strings(&table, value, shallow, self.config.max_depth)
    }

    /// Copy of `value` with every string leaf expanded
    pub fn translate_object_strings(&self, value: &Value, shallow: bool) -> I18nResult<Value> {
        let table = self.active_table()?;
        template::translate_object_strings(&table, value, shallow, self.config.max_depth)
    }

    /// Copy of `value` with every string field expanded
    pub fn translate_serializable<T>(&self, value: &T, shallow: bool) -> I18nResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let table = self.active_table()?;
        template::translate_serializable(&table, value, shallow, self.config.max_depth)
    }

    /// Form of the word identified by `string_id` for `count`.
    ///
    /// Rules are chosen by `locale`; the word and its plural entries come
    /// from the active table.
    ///
    /// # Errors
    ///
    /// [`I18nError::NotInitialized`] with no active table, or
    /// [`I18nError::InvalidLocaleArgument`] when `locale` does not parse.
    pub fn get_pluralized_string(
        &self,
        locale: &str,
        string_id: &str,
        count: i64,
        mode: PluralMode,
    ) -> I18nResult<String> {
        let table = self.active_table()?;
        self.pluralizer
            .pluralized_string(&table, locale, string_id, count, mode)
    }

    /// Plural or ordinal form of a literal `word` by the rules for `locale`
    pub fn pluralize(
        &self,
        locale: &str,
        word: &str,
        count: i64,
        mode: PluralMode,
    ) -> I18nResult<String> {
        self.active_table()?;
        self.pluralizer.pluralize(locale, word, count, mode)
    }

    fn available(&self) -> &AvailableSources {
        self.available
            .get_or_init(|| AvailableSources::from_names(self.loader.source_names()))
    }

    /// Languages with at least one source in the string-table folder.
    ///
    /// The folder is enumerated once per context.
    pub fn available_languages(&self) -> Vec<String> {
        self.available().languages.clone()
    }

    /// Regions with sources for `language`, followed by regions with
    /// `common-<REGION>` sources
    pub fn available_regions(&self, language: &str) -> Vec<String> {
        self.available().regions_for(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locale_strings_common::test_utils::{init_test_logging, write_fixture};
    use tempfile::TempDir;

    fn context(dir: &TempDir, system: &'static str) -> LocaleStrings {
        init_test_logging();
        LocaleStrings::new(Arc::new(FsFileOps::new(dir.path())), I18nConfig::default())
            .with_system_locale(move || system.to_string())
    }

    fn sample_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/common.json", r#"{"a": "1"}"#);
        write_fixture(dir.path(), "i18n/en.json", r#"{"a": "2", "b": "2"}"#);
        write_fixture(dir.path(), "i18n/en-GB.json", r#"{"a": "3"}"#);
        dir
    }

    #[test]
    fn test_lookups_before_init_fail() {
        let dir = sample_dir();
        let strings = context(&dir, "en-GB");

        assert!(matches!(
            strings.get_locale_string("a", None, false),
            Err(I18nError::NotInitialized)
        ));
        assert!(matches!(
            strings.has_locale_string("a"),
            Err(I18nError::NotInitialized)
        ));
        assert!(matches!(
            strings.resolve_template("@a"),
            Err(I18nError::NotInitialized)
        ));
        assert!(strings.active_locale().is_none());
    }

    #[test]
    fn test_init_activates_system_locale() {
        let dir = sample_dir();
        let strings = context(&dir, "en-GB");

        let stats = strings.init().unwrap();
        assert_eq!(stats.locale, "en-GB");
        assert_eq!(strings.active_locale().as_deref(), Some("en-GB"));
        assert_eq!(strings.get_locale_string("a", None, true).unwrap(), "3");
        assert_eq!(strings.get_locale_string("b", None, true).unwrap(), "2");
        assert_eq!(strings.resolve_template("@a:x @b").unwrap(), "3 2");
        assert_eq!(
            strings.get_locale_string("no.such.id", None, true).unwrap(),
            "%$$>no.such.id<$$%"
        );
    }

    #[test]
    fn test_partial_locale_takes_system_parts() {
        let dir = sample_dir();
        let strings = context(&dir, "en-GB");

        let table = strings.table_for_locale("en").unwrap();
        assert_eq!(table.locale().code(), "en-GB");
        assert_eq!(table.get_string("a"), Some("3"));
        assert_eq!(strings.installed_locales(), vec!["en"]);
        assert!(strings.active_locale().is_none());
    }

    #[test]
    fn test_missing_language_source_is_tolerated() {
        let dir = sample_dir();
        let strings = context(&dir, "en-GB");

        let stats = strings.load_for_locale("de-DE").unwrap();
        assert_eq!(stats.language_files, 0);
        assert_eq!(stats.common_files, 1);
        assert_eq!(stats.total_strings, 1);
    }

    #[test]
    fn test_clear_installed_locale_spares_active() {
        let dir = sample_dir();
        let strings = context(&dir, "en-GB");
        strings.init().unwrap();
        strings.load_for_locale("en-US").unwrap();

        assert!(!strings.clear_installed_locale("en-GB"));
        assert!(strings.clear_installed_locale("en-US"));
        assert!(!strings.clear_installed_locale("en-US"));
        assert!(strings.load_stats("en-US").is_none());
        assert_eq!(strings.installed_locales(), vec!["en-GB"]);
    }

    #[test]
    fn test_available_sources_from_names() {
        let names = [
            "common-GB", "common-US", "common", "en-GB", "en-US", "en", "fr-CA", "fr", "zh-Hant-TW",
        ];
        let available = AvailableSources::from_names(names.iter().map(|n| n.to_string()));

        assert_eq!(available.languages, vec!["en", "fr", "zh"]);
        assert_eq!(available.regions_for("zh"), vec!["TW", "GB", "US"]);
        assert_eq!(available.regions_for("en"), vec!["GB", "US"]);
        assert_eq!(available.regions_for("fr"), vec!["CA", "GB", "US"]);
        assert_eq!(available.regions_for("de"), vec!["GB", "US"]);
    }
}
