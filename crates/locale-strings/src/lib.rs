//! Layered locale string tables
//!
//! This crate resolves application strings across languages and regions:
//!
//! - Layered loading: `common`, `common-<REGION>`, `<lang>` and
//!   `<lang>-<REGION>` JSON tables merged into one table per locale
//! - `@token:default` references expanded inside strings and JSON values
//! - Table-driven plurals with per-language rules and CLDR fallback
//! - English ordinals ("first item", "21st item")
//!
//! # Example
//!
//! ```rust,no_run
//! use locale_strings::{I18nConfig, LocaleStrings, PluralMode};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let strings = LocaleStrings::from_config(&I18nConfig::default())?;
//! strings.set_locale("fr-CA")?;
//!
//! let greeting = strings.resolve_template("@test.greeting:hello")?;
//! let cows = strings.get_pluralized_string("en-US", "cow", 12, PluralMode::Cardinal)?;
//! println!("{greeting} {cows}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_ops;
pub mod loader;
pub mod locale;
pub mod manager;
pub mod pluralization;
pub mod table;
pub mod template;

pub use config::I18nConfig;
pub use error::{I18nError, I18nResult};
pub use file_ops::{FileOps, FsFileOps};
pub use loader::{LoadStats, LocaleTable, TableLoader};
pub use locale::{parse_locale_argument, LocaleId};
pub use manager::LocaleStrings;
pub use pluralization::{
    EnglishRules, IntlPluralService, PluralCategory, PluralMode, PluralRuleRegistry,
    PluralRules, PluralService, Pluralizer,
};
pub use table::StringTable;
