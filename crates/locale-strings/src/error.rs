//! Error types for locale string operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, resolving or pluralizing strings
#[derive(Error, Debug)]
pub enum I18nError {
    /// A lookup was attempted before any locale table became active
    #[error("i18n init() has not been called before using")]
    NotInitialized,

    /// Text handed to a string table is not a flat JSON object of strings
    #[error("Failed to parse string table: {0}")]
    Parse(#[source] serde_json::Error),

    /// A string-table source exists but does not parse
    #[error("Unable to load string table at {path}: {source}")]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A present source could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `set_locale` found no installed table for the locale
    #[error("Locale \"{0}\" has not been loaded")]
    LocaleNotLoaded(String),

    /// A mandatory locale argument is missing or malformed
    #[error("Incorrect locale information provided: \"{0}\"")]
    InvalidLocaleArgument(String),

    /// A pluralization mode other than cardinal or ordinal
    #[error("Unrecognized plural mode: \"{0}\"")]
    UnrecognizedMode(String),

    /// A value could not be converted to or from a JSON value tree
    #[error("Failed to convert value: {0}")]
    Conversion(#[source] serde_json::Error),

    /// A value tree is nested deeper than the configured bound
    #[error("Value nested deeper than {max_depth} levels")]
    TraversalTooDeep { max_depth: usize },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for locale string operations
pub type I18nResult<T> = Result<T, I18nError>;
