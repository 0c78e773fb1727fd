//! Test utilities and shared fixtures for the locale-strings workspace.
//!
//! This module provides logging setup, temporary directories and a sample
//! string-table tree that integration tests across the workspace load from.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
#[cfg(feature = "tracing-subscriber")]
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        fmt().with_test_writer().with_env_filter(filter).init();
    });
}

/// No-op version when tracing-subscriber is not available
#[cfg(not(feature = "tracing-subscriber"))]
pub fn init_test_logging() {
    INIT.call_once(|| {});
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

/// Sample string tables laid out under an `i18n/` folder.
///
/// | Source | Notable entries |
/// |--------|-----------------|
/// | `common.json` | `test.common`, `test.greeting` |
/// | `common-US.json` | `test.country` |
/// | `en.json` | greeting, plural nouns |
/// | `en-US/` | directory source with two files |
/// | `en-GB.json` | regional greeting |
/// | `fr.json`, `fr-FR.json`, `fr-CA.json` | French greetings |
pub mod string_tables {
    use super::write_fixture;
    use std::path::Path;

    /// Folder name, relative to the fixture root.
    pub const FOLDER: &str = "i18n/";

    /// `(relative path, JSON text)` pairs making up the sample tree.
    pub const FILES: &[(&str, &str)] = &[
        (
            "i18n/common.json",
            r#"{"test.common": "test common", "test.greeting": "greetings"}"#,
        ),
        ("i18n/common-US.json", r#"{"test.country": "US"}"#),
        ("i18n/common-GB.json", r#"{"test.country": "GB"}"#),
        (
            "i18n/en.json",
            r#"{
                "test.greeting": "hello",
                "cow": "Cow",
                "cow.plural": "Cows",
                "sheep": "Sheep",
                "sheep.plural": "Sheep",
                "potato": "Potato",
                "octopus": "octopus",
                "octopus.plural": "Octopi",
                "miss": "miss",
                "box": "box",
                "ox": "ox",
                "ox.plural": "oxen",
                "tomato": "tomato"
            }"#,
        ),
        ("i18n/en-US/greetings.json", r#"{"test.greeting": "howdy dude"}"#),
        ("i18n/en-US/extra.json", r#"{"test.extra": "extra"}"#),
        ("i18n/en-GB.json", r#"{"test.greeting": "hello, bloke"}"#),
        ("i18n/fr.json", r#"{"test.greeting": "salut"}"#),
        ("i18n/fr-FR.json", r#"{"test.greeting": "bonjour"}"#),
        ("i18n/fr-CA.json", r#"{"test.greeting": "bonjour eh?"}"#),
    ];

    /// Write the sample tree below `root`.
    pub fn write_all(root: &Path) {
        for (relative, contents) in FILES {
            write_fixture(root, relative, contents);
        }
    }

    /// Create a temporary directory holding the sample tree.
    #[cfg(feature = "tempfile")]
    pub fn create() -> tempfile::TempDir {
        let dir = super::create_temp_dir();
        write_all(dir.path());
        dir
    }
}
