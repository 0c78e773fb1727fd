//! Layered loading of string tables for one locale.
//!
//! A locale table is the merge, in this order, of the sources named
//! `common`, `common-<REGION>`, `<lang>` and `<lang>-<REGION>` found in the
//! configured folder. Each source is optional and later sources overwrite
//! earlier ones. A source is a `<name>.json` file, a `<name>/` directory of
//! JSON files, or both (the file is merged first).

use crate::error::{I18nError, I18nResult};
use crate::file_ops::FileOps;
use crate::locale::LocaleId;
use crate::table::StringTable;
use serde::Serialize;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SOURCE_EXTENSION: &str = "json";

/// Bookends of the placeholder returned for a missing identifier
pub const MISSING_PREFIX: &str = "%$$>";
/// See [`MISSING_PREFIX`]
pub const MISSING_SUFFIX: &str = "<$$%";

/// Placeholder for an identifier with no entry and no default
pub fn decorate_missing(id: &str) -> String {
    format!("{MISSING_PREFIX}{id}{MISSING_SUFFIX}")
}

/// Statistics describing one locale load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Locale identifier the table was requested (and cached) under
    pub locale: String,
    /// Files merged from `common`
    pub common_files: usize,
    /// Files merged from `common-<REGION>`
    pub region_files: usize,
    /// Files merged from `<lang>`
    pub language_files: usize,
    /// Files merged from `<lang>-<REGION>`
    pub locale_files: usize,
    /// Identifiers in the merged table
    pub total_strings: usize,
}

impl LoadStats {
    fn empty(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            common_files: 0,
            region_files: 0,
            language_files: 0,
            locale_files: 0,
            total_strings: 0,
        }
    }

    /// Files merged across all four sources
    pub fn total_files(&self) -> usize {
        self.common_files + self.region_files + self.language_files + self.locale_files
    }

    fn record(&mut self, step: SourceStep, files: usize) {
        match step {
            SourceStep::Common => self.common_files = files,
            SourceStep::CommonRegion => self.region_files = files,
            SourceStep::Language => self.language_files = files,
            SourceStep::LanguageRegion => self.locale_files = files,
        }
    }
}

/// The four layered sources, in merge order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStep {
    /// `common`
    Common,
    /// `common-<REGION>`
    CommonRegion,
    /// `<lang>`
    Language,
    /// `<lang>-<REGION>`
    LanguageRegion,
}

impl SourceStep {
    /// All steps in merge order
    pub const ALL: [Self; 4] = [
        Self::Common,
        Self::CommonRegion,
        Self::Language,
        Self::LanguageRegion,
    ];

    /// Source name for this step, or `None` when the locale has no region
    pub fn source_name(self, locale: &LocaleId) -> Option<String> {
        match (self, locale.region()) {
            (Self::Common, _) => Some("common".to_string()),
            (Self::CommonRegion, Some(region)) => Some(format!("common-{region}")),
            (Self::Language, _) => Some(locale.language().to_string()),
            (Self::LanguageRegion, Some(region)) => {
                Some(format!("{}-{}", locale.language(), region))
            }
            (Self::CommonRegion | Self::LanguageRegion, None) => None,
        }
    }
}

/// A merged table for one locale
#[derive(Debug, Clone)]
pub struct LocaleTable {
    name: String,
    locale: LocaleId,
    strings: StringTable,
}

impl LocaleTable {
    /// Wrap an already merged table
    pub fn from_strings(name: &str, locale: LocaleId, strings: StringTable) -> Self {
        Self {
            name: name.to_string(),
            locale,
            strings,
        }
    }

    /// Identifier the table was requested under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved language and region
    pub fn locale(&self) -> &LocaleId {
        &self.locale
    }

    /// Merged strings
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Look up an identifier
    pub fn get_string(&self, id: &str) -> Option<&str> {
        self.strings.get_string(id)
    }

    /// Whether the identifier has an entry
    pub fn contains(&self, id: &str) -> bool {
        self.strings.contains(id)
    }

    /// Text for `id`, else `default`, else the decorated placeholder.
    ///
    /// With `warn` set, a miss is reported with the value returned instead.
    pub fn resolve(&self, id: &str, default: Option<&str>, warn: bool) -> String {
        if let Some(text) = self.strings.get_string(id) {
            return text.to_string();
        }

        let value = default.map_or_else(|| decorate_missing(id), str::to_string);
        if warn {
            warn!(locale = %self.name, id, value = %value, ">> i18n default");
        }
        value
    }
}

/// Builds merged [`LocaleTable`]s from a source folder
#[derive(Debug, Clone)]
pub struct TableLoader {
    file_ops: Arc<dyn FileOps>,
    folder: PathBuf,
}

impl TableLoader {
    /// Create a loader reading `folder` (relative to the collaborator root)
    pub fn new<P: AsRef<Path>>(file_ops: Arc<dyn FileOps>, folder: P) -> Self {
        Self {
            file_ops,
            folder: folder.as_ref().to_path_buf(),
        }
    }

    /// Folder sources are read from
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Merge all four sources for `locale` into a new table named `name`.
    ///
    /// # Errors
    ///
    /// Fails fast on the first source file that exists but cannot be read
    /// ([`I18nError::Io`]) or parsed ([`I18nError::MalformedSource`]).
    pub fn build(&self, name: &str, locale: LocaleId) -> I18nResult<(LocaleTable, LoadStats)> {
        debug!("Loading locale {} as {}", name, locale);

        let mut strings = StringTable::new();
        let mut stats = LoadStats::empty(name);

        for step in SourceStep::ALL {
            let Some(source) = step.source_name(&locale) else {
                continue;
            };
            let files = self.load_source(&source, &mut strings)?;
            stats.record(step, files);
        }
        stats.total_strings = strings.num_strings();

        info!(
            locale = name,
            common = stats.common_files,
            common_region = stats.region_files,
            language = stats.language_files,
            language_region = stats.locale_files,
            strings = stats.total_strings,
            "Loaded locale table"
        );

        Ok((LocaleTable::from_strings(name, locale, strings), stats))
    }

    /// Merge every file of one source, returning how many were merged
    fn load_source(&self, source: &str, strings: &mut StringTable) -> I18nResult<usize> {
        let mut merged = 0;

        let single = self
            .file_ops
            .root_path()
            .join(&self.folder)
            .join(format!("{source}.{SOURCE_EXTENSION}"));
        if self.merge_file(&single, strings)? {
            merged += 1;
        }

        let mut paths = Vec::new();
        self.file_ops
            .enumerate(&self.folder.join(source), &mut |path| paths.push(path.to_path_buf()));

        for path in paths.iter().filter(|p| is_source_file(p)) {
            if self.merge_file(path, strings)? {
                merged += 1;
            }
        }

        Ok(merged)
    }

    /// Merge one file; `Ok(false)` when it does not exist
    fn merge_file(&self, path: &Path, strings: &mut StringTable) -> I18nResult<bool> {
        let text = match self.file_ops.read(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(source) => {
                return Err(I18nError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        strings.load(&text).map_err(|e| match e {
            I18nError::Parse(source) => {
                error!("Unable to load string table at {:?}: {}", path, source);
                I18nError::MalformedSource {
                    path: path.to_path_buf(),
                    source,
                }
            }
            other => other,
        })?;

        debug!("Merged string table {:?}", path);
        Ok(true)
    }

    /// Top-level source names present in the folder, in enumeration order.
    ///
    /// A top-level `<name>.json` file or a `<name>/` directory holding at
    /// least one JSON file each contribute `<name>` once.
    pub fn source_names(&self) -> Vec<String> {
        let base = self.file_ops.root_path().join(&self.folder);
        let mut names: Vec<String> = Vec::new();

        self.file_ops.enumerate(&self.folder, &mut |path| {
            if !is_source_file(path) {
                return;
            }
            let Ok(relative) = path.strip_prefix(&base) else {
                return;
            };
            let mut components = relative.components();
            let name = match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => relative
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned()),
                (Some(Component::Normal(dir)), Some(_)) => {
                    Some(dir.to_string_lossy().into_owned())
                }
                _ => None,
            };
            if let Some(name) = name {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        });

        names
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_ops::FsFileOps;
    use locale_strings_common::test_utils::write_fixture;

    fn loader(root: &Path) -> TableLoader {
        TableLoader::new(Arc::new(FsFileOps::new(root)), "i18n/")
    }

    #[test]
    fn test_resolve_defaults_and_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/en.json", r#"{"greet": "howdy"}"#);
        let (table, _) = loader(dir.path()).build("en", LocaleId::parse("en")).unwrap();

        assert_eq!(table.resolve("greet", Some("hi"), true), "howdy");
        assert_eq!(table.resolve("no.such.id", Some("hi"), true), "hi");
        assert_eq!(table.resolve("no.such.id", None, false), "%$$>no.such.id<$$%");
        assert_eq!(decorate_missing("x"), "%$$>x<$$%");
    }

    #[test]
    fn test_source_names_per_step() {
        let gb = LocaleId::parse("en-GB");
        let names: Vec<_> = SourceStep::ALL
            .iter()
            .filter_map(|s| s.source_name(&gb))
            .collect();
        assert_eq!(names, vec!["common", "common-GB", "en", "en-GB"]);

        let bare = LocaleId::parse("en");
        let names: Vec<_> = SourceStep::ALL
            .iter()
            .filter_map(|s| s.source_name(&bare))
            .collect();
        assert_eq!(names, vec!["common", "en"]);
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/common.json", r#"{"a": "1"}"#);
        write_fixture(dir.path(), "i18n/en.json", r#"{"a": "2", "b": "2"}"#);
        write_fixture(dir.path(), "i18n/en-GB.json", r#"{"a": "3"}"#);

        let (table, stats) = loader(dir.path())
            .build("en-GB", LocaleId::parse("en-GB"))
            .unwrap();

        assert_eq!(table.get_string("a"), Some("3"));
        assert_eq!(table.get_string("b"), Some("2"));
        assert_eq!(stats.common_files, 1);
        assert_eq!(stats.region_files, 0);
        assert_eq!(stats.language_files, 1);
        assert_eq!(stats.locale_files, 1);
        assert_eq!(stats.total_strings, 2);
        assert_eq!(stats.total_files(), 3);
    }

    #[test]
    fn test_file_and_directory_sources_merge() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/en.json", r#"{"a": "file", "b": "file"}"#);
        write_fixture(dir.path(), "i18n/en/one.json", r#"{"a": "dir"}"#);
        write_fixture(dir.path(), "i18n/en/notes.txt", "not a table");

        let (table, stats) = loader(dir.path())
            .build("en", LocaleId::parse("en"))
            .unwrap();

        assert_eq!(table.get_string("a"), Some("dir"));
        assert_eq!(table.get_string("b"), Some("file"));
        assert_eq!(stats.language_files, 2);
    }

    #[test]
    fn test_malformed_source_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/common.json", r#"{"a": "1"}"#);
        let bad = write_fixture(dir.path(), "i18n/en.json", r#"{"a": "#);

        let err = loader(dir.path())
            .build("en", LocaleId::parse("en"))
            .unwrap_err();

        match err {
            I18nError::MalformedSource { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_source_names_listing() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "i18n/common.json", "{}");
        write_fixture(dir.path(), "i18n/en.json", "{}");
        write_fixture(dir.path(), "i18n/en-US/a.json", "{}");
        write_fixture(dir.path(), "i18n/en-US/b.json", "{}");
        write_fixture(dir.path(), "i18n/readme.md", "");

        let names = loader(dir.path()).source_names();
        assert_eq!(names, vec!["common", "en-US", "en"]);
    }
}
