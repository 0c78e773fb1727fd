//! Raw string storage: identifier to text, merged from JSON sources.

use crate::error::{I18nError, I18nResult};
use indexmap::IndexMap;

/// Ordered mapping from string identifier to localized text.
///
/// Tables are filled by one or more [`load`](Self::load) calls. A later load
/// overwrites values of identifiers it shares with an earlier one; a failed
/// load leaves the table exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    data: IndexMap<String, String>,
}

impl StringTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a flat JSON object of string values into the table.
    ///
    /// The whole text is parsed before anything is merged, so a parse failure
    /// has no effect on the table.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::Parse`] when the text is not a JSON object whose
    /// values are all strings.
    pub fn load(&mut self, source: &str) -> I18nResult<()> {
        let entries: IndexMap<String, String> =
            serde_json::from_str(source).map_err(I18nError::Parse)?;
        self.data.extend(entries);
        Ok(())
    }

    /// Look up the text for an identifier.
    #[must_use]
    pub fn get_string(&self, id: &str) -> Option<&str> {
        self.data.get(id).map(String::as_str)
    }

    /// Set the text of a single identifier.
    pub fn set_string(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.data.insert(id.into(), value.into());
    }

    /// Whether the identifier has an entry.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.data.contains_key(id)
    }

    /// Number of identifiers in the table.
    #[must_use]
    pub fn num_strings(&self) -> usize {
        self.data.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
