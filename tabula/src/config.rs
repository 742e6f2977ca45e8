//! Table configuration

/// Settings shared by every table built with [`TableBuilder`](crate::TableBuilder).
///
/// # Example
///
/// ```
/// use tabula::TableConfig;
///
/// let config = TableConfig::new("characters")
///     .with_name_prefix("characters-")
///     .with_default_width("120px");
/// assert_eq!(config.storage_key, "characters");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Prefix of the persisted customization keys.
    ///
    /// Default: `"table"`
    pub storage_key: String,

    /// Prefix of generated cell names (`prefix + index + "-" + key`).
    ///
    /// Default: `"items-"`
    pub name_prefix: String,

    /// Width for columns that do not declare one.
    ///
    /// Default: `"auto"`
    pub default_width: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            storage_key: "table".into(),
            name_prefix: "items-".into(),
            default_width: "auto".into(),
        }
    }
}

impl TableConfig {
    /// Creates a config persisting under `storage_key`, other values default.
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            ..Self::default()
        }
    }

    /// Sets the cell name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the fallback column width.
    pub fn with_default_width(mut self, width: impl Into<String>) -> Self {
        self.default_width = width.into();
        self
    }
}
