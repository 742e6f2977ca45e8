//! Rows, row groups and the body row builder.

use std::collections::BTreeMap;
use std::fmt;

use log::trace;

use crate::binding::bind;
use crate::error::ConfigError;
use crate::record::{Accessor, Record};
use crate::state::State;
use crate::widget::{CellWidget, InputKind, Widget};

/// How one field renders in a body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    pub kind: InputKind,
    pub list: Option<String>,
    pub form: Option<String>,
}

impl FieldConfig {
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            list: None,
            form: None,
        }
    }

    pub fn text() -> Self {
        Self::new(InputKind::Text)
    }

    pub fn number() -> Self {
        Self::new(InputKind::Number)
    }

    pub fn search() -> Self {
        Self::new(InputKind::Search)
    }

    /// Reference a datalist by name.
    pub fn list(mut self, list: impl Into<String>) -> Self {
        self.list = Some(list.into());
        self
    }

    /// Attach the inputs to a form by id.
    pub fn form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }
}

/// A body field configuration resolved against a record shape.
///
/// Resolution happens once: unknown fields and kind mismatches are reported
/// here, so building rows afterwards cannot fail.
pub struct BodyConfig<R> {
    columns: Vec<ResolvedField<R>>,
}

struct ResolvedField<R> {
    key: String,
    accessor: Accessor<R>,
    config: FieldConfig,
}

impl<R: Record> BodyConfig<R> {
    pub fn new<K>(fields: impl IntoIterator<Item = (K, FieldConfig)>) -> Result<Self, ConfigError>
    where
        K: Into<String>,
    {
        let mut columns: Vec<ResolvedField<R>> = Vec::new();
        for (key, config) in fields {
            let key = key.into();
            if columns.iter().any(|c| c.key == key) {
                return Err(ConfigError::DuplicateField(key));
            }
            let accessor = R::accessor(&key).ok_or_else(|| ConfigError::UnknownField {
                record: std::any::type_name::<R>(),
                field: key.clone(),
            })?;
            if !accessor.accepts(config.kind) {
                return Err(ConfigError::KindMismatch {
                    field: key,
                    channel: accessor.channel(),
                    kind: config.kind,
                });
            }
            columns.push(ResolvedField {
                key,
                accessor,
                config,
            });
        }
        Ok(Self { columns })
    }
}

impl<R> BodyConfig<R> {
    /// Configured keys, in configuration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<R> fmt::Debug for BodyConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.columns.iter().map(|c| (&c.key, &c.config)))
            .finish()
    }
}

/// A table row.
#[derive(Debug, Clone)]
pub enum Row {
    /// Cells addressed by field key; not every key has to be present.
    Cells(BTreeMap<String, CellWidget>),
    /// A free-form run of widgets, e.g. a toolbar.
    Widgets(Vec<Widget>),
}

impl Row {
    /// An empty cell row.
    pub fn empty() -> Self {
        Row::Cells(BTreeMap::new())
    }

    pub fn cells<K>(cells: impl IntoIterator<Item = (K, CellWidget)>) -> Self
    where
        K: Into<String>,
    {
        Row::Cells(cells.into_iter().map(|(k, c)| (k.into(), c)).collect())
    }

    pub fn widgets(widgets: impl IntoIterator<Item = Widget>) -> Self {
        Row::Widgets(widgets.into_iter().collect())
    }

    /// The cell for `key`, if this is a cell row that has one.
    pub fn cell(&self, key: &str) -> Option<&CellWidget> {
        match self {
            Row::Cells(cells) => cells.get(key),
            Row::Widgets(_) => None,
        }
    }
}

/// The three row groups of a table.
#[derive(Debug, Clone, Default)]
pub struct RowGroups {
    pub header: Vec<Row>,
    pub body: Vec<Row>,
    pub footer: Vec<Row>,
}

impl RowGroups {
    /// Find a body cell by its widget name.
    pub fn find_cell(&self, name: &str) -> Option<&CellWidget> {
        self.body.iter().find_map(|row| match row {
            Row::Cells(cells) => cells.values().find(|c| c.name() == Some(name)),
            Row::Widgets(_) => None,
        })
    }

    /// Every widget in header and footer free-form rows.
    pub fn furniture(&self) -> impl Iterator<Item = &Widget> {
        self.header
            .iter()
            .chain(self.footer.iter())
            .filter_map(|row| match row {
                Row::Widgets(widgets) => Some(widgets.iter()),
                Row::Cells(_) => None,
            })
            .flatten()
    }

    /// Find a button in the header or footer toolbars by label.
    pub fn find_button(&self, label: &str) -> Option<&crate::widget::Button> {
        self.furniture().find_map(|widget| match widget {
            Widget::Button(button) if button.label == label => Some(button),
            _ => None,
        })
    }
}

/// Widget name for the cell of `key` in record `index`.
pub fn cell_name(prefix: &str, index: usize, key: &str) -> String {
    format!("{prefix}{index}-{key}")
}

/// A cell name split back into its parts.
///
/// Names are `prefix + index + "-" + key`. The prefix is everything before
/// the last run of digits that is followed by `-`, so keys may contain `-`
/// only if the prefix is known. Use [`CellName::parse_with_prefix`] then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellName {
    pub prefix: String,
    pub index: usize,
    pub key: String,
}

impl CellName {
    /// Parse a name whose key contains no `-`.
    pub fn parse(name: &str) -> Option<Self> {
        let (head, key) = name.rsplit_once('-')?;
        let digits = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)?;
        Self::from_parts(&head[..digits], &head[digits..], key)
    }

    /// Parse a name produced with a known prefix.
    pub fn parse_with_prefix(name: &str, prefix: &str) -> Option<Self> {
        let rest = name.strip_prefix(prefix)?;
        let (index, key) = rest.split_once('-')?;
        Self::from_parts(prefix, index, key)
    }

    fn from_parts(prefix: &str, index: &str, key: &str) -> Option<Self> {
        if key.is_empty() {
            return None;
        }
        Some(Self {
            prefix: prefix.to_string(),
            index: index.parse().ok()?,
            key: key.to_string(),
        })
    }
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cell_name(&self.prefix, self.index, &self.key))
    }
}

/// Build one live-bound row per record, in collection order.
///
/// Each row holds exactly the configured keys. Cells are named
/// `prefix + index + "-" + key` so same-named fields stay distinct across rows.
pub fn build_body<R>(records: &State<Vec<R>>, config: &BodyConfig<R>, prefix: &str) -> Vec<Row>
where
    R: Send + Sync + 'static,
{
    let count = records.with(Vec::len);
    trace!("building {count} body rows");
    (0..count)
        .map(|index| {
            Row::Cells(
                config
                    .columns
                    .iter()
                    .map(|column| {
                        let name = cell_name(prefix, index, &column.key);
                        let cell = bind(records, index, column.accessor, name, &column.config);
                        (column.key.clone(), cell)
                    })
                    .collect(),
            )
        })
        .collect()
}
