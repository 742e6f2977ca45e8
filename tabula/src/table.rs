//! Table state: customizations, row groups and derived views in one value.
//!
//! A [`TableState`] is assembled once by [`TableBuilder`] and then read by the
//! rendering layer. Everything that derives from mutable state (column order,
//! column widths, datalists, body rows) is recomputed on each read, so edits
//! to records or customizations show up without rebuilding the table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::TableConfig;
use crate::customization::{ColumnOrders, ColumnWidths, CustomizationStore, summarize};
use crate::error::ConfigError;
use crate::persist::PersistenceBackend;
use crate::record::{Accessor, Record};
use crate::rows::{BodyConfig, FieldConfig, Row, RowGroups, build_body};
use crate::source::{LoadState, RecordSource};
use crate::state::{ReadState, State};
use crate::widget::{CellWidget, Widget};

/// Suggestion lists: field name to `value -> label`.
pub type Datalists = BTreeMap<String, BTreeMap<String, String>>;

/// HTTP method of a logical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A named logical form that inputs attach to by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_values: Option<BTreeMap<String, String>>,
}

impl Form {
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            action: None,
            default_values: None,
        }
    }

    pub fn post() -> Self {
        Self {
            method: Method::Post,
            ..Self::get()
        }
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_values
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header label text.
    pub label: String,
    /// Default width; falls back to [`TableConfig::default_width`].
    pub width: Option<String>,
    /// How body cells render. `None` leaves the column without body cells.
    pub input: Option<FieldConfig>,
}

impl Column {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            width: None,
            input: None,
        }
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn input(mut self, input: FieldConfig) -> Self {
        self.input = Some(input);
        self
    }
}

/// Live handles available while header and footer rows are being built.
///
/// The customization handles are read-only; changes go through
/// [`TableState::customization`] so they are validated first.
pub struct TableHandles<R> {
    pub records: State<Vec<R>>,
    pub column_orders: ReadState<ColumnOrders>,
    pub column_widths: ReadState<ColumnWidths>,
}

impl<R> TableHandles<R> {
    /// A label showing the current customization as JSON.
    pub fn customization_label(&self) -> Widget {
        let orders = self.column_orders.clone();
        let widths = self.column_widths.clone();
        Widget::computed_label(move || summarize(&orders, &widths))
    }
}

type RowFactory<R> = Box<dyn FnOnce(&TableHandles<R>) -> Row + Send>;

/// Builder for [`TableState`].
///
/// # Example
///
/// ```
/// use tabula::{Column, FieldConfig, Record, TableBuilder, TableConfig};
///
/// #[derive(Record)]
/// struct Item {
///     a: i64,
///     b: i64,
/// }
///
/// let table = TableBuilder::new(TableConfig::new("items"))
///     .column("a", Column::new("A").input(FieldConfig::number()))
///     .column("b", Column::new("B"))
///     .records(vec![Item { a: 1, b: 2 }])
///     .build()
///     .unwrap();
///
/// assert_eq!(table.column_orders(), vec!["a", "b"]);
/// assert_eq!(table.rowgroups().body.len(), 1);
/// ```
pub struct TableBuilder<R> {
    config: TableConfig,
    columns: Vec<(String, Column)>,
    body_fields: Option<Vec<(String, FieldConfig)>>,
    records: State<Vec<R>>,
    header: Vec<RowFactory<R>>,
    footer: Vec<RowFactory<R>>,
    forms: Option<BTreeMap<String, Form>>,
    datalists: Option<Vec<String>>,
    backend: Option<Arc<dyn PersistenceBackend>>,
}

impl<R> TableBuilder<R>
where
    R: Record,
{
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            columns: Vec::new(),
            body_fields: None,
            records: State::new(Vec::new()),
            header: Vec::new(),
            footer: Vec::new(),
            forms: None,
            datalists: None,
            backend: None,
        }
    }

    /// Add a column. Columns define the field set and default display order.
    pub fn column(mut self, key: impl Into<String>, column: Column) -> Self {
        self.columns.push((key.into(), column));
        self
    }

    /// Use exactly these body cells instead of the columns' inputs.
    pub fn body_fields<K: Into<String>>(mut self, fields: impl IntoIterator<Item = (K, FieldConfig)>) -> Self {
        self.body_fields = Some(fields.into_iter().map(|(key, config)| (key.into(), config)).collect());
        self
    }

    /// Start with these records.
    pub fn records(self, records: Vec<R>) -> Self {
        self.records.set(records);
        self.records.clear_dirty();
        self
    }

    /// Share an existing record collection instead of owning a fresh one.
    pub fn shared_records(mut self, records: State<Vec<R>>) -> Self {
        self.records = records;
        self
    }

    /// Append a literal header row.
    pub fn header_row(mut self, row: Row) -> Self {
        self.header.push(Box::new(move |_: &TableHandles<R>| row));
        self
    }

    /// Append a header row that needs live table handles.
    pub fn header_row_with(mut self, f: impl FnOnce(&TableHandles<R>) -> Row + Send + 'static) -> Self {
        self.header.push(Box::new(f));
        self
    }

    /// Append a literal footer row.
    pub fn footer_row(mut self, row: Row) -> Self {
        self.footer.push(Box::new(move |_: &TableHandles<R>| row));
        self
    }

    /// Append a footer row that needs live table handles.
    pub fn footer_row_with(mut self, f: impl FnOnce(&TableHandles<R>) -> Row + Send + 'static) -> Self {
        self.footer.push(Box::new(f));
        self
    }

    /// Declare a logical form.
    pub fn form(mut self, id: impl Into<String>, form: Form) -> Self {
        self.forms
            .get_or_insert_with(BTreeMap::new)
            .insert(id.into(), form);
        self
    }

    /// Offer suggestion lists built from the current values of these fields.
    pub fn datalists<K: Into<String>>(mut self, fields: impl IntoIterator<Item = K>) -> Self {
        self.datalists = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Persist customizations to `backend`. Without one nothing is persisted.
    pub fn backend(mut self, backend: Arc<dyn PersistenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Like [`backend`](Self::backend) but takes an optional backend.
    pub fn maybe_backend(mut self, backend: Option<Arc<dyn PersistenceBackend>>) -> Self {
        self.backend = backend;
        self
    }

    /// Resolve the configuration and restore persisted customizations.
    pub fn build(self) -> Result<TableState<R>, ConfigError> {
        let body = match self.body_fields {
            Some(fields) => BodyConfig::new(fields)?,
            None => BodyConfig::new(
                self.columns
                    .iter()
                    .filter_map(|(key, column)| column.input.clone().map(|input| (key.clone(), input))),
            )?,
        };

        let datalists = self
            .datalists
            .map(|fields| {
                fields
                    .into_iter()
                    .map(|field| {
                        R::accessor(&field).ok_or_else(|| ConfigError::UnknownField {
                            record: std::any::type_name::<R>(),
                            field,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let default_orders: ColumnOrders = self.columns.iter().map(|(key, _)| key.clone()).collect();
        let default_widths: ColumnWidths = self
            .columns
            .iter()
            .map(|(key, column)| {
                let width = column
                    .width
                    .clone()
                    .unwrap_or_else(|| self.config.default_width.clone());
                (key.clone(), width)
            })
            .collect();
        let customization = CustomizationStore::new(
            &self.config.storage_key,
            default_orders,
            default_widths,
            self.backend,
        )?;

        let handles = TableHandles {
            records: self.records.clone(),
            column_orders: customization.orders().state(),
            column_widths: customization.widths().state(),
        };
        let mut header: Vec<Row> = self.header.into_iter().map(|f| f(&handles)).collect();
        if !self.columns.is_empty() {
            header.push(Row::cells(
                self.columns
                    .iter()
                    .map(|(key, column)| (key.clone(), CellWidget::header(column.label.clone()))),
            ));
        }
        let footer = self.footer.into_iter().map(|f| f(&handles)).collect();

        debug!(
            "built table '{}' with {} columns, {} body fields",
            self.config.storage_key,
            self.columns.len(),
            body.len()
        );

        Ok(TableState {
            config: self.config,
            records: self.records,
            body,
            customization,
            header,
            footer,
            forms: self.forms,
            datalists,
            load_state: State::new(LoadState::Idle),
        })
    }
}

/// The assembled state of one table.
pub struct TableState<R> {
    config: TableConfig,
    records: State<Vec<R>>,
    body: BodyConfig<R>,
    customization: CustomizationStore,
    header: Vec<Row>,
    footer: Vec<Row>,
    forms: Option<BTreeMap<String, Form>>,
    datalists: Option<Vec<Accessor<R>>>,
    load_state: State<LoadState>,
}

impl<R> TableState<R>
where
    R: Send + Sync + 'static,
{
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Current display order of the columns.
    pub fn column_orders(&self) -> ColumnOrders {
        self.customization.column_orders()
    }

    /// Current explicit column widths.
    pub fn column_widths(&self) -> ColumnWidths {
        self.customization.column_widths()
    }

    /// Column order and width customizations.
    pub fn customization(&self) -> &CustomizationStore {
        &self.customization
    }

    /// Suggestion lists from the current record values.
    pub fn datalists(&self) -> Option<Datalists> {
        let accessors = self.datalists.as_ref()?;
        Some(self.records.with(|records| {
            accessors
                .iter()
                .map(|accessor| {
                    let values: BTreeMap<String, String> = records
                        .iter()
                        .map(|record| {
                            let value = accessor.display(record);
                            (value.clone(), value)
                        })
                        .collect();
                    (accessor.name().to_string(), values)
                })
                .collect()
        }))
    }

    pub fn forms(&self) -> Option<&BTreeMap<String, Form>> {
        self.forms.as_ref()
    }

    /// Body rows bound to the current record collection.
    pub fn body(&self) -> Vec<Row> {
        build_body(&self.records, &self.body, &self.config.name_prefix)
    }

    /// Header, body and footer rows.
    pub fn rowgroups(&self) -> RowGroups {
        RowGroups {
            header: self.header.clone(),
            body: self.body(),
            footer: self.footer.clone(),
        }
    }

    /// The shared record collection.
    pub fn records(&self) -> State<Vec<R>> {
        self.records.clone()
    }

    /// Replace the record collection; body rows follow on the next read.
    pub fn set_records(&self, records: Vec<R>) {
        self.records.set(records);
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.get()
    }

    /// Fetch records from `source`.
    ///
    /// The body stays empty until the fetch resolves. A failed fetch leaves
    /// the current records in place and returns the source's error.
    pub async fn load<S>(&self, source: &S) -> Result<(), S::Error>
    where
        S: RecordSource<R> + ?Sized,
    {
        self.load_state.set(LoadState::Loading);
        match source.fetch().await {
            Ok(records) => {
                debug!(
                    "loaded {} records into '{}'",
                    records.len(),
                    self.config.storage_key
                );
                self.records.set(records);
                self.records.clear_dirty();
                self.load_state.set(LoadState::Ready);
                Ok(())
            }
            Err(e) => {
                warn!("loading '{}' failed: {e}", self.config.storage_key);
                self.load_state.set(LoadState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Hand the current records to `source` for persisting.
    pub async fn save<S>(&self, source: &S) -> Result<(), S::Error>
    where
        S: RecordSource<R> + ?Sized,
        R: Clone,
    {
        source.persist(self.records.get()).await?;
        self.records.clear_dirty();
        Ok(())
    }

    /// Whether records were edited since they were loaded or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.records.is_dirty()
    }

    /// One-line JSON view of the customization.
    pub fn customization_summary(&self) -> String {
        self.customization.summary()
    }
}

impl<R> fmt::Debug for TableState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("config", &self.config)
            .field("body", &self.body)
            .field("customization", &self.customization)
            .field("forms", &self.forms)
            .finish_non_exhaustive()
    }
}
