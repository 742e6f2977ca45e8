//! Editable, reactive table state over collections of typed records.
//!
//! A table is described by a record shape (`#[derive(Record)]`) and a small
//! per-column configuration. [`TableBuilder`] turns that into a
//! [`TableState`]: header/body/footer rows whose body cells are bound both ways
//! to the records, plus column order and width customizations that are
//! validated against the field set and persisted through an optional
//! [`PersistenceBackend`].

extern crate self as tabula;

pub mod binding;
pub mod config;
pub mod customization;
pub mod error;
pub mod persist;
pub mod record;
pub mod rows;
pub mod source;
pub mod state;
pub mod table;
pub mod widget;

pub use binding::{Binding, RecordBinding, bind};
pub use config::TableConfig;
pub use customization::{AxisStatus, ColumnOrders, ColumnWidths, CustomizationStore, Persisted};
pub use error::{BackendError, ConfigError, CustomizationError, WriteError};
pub use persist::{MemoryBackend, PersistenceBackend};
pub use record::{Accessor, Field, FieldValue, Record};
pub use rows::{BodyConfig, CellName, FieldConfig, Row, RowGroups, build_body, cell_name};
pub use source::{LoadState, RecordSource};
pub use state::{ReadState, State, Subscription};
pub use table::{Column, Datalists, Form, Method, TableBuilder, TableHandles, TableState};
pub use widget::{
    Button, CellWidget, HeaderLabel, Input, InputKind, Label, LabelText, Link, Submit, Value,
    Widget, WidgetTag,
};

pub use tabula_derive::Record;

pub mod prelude {
    pub use crate::customization::{ColumnOrders, ColumnWidths};
    pub use crate::persist::{MemoryBackend, PersistenceBackend};
    pub use crate::record::Record;
    pub use crate::rows::{FieldConfig, Row, RowGroups};
    pub use crate::source::RecordSource;
    pub use crate::state::State;
    pub use crate::table::{Column, Form, TableBuilder, TableState};
    pub use crate::widget::{CellWidget, Widget};
    pub use crate::TableConfig;

    pub use tabula_derive::Record;
}
