//! Two-way bindings between widgets and record fields.

use std::fmt;

use log::debug;

use crate::error::WriteError;
use crate::record::{Accessor, Field};
use crate::rows::FieldConfig;
use crate::state::State;
use crate::widget::{CellWidget, Input, InputKind, Value, Widget};

/// A live read/write channel.
///
/// Reads are evaluated on every call, never cached. Writes take effect
/// immediately or not at all: a value the target cannot hold exactly is
/// refused rather than coerced.
pub trait Binding<T>: Send + Sync {
    fn read(&self) -> T;

    fn write(&self, value: T) -> Result<(), WriteError>;
}

/// Binds one field of one record inside a shared record collection.
///
/// The binding holds a handle to the collection plus the record's index; it
/// never copies the record. Writes mutate the record in place.
pub struct RecordBinding<R, T> {
    records: State<Vec<R>>,
    index: usize,
    field: Field<R, T>,
}

impl<R, T> RecordBinding<R, T> {
    pub fn new(records: State<Vec<R>>, index: usize, field: Field<R, T>) -> Self {
        Self {
            records,
            index,
            field,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn field_name(&self) -> &'static str {
        self.field.name()
    }
}

impl<R, T> Binding<T> for RecordBinding<R, T>
where
    R: Send + Sync,
    T: Default + fmt::Display,
{
    fn read(&self) -> T {
        self.records.with(|records| match records.get(self.index) {
            Some(record) => self.field.get(record),
            // The collection was replaced under a stale row.
            None => T::default(),
        })
    }

    fn write(&self, value: T) -> Result<(), WriteError> {
        self.records
            .try_update(|records| {
                let record = records
                    .get_mut(self.index)
                    .ok_or(WriteError::MissingRecord { index: self.index })?;
                self.field
                    .set(record, value)
                    .map_err(|value| WriteError::Unrepresentable {
                        field: self.field.name(),
                        value: value.to_string(),
                    })
            })
            .inspect_err(|e| {
                debug!("dropped write to '{}' of record {}: {e}", self.field.name(), self.index)
            })
    }
}

/// Bind field `accessor` of record `index` and wrap it in the configured input.
///
/// The accessor must accept `config.kind`; `BodyConfig` checks this once when
/// it resolves the configuration.
pub fn bind<R>(
    records: &State<Vec<R>>,
    index: usize,
    accessor: Accessor<R>,
    name: String,
    config: &FieldConfig,
) -> CellWidget
where
    R: Send + Sync + 'static,
{
    let widget = match accessor {
        Accessor::Text(field) => {
            let input = decorate(
                Input::new(name, Value::new(RecordBinding::new(records.clone(), index, field))),
                config,
            );
            match config.kind {
                InputKind::Search => Widget::Search(input),
                _ => Widget::Text(input),
            }
        }
        Accessor::Number(field) => Widget::Number(decorate(
            Input::new(name, Value::new(RecordBinding::new(records.clone(), index, field))),
            config,
        )),
    };
    CellWidget::Widget(widget)
}

fn decorate<T>(mut input: Input<T>, config: &FieldConfig) -> Input<T> {
    input.list = config.list.clone();
    input.form = config.form.clone();
    input
}
