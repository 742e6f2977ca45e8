//! The tables this application serves.

mod characters;
mod items;
mod locations;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;
use log::debug;
use tabula::{CellWidget, CustomizationStore, LoadState, PersistenceBackend, RowGroups, Widget, WriteError};

use crate::error::CliError;

use characters::CharactersPage;
use items::ItemsPage;
use locations::LocationsPage;

/// What every page needs to open its table.
#[derive(Clone)]
pub struct PageContext {
    /// Directory holding the JSON record files.
    pub data_dir: PathBuf,
    pub backend: Option<Arc<dyn PersistenceBackend>>,
}

/// One table page, with its record type erased.
#[async_trait]
pub trait Page: Send + Sync {
    fn title(&self) -> &'static str;

    fn rowgroups(&self) -> RowGroups;

    fn customization(&self) -> &CustomizationStore;

    fn load_state(&self) -> LoadState;

    fn has_unsaved_changes(&self) -> bool;

    /// Fetch the page's records.
    async fn load(&self) -> Result<(), CliError>;

    /// Send pending edits back to the record file, the way the page's
    /// footer "Update" control does.
    async fn submit(&self) -> Result<(), CliError>;
}

/// Selectable tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageKind {
    Characters,
    Locations,
    Items,
}

impl PageKind {
    /// Build the page and load its records.
    pub async fn open(self, ctx: &PageContext) -> Result<Box<dyn Page>, CliError> {
        let page: Box<dyn Page> = match self {
            PageKind::Characters => Box::new(CharactersPage::open(ctx).await?),
            PageKind::Locations => Box::new(LocationsPage::open(ctx).await?),
            PageKind::Items => Box::new(ItemsPage::open(ctx).await?),
        };
        page.load().await?;
        debug!("opened {} ({:?})", page.title(), page.load_state());
        Ok(page)
    }
}

/// Write `value` into the body cell called `name`.
///
/// Number cells refuse text that does not parse, and numbers the bound field
/// cannot hold exactly (a fraction for an integer field, `NaN`, ...).
pub fn edit_cell(groups: &RowGroups, name: &str, value: &str) -> Result<(), CliError> {
    let not_a_number = || CliError::NotANumber {
        name: name.to_string(),
        value: value.to_string(),
    };
    let Some(CellWidget::Widget(widget)) = groups.find_cell(name) else {
        return Err(CliError::UnknownCell(name.to_string()));
    };
    match widget {
        Widget::Text(input) | Widget::Search(input) => input.value.write(value.to_string())?,
        Widget::Number(input) => {
            let number: f64 = value.trim().parse().map_err(|_| not_a_number())?;
            input.value.write(number).map_err(|e| match e {
                WriteError::Unrepresentable { .. } => not_a_number(),
                other => other.into(),
            })?;
        }
        _ => return Err(CliError::UnknownCell(name.to_string())),
    }
    Ok(())
}

/// Set the header search input for column `key`.
pub fn set_filter(groups: &RowGroups, key: &str, value: &str) -> Result<(), CliError> {
    let search = groups.header.iter().find_map(|row| match row.cell(key) {
        Some(CellWidget::Widget(Widget::Search(input))) => Some(input),
        _ => None,
    });
    match search {
        Some(input) => Ok(input.value.write(value.to_string())?),
        None => Err(CliError::UnknownFilter(key.to_string())),
    }
}

/// `(name, value)` of every body input attached to `form`, in row order.
pub fn form_entries(groups: &RowGroups, form: &str) -> Vec<(String, String)> {
    groups
        .body
        .iter()
        .filter_map(|row| match row {
            tabula::Row::Cells(cells) => Some(cells.values()),
            tabula::Row::Widgets(_) => None,
        })
        .flatten()
        .filter_map(CellWidget::widget)
        .filter(|widget| widget.form() == Some(form))
        .filter_map(|widget| Some((widget.name()?.to_string(), widget.display())))
        .collect()
}
