//! Plain numeric items with per-column search filters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabula::prelude::*;
use tabula::{CustomizationStore, Input, LoadState, RowGroups, Value};

use super::{Page, PageContext};
use crate::error::CliError;
use crate::source::JsonFileSource;

const SEED: &str = include_str!("../../data/items.json");
const FILTER_FORM: &str = "filter-form";
const UPDATE_FORM: &str = "update-form";
const KEYS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Record)]
pub struct Item {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

pub struct ItemsPage {
    table: TableState<Item>,
    source: JsonFileSource<Item>,
}

fn search_row() -> Row {
    Row::cells(KEYS.map(|key| {
        let input = Input::new(key, Value::detached(String::new())).form(FILTER_FORM);
        (key, CellWidget::from(Widget::Search(input)))
    }))
}

impl ItemsPage {
    pub async fn open(ctx: &PageContext) -> Result<Self, CliError> {
        let source = JsonFileSource::new(ctx.data_dir.join("items.json"));
        source.seed(SEED).await?;

        let mut builder = TableBuilder::new(TableConfig::new("items"));
        for key in KEYS {
            builder = builder.column(
                key,
                Column::new(key.to_uppercase()).input(FieldConfig::number().form(UPDATE_FORM)),
            );
        }
        let table = builder
            .form(FILTER_FORM, Form::get())
            .form(UPDATE_FORM, Form::post())
            .header_row_with(|handles| {
                Row::widgets([
                    Widget::submit("Filter", FILTER_FORM),
                    handles.customization_label(),
                ])
            })
            .header_row(search_row())
            .footer_row(Row::widgets([Widget::submit("Update", UPDATE_FORM)]))
            .maybe_backend(ctx.backend.clone())
            .build()?;

        Ok(Self { table, source })
    }
}

#[async_trait]
impl Page for ItemsPage {
    fn title(&self) -> &'static str {
        "Items"
    }

    fn rowgroups(&self) -> RowGroups {
        self.table.rowgroups()
    }

    fn customization(&self) -> &CustomizationStore {
        self.table.customization()
    }

    fn load_state(&self) -> LoadState {
        self.table.load_state()
    }

    fn has_unsaved_changes(&self) -> bool {
        self.table.has_unsaved_changes()
    }

    async fn load(&self) -> Result<(), CliError> {
        Ok(self.table.load(&self.source).await?)
    }

    async fn submit(&self) -> Result<(), CliError> {
        Ok(self.table.save(&self.source).await?)
    }
}
