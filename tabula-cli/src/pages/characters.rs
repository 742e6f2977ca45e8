//! Fantasy characters, edited inline and saved with an "Update" button.

use std::sync::Mutex;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use tabula::prelude::*;
use tabula::{CustomizationStore, LoadState, RowGroups};
use tokio::sync::mpsc;

use super::{Page, PageContext};
use crate::error::CliError;
use crate::source::JsonFileSource;

const SEED: &str = include_str!("../../data/characters.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Character {
    pub character: String,
    pub race: String,
    pub class: String,
    #[serde(deserialize_with = "level_from_any")]
    pub level: i64,
    pub home_realm: String,
    pub notable_achievement: String,
    pub primary_magic_type: String,
}

/// Levels arrive either as numbers or as digit strings.
fn level_from_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Number(i64),
        Text(String),
    }

    match Level::deserialize(deserializer)? {
        Level::Number(n) => Ok(n),
        Level::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("level '{s}' is not an integer"))),
    }
}

/// Sent by the footer button; the page performs the save.
#[derive(Debug)]
struct SaveRequest;

pub struct CharactersPage {
    table: TableState<Character>,
    source: JsonFileSource<Character>,
    saves: Mutex<mpsc::UnboundedReceiver<SaveRequest>>,
}

const COLUMNS: [(&str, &str, &str); 7] = [
    ("character", "Character", "125px"),
    ("race", "Race", "155px"),
    ("class", "Class", "116px"),
    ("level", "Level", "95px"),
    ("home_realm", "Home_Realm", "239px"),
    ("notable_achievement", "Notable_Achievement", "258px"),
    ("primary_magic_type", "Primary_Magic_Type", "214px"),
];

impl CharactersPage {
    pub async fn open(ctx: &PageContext) -> Result<Self, CliError> {
        let source = JsonFileSource::new(ctx.data_dir.join("characters.json"));
        source.seed(SEED).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut builder = TableBuilder::new(TableConfig::new("characters").with_name_prefix("characters-"));
        for (key, label, width) in COLUMNS {
            let input = if key == "level" {
                FieldConfig::number()
            } else {
                FieldConfig::text()
            };
            builder = builder.column(key, Column::new(label).width(width).input(input.list(key)));
        }

        let table = builder
            .datalists(COLUMNS.map(|(key, _, _)| key))
            .header_row_with(|handles| {
                Row::widgets([
                    Widget::submit("Filter", "filter-form"),
                    handles.customization_label(),
                ])
            })
            .header_row(Row::empty())
            .footer_row(Row::widgets([Widget::button("Update", move || {
                if tx.send(SaveRequest).is_err() {
                    warn!("characters page is gone; update ignored");
                }
            })]))
            .maybe_backend(ctx.backend.clone())
            .build()?;

        Ok(Self {
            table,
            source,
            saves: Mutex::new(rx),
        })
    }

    fn pending_saves(&self) -> usize {
        let mut rx = self.saves.lock().unwrap_or_else(|e| e.into_inner());
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

#[async_trait]
impl Page for CharactersPage {
    fn title(&self) -> &'static str {
        "Characters"
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
        if let Some(update) = self.rowgroups().find_button("Update") {
            update.press();
        }
        let requests = self.pending_saves();
        if requests == 0 {
            return Ok(());
        }
        debug!("saving characters ({requests} update requests)");
        Ok(self.table.save(&self.source).await?)
    }
}
