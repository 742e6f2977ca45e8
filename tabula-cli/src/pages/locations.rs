//! Fantasy locations, flattened into one editable text row each.
//!
//! The record file keeps inhabitants as a list and coordinates as `{x, y}`.
//! The table edits them as `"a,b,c"` and `"x,y"` and converts back on submit.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tabula::prelude::*;
use tabula::{CellName, CustomizationStore, LoadState, RowGroups};

use super::{Page, PageContext, form_entries};
use crate::error::{CliError, SourceError};
use crate::source::JsonFileSource;

const SEED: &str = include_str!("../../data/locations.json");
const PREFIX: &str = "locations-";
const UPDATE_FORM: &str = "update-form";

static COORDINATES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*$").expect("Hardcode regex pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub r#type: String,
    pub description: String,
    pub inhabitants: Vec<String>,
    pub coordinates: Coordinates,
}

/// The form shape of a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Record)]
pub struct LocationRow {
    pub name: String,
    pub r#type: String,
    pub description: String,
    pub inhabitants: String,
    pub coordinates: String,
}

impl From<Location> for LocationRow {
    fn from(location: Location) -> Self {
        Self {
            name: location.name,
            r#type: location.r#type,
            description: location.description,
            inhabitants: location.inhabitants.join(","),
            coordinates: format!("{},{}", location.coordinates.x, location.coordinates.y),
        }
    }
}

impl TryFrom<LocationRow> for Location {
    type Error = String;

    fn try_from(row: LocationRow) -> Result<Self, String> {
        let caps = COORDINATES
            .captures(&row.coordinates)
            .ok_or_else(|| format!("coordinates '{}' are not 'x,y'", row.coordinates))?;
        let axis = |i: usize| {
            caps[i]
                .parse::<u32>()
                .map_err(|e| format!("coordinate '{}': {e}", &caps[i]))
        };
        let coordinates = Coordinates {
            x: axis(1)?,
            y: axis(2)?,
        };
        let inhabitants = row
            .inhabitants
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Ok(Self {
            name: row.name,
            r#type: row.r#type,
            description: row.description,
            inhabitants,
            coordinates,
        })
    }
}

/// Rebuild rows from submitted `(name, value)` pairs named `locations-<i>-<key>`.
///
/// Pairs with foreign names are ignored. Every row must carry every field.
pub fn rows_from_form(entries: &[(String, String)]) -> Result<Vec<LocationRow>, SourceError> {
    let mut rows: BTreeMap<usize, BTreeMap<String, String>> = BTreeMap::new();
    for (name, value) in entries {
        let Some(cell) = CellName::parse_with_prefix(name, PREFIX) else {
            debug!("ignoring form entry '{name}'");
            continue;
        };
        rows.entry(cell.index)
            .or_default()
            .insert(cell.key, value.clone());
    }

    rows.into_iter()
        .map(|(index, mut fields)| {
            let mut take = |key: &str| {
                fields.remove(key).ok_or_else(|| SourceError::Shape {
                    index,
                    message: format!("missing field '{key}'"),
                })
            };
            Ok(LocationRow {
                name: take("name")?,
                r#type: take("type")?,
                description: take("description")?,
                inhabitants: take("inhabitants")?,
                coordinates: take("coordinates")?,
            })
        })
        .collect()
}

/// Reads [`Location`]s and serves them as [`LocationRow`]s.
pub struct LocationSource {
    file: JsonFileSource<Location>,
}

#[async_trait]
impl RecordSource<LocationRow> for LocationSource {
    type Error = SourceError;

    async fn fetch(&self) -> Result<Vec<LocationRow>, SourceError> {
        Ok(self.file.read().await?.into_iter().map(Into::into).collect())
    }

    async fn persist(&self, rows: Vec<LocationRow>) -> Result<(), SourceError> {
        let locations = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                Location::try_from(row).map_err(|message| SourceError::Shape { index, message })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.file.write(&locations).await
    }
}

pub struct LocationsPage {
    table: TableState<LocationRow>,
    source: LocationSource,
}

impl LocationsPage {
    pub async fn open(ctx: &PageContext) -> Result<Self, CliError> {
        let file = JsonFileSource::new(ctx.data_dir.join("locations.json"));
        file.seed(SEED).await?;

        let text = || FieldConfig::text().form(UPDATE_FORM);
        let table = TableBuilder::new(TableConfig::new("locations").with_name_prefix(PREFIX))
            .column("name", Column::new("Name").input(text()))
            .column("type", Column::new("Type").input(text()))
            .column("description", Column::new("Description").input(text()))
            .column("inhabitants", Column::new("Inhabitants").input(text()))
            .column("coordinates", Column::new("Coordinates").input(text()))
            .form(UPDATE_FORM, Form::post())
            .header_row_with(|handles| {
                Row::widgets([
                    Widget::submit("Filter", "filter-form"),
                    Widget::link("Characters", "/characters"),
                    handles.customization_label(),
                ])
            })
            .header_row(Row::empty())
            .footer_row(Row::widgets([Widget::submit("Update", UPDATE_FORM)]))
            .maybe_backend(ctx.backend.clone())
            .build()?;

        Ok(Self {
            table,
            source: LocationSource { file },
        })
    }
}

#[async_trait]
impl Page for LocationsPage {
    fn title(&self) -> &'static str {
        "Locations"
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

    /// Submit the update form: collect its inputs and write them back.
    async fn submit(&self) -> Result<(), CliError> {
        let entries = form_entries(&self.rowgroups(), UPDATE_FORM);
        let rows = rows_from_form(&entries)?;
        self.source.persist(rows).await?;
        self.table.records().clear_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn woods() -> Location {
        Location {
            name: "Whispering Woods".into(),
            r#type: "Forest".into(),
            description: "Old trees".into(),
            inhabitants: vec!["Elves".into(), "Dryads".into()],
            coordinates: Coordinates { x: 12, y: 40 },
        }
    }

    #[test]
    fn test_flattening() {
        let row = LocationRow::from(woods());
        assert_eq!(row.inhabitants, "Elves,Dryads");
        assert_eq!(row.coordinates, "12,40");
        assert_eq!(Location::try_from(row).unwrap(), woods());
    }

    #[test]
    fn test_coordinates_must_be_two_numbers() {
        for bad in ["12", "12,", "x,4", "1,2,3", "-1,2"] {
            let row = LocationRow {
                coordinates: bad.into(),
                ..LocationRow::from(woods())
            };
            assert!(Location::try_from(row).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_rows_from_form_groups_by_index() {
        let mut entries = Vec::new();
        for (i, name) in [(1, "B"), (0, "A")] {
            for (key, value) in [
                ("name", name),
                ("type", "Town"),
                ("description", ""),
                ("inhabitants", "Humans"),
                ("coordinates", "1,2"),
            ] {
                entries.push((format!("locations-{i}-{key}"), value.to_string()));
            }
        }
        entries.push(("filter".into(), "x".into()));

        let rows = rows_from_form(&entries).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[1].name, "B");
    }

    #[test]
    fn test_rows_from_form_requires_every_field() {
        let entries = vec![("locations-0-name".to_string(), "A".to_string())];
        assert!(matches!(
            rows_from_form(&entries),
            Err(SourceError::Shape { index: 0, .. })
        ));
    }

    #[test]
    fn test_seed_data_parses() {
        let locations: Vec<Location> = serde_json::from_str(SEED).unwrap();
        assert!(!locations.is_empty());
    }
}
