//! Tests for body rows, bindings and the assembled table state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tabula::{
    BodyConfig, CellWidget, Column, ConfigError, FieldConfig, Form, InputKind, LoadState,
    MemoryBackend, Method, PersistenceBackend, Record, RecordSource, Row, State, TableBuilder,
    TableConfig, Widget, WidgetTag, WriteError, build_body,
};

#[derive(Debug, Clone, PartialEq, Record)]
struct Pair {
    a: i64,
    b: i64,
}

#[derive(Debug, Clone, PartialEq, Record)]
struct Hero {
    name: String,
    race: String,
    level: i32,
}

fn heroes() -> Vec<Hero> {
    vec![
        Hero {
            name: "Elara".into(),
            race: "Elf".into(),
            level: 12,
        },
        Hero {
            name: "Borin".into(),
            race: "Dwarf".into(),
            level: 9,
        },
        Hero {
            name: "Lyra".into(),
            race: "Elf".into(),
            level: 4,
        },
    ]
}

fn number_cell(row: &Row, key: &str) -> tabula::Input<f64> {
    match row.cell(key) {
        Some(CellWidget::Widget(Widget::Number(input))) => input.clone(),
        other => panic!("expected number cell for {key}, got {other:?}"),
    }
}

fn text_cell(row: &Row, key: &str) -> tabula::Input<String> {
    match row.cell(key) {
        Some(CellWidget::Widget(Widget::Text(input))) => input.clone(),
        other => panic!("expected text cell for {key}, got {other:?}"),
    }
}

#[test]
fn test_body_contains_only_configured_fields() {
    let records = State::new(vec![Pair { a: 1, b: 2 }]);
    let config = BodyConfig::<Pair>::new([("a", FieldConfig::number())]).unwrap();

    let body = build_body(&records, &config, "x-");

    assert_eq!(body.len(), 1);
    let Row::Cells(cells) = &body[0] else {
        panic!("body rows are cell rows");
    };
    assert_eq!(cells.keys().collect::<Vec<_>>(), vec!["a"]);
    let a = number_cell(&body[0], "a");
    assert_eq!(a.name, "x-0-a");
    assert_eq!(a.value.read(), 1.0);
}

#[test]
fn test_binding_is_live_both_ways() {
    let records = State::new(vec![Pair { a: 1, b: 0 }]);
    let config = BodyConfig::<Pair>::new([("a", FieldConfig::number())]).unwrap();
    let body = build_body(&records, &config, "");
    let cell = number_cell(&body[0], "a");

    cell.value.write(2.0).unwrap();
    assert_eq!(records.get()[0].a, 2);

    records.update(|rs| rs[0].a = 3);
    assert_eq!(cell.value.read(), 3.0);
}

#[test]
fn test_rows_follow_record_order_and_names_are_unique() {
    let records = State::new(heroes());
    let config = BodyConfig::<Hero>::new([
        ("name", FieldConfig::text().list("name").form("update-form")),
        ("level", FieldConfig::number()),
    ])
    .unwrap();

    let body = build_body(&records, &config, "heroes-");

    let names: Vec<String> = body.iter().map(|r| text_cell(r, "name").value.read()).collect();
    assert_eq!(names, vec!["Elara", "Borin", "Lyra"]);

    let second = text_cell(&body[1], "name");
    assert_eq!(second.name, "heroes-1-name");
    assert_eq!(second.list.as_deref(), Some("name"));
    assert_eq!(second.form.as_deref(), Some("update-form"));
    assert_eq!(number_cell(&body[2], "level").name, "heroes-2-level");
}

#[test]
fn test_search_inputs_bind_text_fields() {
    let records = State::new(heroes());
    let config = BodyConfig::<Hero>::new([("race", FieldConfig::search())]).unwrap();
    let body = build_body(&records, &config, "");
    assert_eq!(body[0].cell("race").unwrap().tag(), WidgetTag::Search);
}

#[test]
fn test_empty_collection_builds_empty_body() {
    let records: State<Vec<Hero>> = State::new(Vec::new());
    let config = BodyConfig::<Hero>::new([("name", FieldConfig::text())]).unwrap();
    assert!(build_body(&records, &config, "").is_empty());
}

#[test]
fn test_configuration_errors_surface_at_resolution() {
    let unknown = BodyConfig::<Hero>::new([("class", FieldConfig::text())]);
    assert!(matches!(unknown, Err(ConfigError::UnknownField { field, .. }) if field == "class"));

    let mismatch = BodyConfig::<Hero>::new([("level", FieldConfig::text())]);
    assert_eq!(
        mismatch.err(),
        Some(ConfigError::KindMismatch {
            field: "level".into(),
            channel: "number",
            kind: InputKind::Text,
        })
    );

    let duplicate =
        BodyConfig::<Hero>::new([("name", FieldConfig::text()), ("name", FieldConfig::search())]);
    assert_eq!(duplicate.err(), Some(ConfigError::DuplicateField("name".into())));
}

fn hero_table(backend: Option<Arc<dyn PersistenceBackend>>) -> tabula::TableState<Hero> {
    TableBuilder::new(TableConfig::new("heroes").with_name_prefix("heroes-"))
        .column(
            "name",
            Column::new("Name")
                .width("125px")
                .input(FieldConfig::text().list("name")),
        )
        .column("race", Column::new("Race").input(FieldConfig::text().list("race")))
        .column("level", Column::new("Level").input(FieldConfig::number()))
        .header_row_with(|handles| {
            Row::widgets([
                Widget::submit("Filter", "filter-form"),
                handles.customization_label(),
            ])
        })
        .header_row(Row::empty())
        .form("update-form", Form::post())
        .form("filter-form", Form::get().action("/heroes").default_value("race", "Elf"))
        .datalists(["name", "race", "level"])
        .maybe_backend(backend)
        .records(heroes())
        .build()
        .unwrap()
}

#[test]
fn test_defaults_seeded_from_columns() {
    let table = hero_table(None);
    assert_eq!(table.column_orders(), vec!["name", "race", "level"]);
    let widths = table.column_widths();
    assert_eq!(widths["name"], "125px");
    assert_eq!(widths["race"], "auto");
    assert_eq!(widths["level"], "auto");
}

#[test]
fn test_header_rows_keep_caller_order_then_labels() {
    let table = hero_table(None);
    let groups = table.rowgroups();

    assert_eq!(groups.header.len(), 3);
    assert!(matches!(&groups.header[0], Row::Widgets(w) if w.len() == 2));
    assert!(matches!(&groups.header[1], Row::Cells(c) if c.is_empty()));
    let labels = &groups.header[2];
    assert_eq!(labels.cell("level").unwrap().tag(), WidgetTag::HeaderLabel);
    assert_eq!(labels.cell("level").unwrap().display(), "Level");
    assert!(groups.footer.is_empty());
}

#[test]
fn test_customization_label_is_live() {
    let table = hero_table(None);
    let groups = table.rowgroups();
    let Row::Widgets(toolbar) = &groups.header[0] else {
        panic!("toolbar row");
    };
    let before = toolbar[1].display();
    assert!(before.starts_with(r#"["name","race","level"]"#));

    table.customization().move_column("level", 0).unwrap();

    assert!(toolbar[1].display().starts_with(r#"["level","name","race"]"#));
    assert_eq!(toolbar[1].display(), table.customization_summary());
}

#[test]
fn test_datalists_follow_record_values() {
    let table = hero_table(None);
    let lists = table.datalists().unwrap();
    assert_eq!(lists["race"].len(), 2);
    assert_eq!(lists["race"]["Dwarf"], "Dwarf");
    assert!(lists["level"].contains_key("12"));

    table.records().update(|rs| rs[1].race = "Orc".into());

    let lists = table.datalists().unwrap();
    assert!(lists["race"].contains_key("Orc"));
    assert!(!lists["race"].contains_key("Dwarf"));
}

#[test]
fn test_forms_are_exposed() {
    let table = hero_table(None);
    let forms = table.forms().unwrap();
    assert_eq!(forms["update-form"].method, Method::Post);
    let filter = &forms["filter-form"];
    assert_eq!(filter.method, Method::Get);
    assert_eq!(filter.action.as_deref(), Some("/heroes"));
    assert_eq!(filter.default_values.as_ref().unwrap()["race"], "Elf");
}

#[test]
fn test_body_is_rebuilt_when_records_are_replaced() {
    let table = hero_table(None);
    assert_eq!(table.rowgroups().body.len(), 3);

    table.set_records(vec![Hero {
        name: "Solo".into(),
        race: "Human".into(),
        level: 1,
    }]);

    let body = table.body();
    assert_eq!(body.len(), 1);
    assert_eq!(text_cell(&body[0], "name").value.read(), "Solo");
}

#[test]
fn test_find_cell_by_name_and_edit() {
    let table = hero_table(None);
    let groups = table.rowgroups();
    let Some(CellWidget::Widget(Widget::Number(level))) = groups.find_cell("heroes-1-level") else {
        panic!("cell heroes-1-level");
    };
    level.value.write(10.0).unwrap();
    assert_eq!(table.records().get()[1].level, 10);
    assert!(table.has_unsaved_changes());
}

#[test]
fn test_integer_cells_refuse_values_they_cannot_hold() {
    let table = hero_table(None);
    let groups = table.rowgroups();
    let level = number_cell(&groups.body[0], "level");

    for value in [2.7, f64::NAN, 1e30, -0.5] {
        assert!(matches!(
            level.value.write(value),
            Err(WriteError::Unrepresentable { field: "level", .. })
        ));
    }
    assert_eq!(level.value.read(), 12.0);
    assert_eq!(table.records().get()[0].level, 12);
    assert!(!table.has_unsaved_changes());
}

#[test]
fn test_customizations_restore_into_a_new_table() {
    let backend: Arc<dyn PersistenceBackend> = Arc::new(MemoryBackend::new());
    let table = hero_table(Some(Arc::clone(&backend)));
    table.customization().move_column("race", 0).unwrap();
    table.customization().set_column_width("level", "40px").unwrap();
    drop(table);

    let table = hero_table(Some(backend));
    assert_eq!(table.column_orders(), vec!["race", "name", "level"]);
    assert_eq!(table.column_widths()["level"], "40px");
}

#[test]
fn test_footer_button_sees_live_records() {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);
    let table = TableBuilder::new(TableConfig::new("pairs"))
        .column("a", Column::new("A").input(FieldConfig::number()))
        .column("b", Column::new("B").input(FieldConfig::number()))
        .footer_row_with(move |handles| {
            let records = handles.records.clone();
            Row::widgets([Widget::button("Update", move || {
                *sink.lock().unwrap() = records.get();
            })])
        })
        .records(vec![Pair { a: 1, b: 2 }])
        .build()
        .unwrap();

    let groups = table.rowgroups();
    number_cell(&groups.body[0], "b").value.write(5.0).unwrap();
    groups.find_button("Update").unwrap().press();

    assert_eq!(*saved.lock().unwrap(), vec![Pair { a: 1, b: 5 }]);
}

#[test]
fn test_columns_without_input_have_no_body_cells() {
    let table = TableBuilder::new(TableConfig::default())
        .column("a", Column::new("A").input(FieldConfig::number()))
        .column("b", Column::new("B"))
        .records(vec![Pair { a: 1, b: 2 }])
        .build()
        .unwrap();
    let body = table.body();
    assert!(body[0].cell("a").is_some());
    assert!(body[0].cell("b").is_none());
    assert_eq!(number_cell(&body[0], "a").name, "items-0-a");
    assert_eq!(table.column_orders(), vec!["a", "b"]);
    assert!(table.datalists().is_none());
    assert!(table.forms().is_none());
}

#[test]
fn test_explicit_body_fields_override_column_inputs() {
    let table = TableBuilder::new(TableConfig::default())
        .column("a", Column::new("A").input(FieldConfig::number()))
        .column("b", Column::new("B"))
        .body_fields([("b", FieldConfig::number().form("update-form"))])
        .records(vec![Pair { a: 1, b: 2 }])
        .build()
        .unwrap();
    let body = table.body();
    assert!(body[0].cell("a").is_none());
    let b = number_cell(&body[0], "b");
    assert_eq!(b.form.as_deref(), Some("update-form"));
    assert_eq!(b.value.read(), 2.0);

    let result = TableBuilder::<Pair>::new(TableConfig::default())
        .body_fields([("z", FieldConfig::text())])
        .build();
    assert!(matches!(result, Err(ConfigError::UnknownField { .. })));
}

#[test]
fn test_unknown_datalist_field_is_a_config_error() {
    let result = TableBuilder::<Pair>::new(TableConfig::default())
        .column("a", Column::new("A"))
        .datalists(["z"])
        .build();
    assert!(matches!(result, Err(ConfigError::UnknownField { field, .. }) if field == "z"));
}

#[derive(Debug, thiserror::Error)]
#[error("source offline")]
struct Offline;

struct FakeSource {
    records: Mutex<Option<Vec<Hero>>>,
    persisted: Mutex<Vec<Vec<Hero>>>,
    fetches: AtomicUsize,
}

impl FakeSource {
    fn new(records: Option<Vec<Hero>>) -> Self {
        Self {
            records: Mutex::new(records),
            persisted: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordSource<Hero> for FakeSource {
    type Error = Offline;

    async fn fetch(&self) -> Result<Vec<Hero>, Offline> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().clone().ok_or(Offline)
    }

    async fn persist(&self, records: Vec<Hero>) -> Result<(), Offline> {
        self.persisted.lock().unwrap().push(records);
        Ok(())
    }
}

fn empty_hero_table() -> tabula::TableState<Hero> {
    TableBuilder::new(TableConfig::new("heroes"))
        .column("name", Column::new("Name").input(FieldConfig::text()))
        .column("level", Column::new("Level").input(FieldConfig::number()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_body_is_empty_until_load_resolves() {
    let table = empty_hero_table();
    assert_eq!(table.load_state(), LoadState::Idle);
    assert!(table.rowgroups().body.is_empty());

    let source = FakeSource::new(Some(heroes()));
    table.load(&source).await.unwrap();

    assert_eq!(table.load_state(), LoadState::Ready);
    assert_eq!(table.body().len(), 3);
    assert!(!table.has_unsaved_changes());
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_load_propagates_source_error() {
    let table = empty_hero_table();
    let source = FakeSource::new(None);

    let err = table.load(&source).await.unwrap_err();

    assert_eq!(err.to_string(), "source offline");
    assert_eq!(table.load_state(), LoadState::Failed("source offline".into()));
    assert!(table.body().is_empty());
}

#[tokio::test]
async fn test_save_persists_edited_records() {
    let table = empty_hero_table();
    let source = FakeSource::new(Some(heroes()));
    table.load(&source).await.unwrap();

    let groups = table.rowgroups();
    text_cell(&groups.body[0], "name").value.write("Elara the Bold".into()).unwrap();
    assert!(table.has_unsaved_changes());

    table.save(&source).await.unwrap();

    let persisted = source.persisted.lock().unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0][0].name, "Elara the Bold");
    assert!(!table.has_unsaved_changes());
}
