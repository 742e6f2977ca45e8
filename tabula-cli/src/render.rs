//! Plain-text rendering of a table's row groups.
//!
//! Columns follow the current column order. A `px` width is scaled to
//! characters; anything else (`auto`, `min-content`, a missing entry) sizes
//! the column to its content.

use std::fmt::Write;

use tabula::{CellWidget, ColumnWidths, Row, RowGroups, Widget};

/// Pixels per rendered character.
const PX_PER_CHAR: f64 = 8.0;
const MIN_WIDTH: usize = 3;
const FILTER_FORM: &str = "filter-form";

/// Character width of a column given its width setting and widest content.
pub fn column_width(width: Option<&str>, content: usize) -> usize {
    let px = width
        .and_then(|w| w.trim().strip_suffix("px"))
        .and_then(|n| n.trim().parse::<f64>().ok());
    match px {
        Some(px) if px > 0.0 => ((px / PX_PER_CHAR).round() as usize).max(MIN_WIDTH),
        _ => content.max(MIN_WIDTH),
    }
}

/// Active filters: non-empty search inputs bound to the filter form, by column.
pub fn active_filters(groups: &RowGroups) -> Vec<(String, String)> {
    groups
        .header
        .iter()
        .filter_map(|row| match row {
            Row::Cells(cells) => Some(cells),
            Row::Widgets(_) => None,
        })
        .flatten()
        .filter_map(|(key, cell)| match cell {
            CellWidget::Widget(Widget::Search(input))
                if input.form.as_deref() == Some(FILTER_FORM) =>
            {
                let needle = input.value.read();
                (!needle.is_empty()).then(|| (key.clone(), needle))
            }
            _ => None,
        })
        .collect()
}

fn passes(row: &Row, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(key, needle)| {
        row.cell(key)
            .is_some_and(|cell| cell.display().to_lowercase().contains(&needle.to_lowercase()))
    })
}

fn widget_text(widget: &Widget) -> String {
    match widget {
        Widget::Submit(submit) => format!("[{}]", submit.label),
        Widget::Button(button) => format!("({})", button.label),
        Widget::Link(link) => format!("<{} -> {}>", link.label, link.href),
        Widget::Label(label) => label.text(),
        input => format!("{}={}", input.name().unwrap_or_default(), input.display()),
    }
}

fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        format!("{text}{}", " ".repeat(width - len))
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

/// Render row groups as a text grid.
///
/// Free-form rows print as a single toolbar line; rows without any cells are
/// skipped. Body rows that fail an active filter are left out.
pub fn render(groups: &RowGroups, orders: &[String], widths: &ColumnWidths) -> String {
    let filters = active_filters(groups);
    let body: Vec<&Row> = groups.body.iter().filter(|row| passes(row, &filters)).collect();

    let cell_rows = groups
        .header
        .iter()
        .chain(body.iter().copied())
        .chain(groups.footer.iter());
    let mut content = vec![0usize; orders.len()];
    for row in cell_rows {
        for (i, key) in orders.iter().enumerate() {
            if let Some(cell) = row.cell(key) {
                content[i] = content[i].max(cell.display().chars().count());
            }
        }
    }
    let sizes: Vec<usize> = orders
        .iter()
        .zip(&content)
        .map(|(key, &len)| column_width(widths.get(key).map(String::as_str), len))
        .collect();

    let mut out = String::new();
    let line = |row: &Row, out: &mut String| match row {
        Row::Widgets(widgets) => {
            let parts: Vec<String> = widgets.iter().map(widget_text).collect();
            let _ = writeln!(out, "{}", parts.join("  "));
        }
        Row::Cells(cells) if cells.is_empty() => {}
        Row::Cells(_) => {
            let parts: Vec<String> = orders
                .iter()
                .zip(&sizes)
                .map(|(key, &size)| fit(&row.cell(key).map(CellWidget::display).unwrap_or_default(), size))
                .collect();
            let _ = writeln!(out, "{}", parts.join(" | ").trim_end());
        }
    };
    let rule: String = sizes
        .iter()
        .map(|&size| "-".repeat(size))
        .collect::<Vec<_>>()
        .join("-+-");

    for row in &groups.header {
        line(row, &mut out);
    }
    let _ = writeln!(out, "{rule}");
    for row in body {
        line(row, &mut out);
    }
    if !groups.footer.is_empty() {
        let _ = writeln!(out, "{rule}");
        for row in &groups.footer {
            line(row, &mut out);
        }
    }
    out
}

/// Every named input of the body, in row order, as `name value` lines.
pub fn render_names(groups: &RowGroups, orders: &[String]) -> String {
    let mut out = String::new();
    for row in &groups.body {
        for key in orders {
            if let Some(cell) = row.cell(key)
                && let Some(name) = cell.name()
            {
                let _ = writeln!(out, "{name}\t{}", cell.display());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use tabula::{Input, Value};

    use super::*;

    fn widths(pairs: &[(&str, &str)]) -> ColumnWidths {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn text(name: &str, value: &str) -> CellWidget {
        Widget::Text(Input::new(name, Value::detached(value.to_string()))).into()
    }

    #[test]
    fn test_column_width_units() {
        assert_eq!(column_width(Some("80px"), 2), 10);
        assert_eq!(column_width(Some("4px"), 20), MIN_WIDTH);
        assert_eq!(column_width(Some("auto"), 7), 7);
        assert_eq!(column_width(Some("min-content"), 1), MIN_WIDTH);
        assert_eq!(column_width(None, 5), 5);
    }

    #[test]
    fn test_columns_follow_order() {
        let groups = RowGroups {
            header: vec![Row::cells([
                ("a", CellWidget::header("Alpha")),
                ("b", CellWidget::header("Beta")),
            ])],
            body: vec![Row::cells([("a", text("x-0-a", "1")), ("b", text("x-0-b", "2"))])],
            footer: vec![],
        };
        let orders = vec!["b".to_string(), "a".to_string()];
        let out = render(&groups, &orders, &widths(&[]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Beta | Alpha");
        assert_eq!(lines[1], "-----+------");
        assert_eq!(lines[2], "2    | 1");
    }

    #[test]
    fn test_long_values_are_cut_to_px_width() {
        let groups = RowGroups {
            body: vec![Row::cells([("a", text("0-a", "abcdefghij"))])],
            ..Default::default()
        };
        let out = render(&groups, &["a".to_string()], &widths(&[("a", "40px")]));
        assert_eq!(out.lines().nth(1), Some("abcd~"));
    }

    #[test]
    fn test_search_filters_hide_rows() {
        let needle = Value::detached(String::new());
        let search = Input::new("a", needle.clone()).form(FILTER_FORM);
        let groups = RowGroups {
            header: vec![Row::cells([("a", Widget::Search(search).into())])],
            body: vec![
                Row::cells([("a", text("0-a", "Elf"))]),
                Row::cells([("a", text("1-a", "Dwarf"))]),
            ],
            footer: vec![],
        };
        let orders = ["a".to_string()];
        assert_eq!(render(&groups, &orders, &widths(&[])).lines().count(), 4);

        needle.write("dw".into()).unwrap();
        let out = render(&groups, &orders, &widths(&[]));
        assert!(out.contains("Dwarf"));
        assert!(!out.contains("Elf"));
    }

    #[test]
    fn test_toolbar_rows() {
        let groups = RowGroups {
            header: vec![Row::widgets([
                Widget::submit("Filter", "filter-form"),
                Widget::link("CSV", "/characters"),
                Widget::label("hi"),
            ])],
            ..Default::default()
        };
        let out = render(&groups, &[], &widths(&[]));
        assert_eq!(out.lines().next(), Some("[Filter]  <CSV -> /characters>  hi"));
    }

    #[test]
    fn test_names_listing() {
        let groups = RowGroups {
            body: vec![Row::cells([("a", text("x-0-a", "1"))])],
            ..Default::default()
        };
        assert_eq!(render_names(&groups, &["a".to_string()]), "x-0-a\t1\n");
    }
}
