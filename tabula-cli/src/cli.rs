use std::path::PathBuf;

use clap::{Parser, Subcommand};
use simplelog::LevelFilter;

use crate::pages::PageKind;

#[derive(Parser)]
#[command(name = "tabula", version, about = "Editable tables with persisted column layouts")]
pub struct Cli {
    /// Directory holding record files and saved customizations
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Do not read or save column customizations
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Log level written to the log file
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Print a table
    Show {
        #[arg(value_enum)]
        table: PageKind,
        /// Column filter as key=text; repeatable
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Edit one cell and save the table
    Edit {
        #[arg(value_enum)]
        table: PageKind,
        /// Cell name as listed by `names`
        cell: String,
        value: String,
    },
    /// Set the full column order
    Order {
        #[arg(value_enum)]
        table: PageKind,
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Move one column to a new position
    Move {
        #[arg(value_enum)]
        table: PageKind,
        key: String,
        index: usize,
    },
    /// Set a column width, or clear it when no width is given
    Width {
        #[arg(value_enum)]
        table: PageKind,
        key: String,
        width: Option<String>,
    },
    /// Restore default column order and widths
    Reset {
        #[arg(value_enum)]
        table: PageKind,
    },
    /// List body cell names and values
    Names {
        #[arg(value_enum)]
        table: PageKind,
    },
}

impl Cmd {
    pub fn table(&self) -> PageKind {
        match self {
            Cmd::Show { table, .. }
            | Cmd::Edit { table, .. }
            | Cmd::Order { table, .. }
            | Cmd::Move { table, .. }
            | Cmd::Width { table, .. }
            | Cmd::Reset { table }
            | Cmd::Names { table } => *table,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=text, got '{raw}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}
