mod cli;
mod error;
mod logging;
mod pages;
mod paths;
mod render;
mod settings;
mod source;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use crate::cli::{Cli, Cmd};
use crate::error::CliError;
use crate::pages::{PageContext, edit_cell, set_filter};

async fn run(cli: Cli) -> Result<String, CliError> {
    let data_dir = cli
        .data_dir
        .or_else(paths::data_dir)
        .ok_or(CliError::NoDataDir)?;
    fs::create_dir_all(&data_dir).map_err(|source| CliError::DataDir {
        path: data_dir.clone(),
        source,
    })?;

    let ctx = PageContext {
        backend: settings::open_backend(&data_dir, !cli.no_persist),
        data_dir,
    };
    let page = cli.cmd.table().open(&ctx).await?;
    let store = page.customization();

    let out = match cli.cmd {
        Cmd::Show { filters, .. } => {
            let groups = page.rowgroups();
            for (key, value) in &filters {
                set_filter(&groups, key, value)?;
            }
            format!(
                "{}\n{}",
                page.title(),
                render::render(&groups, &store.column_orders(), &store.column_widths())
            )
        }
        Cmd::Edit { cell, value, .. } => {
            edit_cell(&page.rowgroups(), &cell, &value)?;
            page.submit().await?;
            if page.has_unsaved_changes() {
                warn!("{}: edits were not saved", page.title());
            }
            info!("{}: set {cell} to '{value}'", page.title());
            format!("{cell} = {value}\n")
        }
        Cmd::Names { .. } => render::render_names(&page.rowgroups(), &store.column_orders()),
        Cmd::Order { keys, .. } => {
            store.set_column_orders(keys)?;
            format!("{}\n", store.summary())
        }
        Cmd::Move { key, index, .. } => {
            store.move_column(&key, index)?;
            format!("{}\n", store.summary())
        }
        Cmd::Width { key, width, .. } => {
            match width {
                Some(width) => store.set_column_width(&key, width)?,
                None => store.clear_column_width(&key)?,
            }
            format!("{}\n", store.summary())
        }
        Cmd::Reset { .. } => {
            store.reset();
            format!("{}\n", store.summary())
        }
    };
    Ok(out)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    match run(cli).await {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
