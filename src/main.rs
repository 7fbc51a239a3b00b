//! freebase - A record grid and navigator over JSON datasources.
//!
//! Usage:
//!   freebase FILE                 Browse and edit records in the TUI
//!   freebase dump FILE            Print the records
//!   freebase columns FILE         List the column set
//!   freebase --help               Show help

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::EnvFilter;

use freebase_core::{Column, Datasource, GridConfig, MemoryDatasource};
use freebase_tui::{ThemeVariant, TuiConfig, UserSettings};

#[derive(Parser)]
#[command(
    name = "freebase",
    version,
    about = "A record grid and navigator over JSON datasources",
    long_about = "freebase shows a JSON array of records as a grid with a record \
                  editor and a navigation bar, all bound to one datasource.\n\n\
                  Launch the interactive TUI by running `freebase FILE`, or use \
                  subcommands for quick operations."
)]
struct Cli {
    /// JSON file holding an array of records
    file: Option<PathBuf>,

    /// Color theme (dark or light)
    #[arg(short, long)]
    theme: Option<ThemeVariant>,

    /// Rows moved by page up/down (default: the visible row count)
    #[arg(short, long)]
    page_size: Option<usize>,

    /// Width of every grid column
    #[arg(short = 'w', long)]
    column_width: Option<u16>,

    /// Leave a modified record without asking
    #[arg(long)]
    no_confirm: bool,

    /// Write logs to this file (level from FREEBASE_LOG, default warn)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the records of a file
    Dump {
        /// JSON file to read
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Widest a text column may be
        #[arg(long, default_value = "24")]
        max_width: usize,
    },

    /// List the columns of a file
    Columns {
        /// JSON file to read
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    match cli.command {
        Some(Command::Dump {
            file,
            format,
            max_width,
        }) => {
            run_dump(&file, format, max_width)?;
        }
        Some(Command::Columns { file }) => {
            run_columns(&file)?;
        }
        None => {
            let path = cli
                .file
                .ok_or_else(|| eyre!("No file given (see --help)"))?;
            let records = load(&path)?;

            let grid = GridConfig::builder()
                .page_size(cli.page_size)
                .build()
                .context("Invalid grid options")?;

            let mut settings = UserSettings::load();
            if let Some(theme) = cli.theme {
                settings.theme = theme;
            }
            if let Some(width) = cli.column_width {
                settings.column_width = Some(width);
            }
            if cli.no_confirm {
                settings.confirm_discard = false;
            }

            let title = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into());
            let config = TuiConfig::default()
                .with_title(title)
                .with_path(path)
                .with_grid(grid)
                .with_settings(settings);
            freebase_tui::run(records, config)?;
        }
    }

    Ok(())
}

/// Send tracing output to a file so it cannot corrupt the terminal.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_env("FREEBASE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load(path: &Path) -> Result<MemoryDatasource> {
    MemoryDatasource::load_json(path)
        .with_context(|| format!("Failed to load records from {}", path.display()))
}

/// Print every record of a file.
fn run_dump(path: &Path, format: OutputFormat, max_width: usize) -> Result<()> {
    let records = load(path)?;

    match format {
        OutputFormat::Text => {
            let columns = records.columns();
            let mut rows = Vec::with_capacity(records.count());
            for index in 0..records.count() {
                let record = records.get(index)?;
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let text = record.get(&c.name).map(ToString::to_string);
                        truncate(&text.unwrap_or_default(), max_width)
                    })
                    .collect();
                rows.push(cells);
            }

            let widths: Vec<usize> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    rows.iter()
                        .map(|r| r[i].chars().count())
                        .chain([truncate(&c.caption, max_width).chars().count()])
                        .max()
                        .unwrap_or(0)
                })
                .collect();
            let rule_width = widths.iter().map(|w| w + 2).sum::<usize>().max(10);

            let header: Vec<String> = columns
                .iter()
                .map(|c| truncate(&c.caption, max_width))
                .collect();
            println!("{}", format_row(&header, &widths));
            println!("{}", "─".repeat(rule_width));
            for row in &rows {
                println!("{}", format_row(row, &widths));
            }
            println!("{}", "─".repeat(rule_width));
            println!(" {} records, {} columns", rows.len(), columns.len());
        }
        OutputFormat::Json => {
            println!("{}", records.to_json()?);
        }
    }

    Ok(())
}

/// List the columns of a file with how many records fill each one.
fn run_columns(path: &Path) -> Result<()> {
    let records = load(path)?;
    let columns = records.columns();
    let count = records.count();

    let filled = |column: &Column| -> Result<usize> {
        let mut filled = 0;
        for index in 0..count {
            let record = records.get(index)?;
            if record.get(&column.name).is_some_and(|v| !v.is_null()) {
                filled += 1;
            }
        }
        Ok(filled)
    };

    let name_width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for column in &columns {
        println!(
            " {:<name_width$}  {:>6} of {}",
            column.name,
            filled(column)?,
            count
        );
    }
    if columns.is_empty() {
        println!(" No columns.");
    }

    Ok(())
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!(" {cell:<width$} "))
        .collect()
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace(['\n', '\t'], " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
