// Rowdeck - terminal tabular data editor with progressive reveal

mod tui;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use rowdeck_config::Settings;
use rowdeck_engine::reveal::RevealWindow;
use rowdeck_engine::session::Session;
use rowdeck_io::{csv, sample, xlsx};

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "rowdeck")]
#[command(about = "Edit, filter, and sort delimited data in the terminal")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  rowdeck books.csv
  rowdeck data.tsv --tsv
  rowdeck --generate 10000
  rowdeck books.csv --export books.xlsx
  rowdeck books.csv --plain 20")]
struct Cli {
    /// Delimited text file to open (delimiter sniffed unless forced)
    file: Option<PathBuf>,

    /// Force a single-character field delimiter
    #[arg(long, value_name = "CHAR", conflicts_with = "tsv")]
    delimiter: Option<char>,

    /// Treat the input as tab-separated
    #[arg(long)]
    tsv: bool,

    /// Generate N sample rows instead of reading a file
    #[arg(long, value_name = "N", conflicts_with = "file")]
    generate: Option<usize>,

    /// Export to an .xlsx file and exit (no TUI)
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Print the first N rows as a plain table and exit (0 = all)
    #[arg(long, value_name = "N")]
    plain: Option<usize>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\nengine:  rowdeck-engine ",
        env!("CARGO_PKG_VERSION"),
        "\ntarget:  ",
        env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load();

    let mut session = Session::new(
        RevealWindow::new(settings.initial_window, settings.batch_size),
        Duration::from_millis(settings.advance_delay_ms),
    );

    let file_name = match load_dataset(&cli, &settings, &mut session) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Some(path) = &cli.export {
        if session.store().is_empty() {
            eprintln!("error: nothing to export (open a file or use --generate)");
            return ExitCode::from(EXIT_USAGE);
        }
        let store = session.store();
        if let Err(e) = xlsx::export(store.schema(), store.rows(), path) {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
        println!("Exported {} rows to {}", store.len(), path.display());
        return ExitCode::from(EXIT_SUCCESS);
    }

    if let Some(n) = cli.plain {
        if let Err(e) = tui::print_plain(&session, n) {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    match tui::run(session, file_name, &settings) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load the requested dataset into the session; returns the display name.
/// With no file and no --generate the session starts empty.
fn load_dataset(cli: &Cli, settings: &Settings, session: &mut Session) -> Result<String, String> {
    if let Some(n) = cli.generate {
        let count = if n == 0 { settings.sample_rows } else { n };
        session.load(sample::schema(), sample::generate(count));
        return Ok(format!("sample ({} rows)", count));
    }

    let Some(path) = &cli.file else {
        return Ok("(no file)".to_string());
    };

    let dataset = if cli.tsv {
        csv::import_with_delimiter(path, b'\t')?
    } else if let Some(delim) = cli.delimiter {
        if !delim.is_ascii() {
            return Err(format!("delimiter must be a single ASCII character, got {:?}", delim));
        }
        csv::import_with_delimiter(path, delim as u8)?
    } else {
        csv::import(path)?
    };

    session.load(dataset.schema, dataset.rows);
    log::debug!("loaded {} rows from {}", session.store().len(), path.display());

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string();
    Ok(name)
}
