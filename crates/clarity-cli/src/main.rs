//! Clarity: lab report biomarker interpretation.
//! Entry point for the command-line binary.

mod config;
mod history;
mod knowledge;
mod render;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clarity_extract::{ExtractError, InterpretationPipeline};

use crate::history::HistoryStore;

#[derive(Parser)]
#[command(name = "clarity", version, about = "Interpret biomarker values in OCR'd lab report text")]
struct Cli {
    /// Config file (defaults to $CLARITY_CONFIG, then ./clarity.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Knowledge base document, overriding the configured path
    #[arg(long, global = true)]
    knowledge_base: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpret OCR text from a file, or stdin when FILE is "-" or omitted
    Interpret {
        file: Option<PathBuf>,
        /// Print findings as JSON
        #[arg(long)]
        json: bool,
        /// Do not record this run in the history
        #[arg(long)]
        no_history: bool,
    },
    /// List past reports, newest first
    History {
        /// Delete all stored history
        #[arg(long, conflicts_with = "show")]
        clear: bool,
        /// Show the full findings of report N from the listing (1 = newest)
        #[arg(long, value_name = "N")]
        show: Option<usize>,
    },
    /// Show one biomarker's values over time, oldest first
    Trend {
        biomarker: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = HistoryStore::new(&config.history.path, config.history.max_entries);

    match cli.command {
        Command::Interpret { file, json, no_history } => {
            let kb = knowledge::load_knowledge_base(&config.knowledge_base, cli.knowledge_base.as_deref())?;
            let pipeline = InterpretationPipeline::new(kb)?;
            let text = read_input(file.as_deref())?;

            let findings = match pipeline.interpret(&text) {
                Ok(f) => f,
                Err(ExtractError::EmptyInput) => {
                    anyhow::bail!("Could not read any text from the document. Please use a clearer, higher-resolution image.")
                }
                Err(e) => return Err(e.into()),
            };

            if findings.is_empty() {
                eprintln!("No known biomarkers were found in the document. The OCR might have had trouble reading the file.");
                return Ok(ExitCode::from(2));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&findings)?);
            } else {
                print!("{}", render::findings_table(&findings));
            }

            if !no_history {
                let history = store.record(&findings, Utc::now())?;
                info!("Saved to history ({} entries in {})", history.len(), store.path().display());
            }
        }
        Command::History { clear, show } => {
            if clear {
                store.clear()?;
                println!("History cleared.");
            } else if let Some(position) = show {
                let entry = store
                    .entry(position)
                    .with_context(|| format!("no report #{position} in history"))?;
                print!("{}", render::history_entry(&entry));
            } else {
                print!("{}", render::history_list(&store.load()));
            }
        }
        Command::Trend { biomarker, json } => {
            let points = store.trend(&biomarker);
            if json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                print!("{}", render::trend_table(&biomarker, &points));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}
