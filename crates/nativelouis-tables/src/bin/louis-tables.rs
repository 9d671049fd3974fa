// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// louis-tables: add, remove, list and clear the liblouis tables bundled into
// the app builds. Rebuild the platform packages afterwards.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use nativelouis_core::error::Result;
use nativelouis_tables::{HttpFetcher, RemoveOutcome, TableStore};

#[derive(Parser)]
#[command(name = "louis-tables")]
#[command(about = "Manage the liblouis tables bundled into NativeLouis builds", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the bundled tables
    #[arg(long, global = true, default_value = "bundled_tables")]
    dir: PathBuf,

    /// URL of the directory tables are downloaded from
    #[arg(long, global = true, default_value = HttpFetcher::DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Download tables and everything they include
    Add {
        #[arg(value_name = "TABLE", required = true)]
        tables: Vec<String>,
    },
    /// Delete tables from the bundle
    Remove {
        #[arg(value_name = "TABLE", required = true)]
        tables: Vec<String>,
    },
    /// List bundled tables
    List,
    /// Delete every bundled table
    Clear,
}

const REBUILD_HINT: &str = "Rebuild the liblouis packages to pick up the change.";

async fn run(cli: Cli) -> Result<()> {
    let store = TableStore::open(&cli.dir)?;
    match cli.command {
        Commands::Add { tables } => {
            let fetcher = HttpFetcher::with_base_url(cli.base_url);
            let report = store.add(&tables, &fetcher).await?;
            for name in &report.downloaded {
                println!("✓ downloaded {name}");
            }
            for name in &report.present {
                println!("· already bundled {name}");
            }
            println!("\n{REBUILD_HINT}");
        }
        Commands::Remove { tables } => {
            for (name, outcome) in store.remove(&tables)? {
                match outcome {
                    RemoveOutcome::Removed => println!("✗ removed {name}"),
                    RemoveOutcome::NotFound => eprintln!("(not found) {name}"),
                }
            }
            println!("\n{REBUILD_HINT}");
        }
        Commands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("(no bundled tables)");
            }
            for name in names {
                println!("{name}");
            }
        }
        Commands::Clear => {
            let removed = store.clear()?;
            println!("Cleared {} bundled tables.\n{REBUILD_HINT}", removed.len());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("hint: {}", e.hint());
            ExitCode::FAILURE
        }
    }
}
