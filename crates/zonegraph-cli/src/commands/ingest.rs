//! Ingest command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use zonegraph_core::{AdjacencyTable, LoadPolicy};
use zonegraph_graph::Ingestor;

use super::Backend;
use crate::output;

pub const DEFAULT_CSV: &str = "urban_planning_data.csv";

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Urban planning CSV to load
    #[arg(long, default_value = DEFAULT_CSV)]
    pub csv: PathBuf,

    /// TOML file with a [neighbors] table (defaults to the Phoenix metro table)
    #[arg(long)]
    pub adjacency: Option<PathBuf>,

    /// Skip rows that fail to parse instead of aborting
    #[arg(long)]
    pub skip_bad_rows: bool,
}

impl Default for IngestArgs {
    fn default() -> Self {
        Self {
            csv: PathBuf::from(DEFAULT_CSV),
            adjacency: None,
            skip_bad_rows: false,
        }
    }
}

impl IngestArgs {
    fn adjacency_table(&self) -> Result<AdjacencyTable> {
        match &self.adjacency {
            Some(path) => AdjacencyTable::from_toml_file(path)
                .with_context(|| format!("Failed to load adjacency table {}", path.display())),
            None => Ok(AdjacencyTable::phoenix_metro()),
        }
    }

    fn policy(&self) -> LoadPolicy {
        if self.skip_bad_rows {
            LoadPolicy::SkipInvalid
        } else {
            LoadPolicy::Abort
        }
    }
}

/// Load the CSV and write zones, buildings, utilities and neighbors.
pub async fn execute(backend: &Backend, args: &IngestArgs) -> Result<()> {
    println!("{} {}", "Ingesting".bold(), args.csv.display().to_string().cyan());

    let adjacency = args.adjacency_table()?;
    backend.prepare_schema().await?;

    let report = Ingestor::new(backend.store(), adjacency)
        .with_policy(args.policy())
        .ingest_path(&args.csv)
        .await
        .context("Failed to initialize database")?;

    output::print_ingest_report(&report);
    Ok(())
}
