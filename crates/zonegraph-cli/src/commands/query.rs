//! Query command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use zonegraph_core::render_response;
use zonegraph_graph::buildings_with_utilities;

use super::Backend;
use crate::output;

pub const DEFAULT_ZONE: &str = "Scottsdale";

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Zone whose buildings and utilities are listed
    #[arg(long, default_value = DEFAULT_ZONE)]
    pub zone: String,

    /// Question echoed in the response (defaults to one about --zone)
    #[arg(long)]
    pub question: Option<String>,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE.to_string(),
            question: None,
        }
    }
}

impl QueryArgs {
    pub fn question(&self) -> String {
        self.question.clone().unwrap_or_else(|| {
            format!("What are the utilities serving buildings in {}?", self.zone)
        })
    }
}

/// Run the traversal for the zone and print the rendered response.
pub async fn execute(backend: &Backend, args: &QueryArgs) -> Result<()> {
    let records = buildings_with_utilities(backend.store(), &args.zone).await?;

    output::print_building_utilities(&args.zone, &records);

    let response = render_response(&args.question(), &records)
        .context("Failed to serialize graph data")?;
    println!("\n{}", "Response:".green().bold());
    println!("{}", response);
    Ok(())
}
