//! Terminal output formatting.

use colored::Colorize;

use zonegraph_core::Record;
use zonegraph_graph::{BuildingUtility, GraphCounts, IngestReport};

/// Print the outcome of an ingestion run.
pub fn print_ingest_report(report: &IngestReport) {
    println!("\n{}", "Ingestion complete:".green().bold());
    println!("  Zones:                 {}", report.zones);
    println!("  Buildings:             {}", report.buildings);
    println!("  Utility links:         {}", report.utility_links);
    println!("  Neighbor links:        {}", report.neighbor_links);
    println!("  Relationships ensured: {}", report.relationships());

    if !report.skipped_rows.is_empty() {
        println!(
            "\n{} {}",
            report.skipped_rows.len().to_string().yellow().bold(),
            "rows skipped:".yellow()
        );
        for failure in &report.skipped_rows {
            println!(
                "  {} row {} {}: {}",
                "✗".red(),
                failure.row,
                failure.zone.as_deref().unwrap_or("?").cyan(),
                failure.error
            );
        }
    }
}

/// Print traversal rows as a building/utility table.
pub fn print_building_utilities(zone: &str, records: &[Record]) {
    println!("\n{} {}", "Buildings and utilities in".bold(), zone.cyan());
    println!("{}", "─".repeat(50));

    if records.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    println!("{:<32} {}", "Building".bold(), "Utility".bold());
    for pair in records.iter().filter_map(BuildingUtility::from_record) {
        println!("{:<32} {}", pair.building, pair.utility.yellow());
    }
}

/// Print node and relationship counts by label and type.
pub fn print_counts(counts: &GraphCounts) {
    println!("{}", "Graph status".bold());
    println!("{}", "─".repeat(30));

    println!("{}: {}", "Nodes".bold(), counts.nodes);
    for (label, count) in &counts.nodes_by_label {
        let label = if label.is_empty() { "(unlabeled)" } else { label.as_str() };
        println!("  {:<20} {}", label.cyan(), count);
    }

    println!("{}: {}", "Relationships".bold(), counts.relationships);
    for (rel_type, count) in &counts.relationships_by_type {
        println!("  {:<20} {}", rel_type.magenta(), count);
    }
}
