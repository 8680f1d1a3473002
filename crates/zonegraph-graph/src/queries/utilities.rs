//! Buildings in a zone and the utilities serving them.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use zonegraph_core::Record;

use crate::store::{GraphStore, Traversal};

/// One (building, utility) pair from the traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingUtility {
    pub building: String,
    pub utility: String,
}

impl BuildingUtility {
    /// Typed view of a traversal row. Rows with a missing column yield `None`.
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            building: record.get("building")?.as_str()?.to_string(),
            utility: record.get("utility")?.as_str()?.to_string(),
        })
    }
}

/// Run the building/utility traversal for a zone.
///
/// A zone with no data yields an empty list, not an error.
pub async fn buildings_with_utilities(store: &dyn GraphStore, zone: &str) -> Result<Vec<Record>> {
    let traversal = Traversal::building_utilities(zone);
    debug!(cypher = traversal.cypher(), zone, "Running traversal");

    let records = store
        .read(&traversal)
        .await
        .with_context(|| format!("Error querying graph for zone {}", zone))?;

    if records.is_empty() {
        info!(zone, "No results found for the query");
    } else {
        info!(zone, rows = records.len(), "Traversal returned rows");
    }
    Ok(records)
}
