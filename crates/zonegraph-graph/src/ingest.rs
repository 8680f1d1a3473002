//! Zone ingestion into the graph.
//!
//! Loads every zone first, then writes in input order:
//! - (:Zone) with all attributes
//! - (:Building)-[:WITHIN_ZONE]->(:Zone)
//! - (:Zone)-[:SERVED_BY]->(:Utility)
//! - (:Zone)-[:NEIGHBORS]->(:Zone), both directions, from the adjacency table
//!
//! Each write commits on its own. The first failure stops the run; everything
//! committed before it stays, and re-running heals the graph because every
//! write is a merge.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use zonegraph_core::{
    load_zones, AdjacencyTable, BuildingSource, Lettered, LoadPolicy, RowFailure, Zone,
};

use crate::store::{EdgeLabel, GraphStore, NodeRef};

/// Result of an ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub zones: usize,
    pub buildings: usize,
    pub utility_links: usize,
    pub neighbor_links: usize,
    /// Rows left out under [`LoadPolicy::SkipInvalid`].
    pub skipped_rows: Vec<RowFailure>,
}

impl IngestReport {
    fn merge(&mut self, other: IngestReport) {
        self.zones += other.zones;
        self.buildings += other.buildings;
        self.utility_links += other.utility_links;
        self.neighbor_links += other.neighbor_links;
        self.skipped_rows.extend(other.skipped_rows);
    }

    /// Edges ensured during the run.
    pub fn relationships(&self) -> usize {
        self.buildings + self.utility_links + self.neighbor_links
    }
}

/// Drives parsed zones into a [`GraphStore`].
pub struct Ingestor<'a> {
    store: &'a dyn GraphStore,
    adjacency: AdjacencyTable,
    buildings: Box<dyn BuildingSource>,
    policy: LoadPolicy,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn GraphStore, adjacency: AdjacencyTable) -> Self {
        Self {
            store,
            adjacency,
            buildings: Box::new(Lettered::default()),
            policy: LoadPolicy::Abort,
        }
    }

    pub fn with_buildings(mut self, buildings: Box<dyn BuildingSource>) -> Self {
        self.buildings = buildings;
        self
    }

    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load the CSV at `path` and ingest it. Nothing is written if loading fails.
    ///
    /// Buildings come from the configured [`BuildingSource`] during loading.
    pub async fn ingest_path(&self, path: &Path) -> Result<IngestReport> {
        let loaded = load_zones(path, self.policy, self.buildings.as_ref())
            .context("Failed to read zones from CSV")?;

        let mut report = self.ingest(&loaded.zones).await?;
        report.skipped_rows = loaded.failures;

        if !report.skipped_rows.is_empty() {
            warn!(skipped = report.skipped_rows.len(), "Some rows were skipped");
        }
        Ok(report)
    }

    /// Ingest already-loaded zones as they are, then the adjacency table.
    pub async fn ingest(&self, zones: &[Zone]) -> Result<IngestReport> {
        info!(zones = zones.len(), "Starting graph ingestion");

        let mut total = IngestReport::default();

        for zone in zones {
            let result = self
                .persist_zone(zone)
                .await
                .with_context(|| format!("Failed to create zone {}", zone.name))?;
            total.merge(result);
        }

        let neighbors = self
            .persist_adjacency()
            .await
            .context("Failed to create neighbor relationships")?;
        total.merge(neighbors);

        info!(
            zones = total.zones,
            buildings = total.buildings,
            utility_links = total.utility_links,
            neighbor_links = total.neighbor_links,
            "Graph ingestion complete"
        );
        Ok(total)
    }

    /// Write one zone node with its buildings and utilities.
    pub async fn persist_zone(&self, zone: &Zone) -> Result<IngestReport> {
        let mut result = IngestReport::default();
        let zone_ref = NodeRef::zone(&zone.name);

        self.store
            .ensure_node(&zone_ref, &zone.attributes.to_properties())
            .await
            .with_context(|| format!("Error creating zone {}", zone.name))?;
        result.zones += 1;

        for building in &zone.buildings {
            self.store
                .ensure_edge(&NodeRef::building(building), EdgeLabel::WithinZone, &zone_ref)
                .await
                .with_context(|| {
                    format!("Error creating building {} for zone {}", building, zone.name)
                })?;
            result.buildings += 1;
        }

        for utility in &zone.utilities {
            self.store
                .ensure_edge(&zone_ref, EdgeLabel::ServedBy, &NodeRef::utility(utility))
                .await
                .with_context(|| {
                    format!("Error creating utility {} for zone {}", utility, zone.name)
                })?;
            result.utility_links += 1;
        }

        debug!(
            zone = %zone.name,
            buildings = result.buildings,
            utilities = result.utility_links,
            "Persisted zone"
        );
        Ok(result)
    }

    /// Write both `NEIGHBORS` directions for every pair in the table.
    pub async fn persist_adjacency(&self) -> Result<IngestReport> {
        let mut result = IngestReport::default();

        for (a, b) in self.adjacency.undirected_pairs() {
            let (za, zb) = (NodeRef::zone(a), NodeRef::zone(b));
            for (from, to) in [(&za, &zb), (&zb, &za)] {
                self.store
                    .ensure_edge(from, EdgeLabel::Neighbors, to)
                    .await
                    .with_context(|| {
                        format!("Failed to create relationship between {} and {}", a, b)
                    })?;
            }
            result.neighbor_links += if a == b { 1 } else { 2 };
            debug!(zone = a, neighbor = b, "Linked neighbors");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use crate::store::NodeLabel;
    use zonegraph_core::zone::derive_buildings;
    use zonegraph_core::{PropertyValue, ZoneAttributes};

    fn zone(name: &str, utilities: &[&str]) -> Zone {
        let mut zone = Zone::new(
            name,
            ZoneAttributes {
                family_size: 3,
                landscape: "Desert".to_string(),
                ..Default::default()
            },
        );
        zone.utilities = utilities.iter().map(|u| u.to_string()).collect();
        derive_buildings(&mut zone, &Lettered::default());
        zone
    }

    fn small_table() -> AdjacencyTable {
        AdjacencyTable::new()
            .with_zone("Tempe", ["Mesa", "Gilbert"])
            .with_zone("Mesa", ["Tempe"])
    }

    #[tokio::test]
    async fn test_ingest_builds_graph() {
        let graph = MemoryGraph::new();
        let zones = vec![zone("Tempe", &["Water", "Electric"]), zone("Mesa", &["Electric"])];

        let report = Ingestor::new(&graph, small_table()).ingest(&zones).await.unwrap();
        assert_eq!(report.zones, 2);
        assert_eq!(report.buildings, 6);
        assert_eq!(report.utility_links, 3);
        assert_eq!(report.neighbor_links, 4);

        let counts = graph.counts().await.unwrap();
        assert_eq!(counts.label(NodeLabel::Zone), 3);
        assert_eq!(counts.label(NodeLabel::Building), 6);
        assert_eq!(counts.label(NodeLabel::Utility), 2);
        assert_eq!(counts.rel_type(EdgeLabel::WithinZone), 6);
        assert_eq!(counts.rel_type(EdgeLabel::ServedBy), 3);
        assert_eq!(counts.rel_type(EdgeLabel::Neighbors), 4);

        // Gilbert only appears in the table: created by key, no attributes
        let gilbert = graph.node(&NodeRef::zone("Gilbert")).await.unwrap();
        assert!(gilbert.is_empty());
        let tempe = graph.node(&NodeRef::zone("Tempe")).await.unwrap();
        assert_eq!(tempe["Landscape"], PropertyValue::from("Desert"));
    }

    #[tokio::test]
    async fn test_ingest_twice_is_idempotent() {
        let graph = MemoryGraph::new();
        let zones = vec![zone("Tempe", &["Water", "Electric"]), zone("Mesa", &["Electric"])];
        let ingestor = Ingestor::new(&graph, small_table());

        ingestor.ingest(&zones).await.unwrap();
        let once = graph.counts().await.unwrap();
        ingestor.ingest(&zones).await.unwrap();
        let twice = graph.counts().await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_neighbors_in_both_directions() {
        let graph = MemoryGraph::new();
        let table = AdjacencyTable::phoenix_metro();
        Ingestor::new(&graph, table.clone()).ingest(&[]).await.unwrap();

        for (a, b) in table.pairs() {
            let (za, zb) = (NodeRef::zone(a), NodeRef::zone(b));
            assert!(graph.has_edge(&za, EdgeLabel::Neighbors, &zb).await, "{} -> {}", a, b);
            assert!(graph.has_edge(&zb, EdgeLabel::Neighbors, &za).await, "{} -> {}", b, a);
        }
        let counts = graph.counts().await.unwrap();
        assert_eq!(counts.rel_type(EdgeLabel::Neighbors), 20);
        assert_eq!(counts.label(NodeLabel::Zone), 7);
    }

    #[tokio::test]
    async fn test_reingest_keeps_unlisted_attributes() {
        let graph = MemoryGraph::new();
        let tempe = NodeRef::zone("Tempe");
        let mut extra = zonegraph_core::PropertyMap::new();
        extra.insert("Nickname".into(), PropertyValue::from("Home of ASU"));
        graph.ensure_node(&tempe, &extra).await.unwrap();

        Ingestor::new(&graph, AdjacencyTable::new())
            .ingest(&[zone("Tempe", &[])])
            .await
            .unwrap();

        let props = graph.node(&tempe).await.unwrap();
        assert_eq!(props["Nickname"], PropertyValue::from("Home of ASU"));
        assert_eq!(props["FamilySize"], PropertyValue::Int(3));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_with_context() {
        let graph = MemoryGraph::new();
        graph.fail_on("Electric").await;
        let zones = vec![zone("Tempe", &["Water", "Electric"]), zone("Mesa", &["Electric"])];

        let err = Ingestor::new(&graph, small_table())
            .ingest(&zones)
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Tempe"), "{}", message);
        assert!(message.contains("Electric"), "{}", message);

        // Earlier writes stay; later zones were never reached
        assert!(graph.node(&NodeRef::utility("Water")).await.is_some());
        assert!(graph.node(&NodeRef::zone("Mesa")).await.is_none());

        // Re-running after the fault clears converges to the full graph
        graph.clear_failure().await;
        Ingestor::new(&graph, small_table()).ingest(&zones).await.unwrap();
        let counts = graph.counts().await.unwrap();
        assert_eq!(counts.rel_type(EdgeLabel::ServedBy), 3);
    }

    #[tokio::test]
    async fn test_zone_without_utilities() {
        let graph = MemoryGraph::new();
        Ingestor::new(&graph, AdjacencyTable::new())
            .ingest(&[zone("Sun City", &[])])
            .await
            .unwrap();

        let counts = graph.counts().await.unwrap();
        assert_eq!(counts.label(NodeLabel::Utility), 0);
        assert_eq!(counts.rel_type(EdgeLabel::ServedBy), 0);
        assert_eq!(counts.label(NodeLabel::Building), 3);
    }

    #[tokio::test]
    async fn test_zone_without_buildings_is_persisted_as_given() {
        let graph = MemoryGraph::new();
        let mut bare = zone("Sun City", &["Water"]);
        bare.buildings.clear();

        let report = Ingestor::new(&graph, AdjacencyTable::new())
            .ingest(&[bare])
            .await
            .unwrap();

        assert_eq!(report.buildings, 0);
        let counts = graph.counts().await.unwrap();
        assert_eq!(counts.label(NodeLabel::Building), 0);
        assert_eq!(counts.rel_type(EdgeLabel::ServedBy), 1);
    }
}
