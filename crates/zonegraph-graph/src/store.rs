//! The graph store seam.
//!
//! Everything ingestion and querying need from a graph database: idempotent
//! node and edge upserts, the fixed read traversals, and counts. Each call is
//! one transaction against the store.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use zonegraph_core::{PropertyMap, Record};

/// Node labels in the zone graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeLabel {
    Zone,
    Building,
    Utility,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zone => "Zone",
            Self::Building => "Building",
            Self::Utility => "Utility",
        }
    }

    /// Property holding the natural key. Unique per label.
    pub fn key_property(&self) -> &'static str {
        "name"
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types in the zone graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeLabel {
    /// (:Building)-[:WITHIN_ZONE]->(:Zone)
    WithinZone,
    /// (:Zone)-[:SERVED_BY]->(:Utility)
    ServedBy,
    /// (:Zone)-[:NEIGHBORS]->(:Zone), always written in both directions
    Neighbors,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WithinZone => "WITHIN_ZONE",
            Self::ServedBy => "SERVED_BY",
            Self::Neighbors => "NEIGHBORS",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node selected by label and natural key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub name: String,
}

impl NodeRef {
    pub fn new(label: NodeLabel, name: impl Into<String>) -> Self {
        Self {
            label,
            name: name.into(),
        }
    }

    pub fn zone(name: impl Into<String>) -> Self {
        Self::new(NodeLabel::Zone, name)
    }

    pub fn building(name: impl Into<String>) -> Self {
        Self::new(NodeLabel::Building, name)
    }

    pub fn utility(name: impl Into<String>) -> Self {
        Self::new(NodeLabel::Utility, name)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.label, self.name)
    }
}

/// The read traversals a store answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    /// Buildings within a zone, joined to every utility serving that zone.
    /// Rows are ordered by building, then utility.
    BuildingUtilities { zone: String },
}

impl Traversal {
    pub fn building_utilities(zone: impl Into<String>) -> Self {
        Self::BuildingUtilities { zone: zone.into() }
    }

    pub fn cypher(&self) -> &'static str {
        match self {
            Self::BuildingUtilities { .. } => {
                "MATCH (b:Building)-[:WITHIN_ZONE]->(z:Zone {name: $zone})-[:SERVED_BY]->(u:Utility)
                 RETURN b.name AS building, u.name AS utility
                 ORDER BY building, utility"
            }
        }
    }

    pub fn parameters(&self) -> PropertyMap {
        let mut params = PropertyMap::new();
        match self {
            Self::BuildingUtilities { zone } => {
                params.insert("zone".into(), zone.as_str().into());
            }
        }
        params
    }

    /// Result columns. All are string-valued.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::BuildingUtilities { .. } => &["building", "utility"],
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuildingUtilities { zone } => write!(f, "building utilities of zone '{}'", zone),
        }
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
    pub nodes_by_label: BTreeMap<String, usize>,
    pub relationships_by_type: BTreeMap<String, usize>,
}

impl GraphCounts {
    pub fn label(&self, label: NodeLabel) -> usize {
        self.nodes_by_label.get(label.as_str()).copied().unwrap_or(0)
    }

    pub fn rel_type(&self, edge: EdgeLabel) -> usize {
        self.relationships_by_type
            .get(edge.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// A graph database holding the zone graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the node if absent, then merge `properties` onto it.
    /// Properties not named here are left untouched.
    async fn ensure_node(&self, node: &NodeRef, properties: &PropertyMap) -> Result<()>;

    /// Create both endpoints by key if absent, then the edge if absent.
    async fn ensure_edge(&self, from: &NodeRef, edge: EdgeLabel, to: &NodeRef) -> Result<()>;

    /// Run a read-only traversal and return every row.
    async fn read(&self, traversal: &Traversal) -> Result<Vec<Record>>;

    async fn counts(&self) -> Result<GraphCounts>;
}
