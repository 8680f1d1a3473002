//! In-memory graph store.
//!
//! Same merge semantics as the Neo4j client: nodes are unique per label and
//! name, edges are unique per (from, type, to), and property upserts only
//! overwrite the keys they carry. Used for `--memory` runs and in tests.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use zonegraph_core::{PropertyMap, PropertyValue, Record};

use crate::store::{EdgeLabel, GraphCounts, GraphStore, NodeLabel, NodeRef, Traversal};

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<NodeRef, PropertyMap>,
    edges: BTreeSet<(NodeRef, EdgeLabel, NodeRef)>,
    fail_on: Option<String>,
}

impl State {
    fn check_fault(&self, names: &[&str]) -> Result<()> {
        if let Some(bad) = &self.fail_on {
            if names.iter().any(|n| *n == bad.as_str()) {
                bail!("injected store failure for '{}'", bad);
            }
        }
        Ok(())
    }
}

/// A graph held in process memory.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<State>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write touching a node with this name fail.
    pub async fn fail_on(&self, name: impl Into<String>) {
        self.state.lock().await.fail_on = Some(name.into());
    }

    pub async fn clear_failure(&self) {
        self.state.lock().await.fail_on = None;
    }

    /// Properties of a node, if it exists.
    pub async fn node(&self, node: &NodeRef) -> Option<PropertyMap> {
        self.state.lock().await.nodes.get(node).cloned()
    }

    pub async fn has_edge(&self, from: &NodeRef, edge: EdgeLabel, to: &NodeRef) -> bool {
        self.state
            .lock()
            .await
            .edges
            .contains(&(from.clone(), edge, to.clone()))
    }

    /// Names of every node with this label, sorted.
    pub async fn names(&self, label: NodeLabel) -> Vec<String> {
        self.state
            .lock()
            .await
            .nodes
            .keys()
            .filter(|n| n.label == label)
            .map(|n| n.name.clone())
            .collect()
    }
}

fn building_utilities(state: &State, zone: &str) -> Vec<Record> {
    let zone_ref = NodeRef::zone(zone);

    let buildings: Vec<&str> = state
        .edges
        .iter()
        .filter(|(from, edge, to)| {
            *edge == EdgeLabel::WithinZone && from.label == NodeLabel::Building && *to == zone_ref
        })
        .map(|(from, _, _)| from.name.as_str())
        .collect();

    let utilities: Vec<&str> = state
        .edges
        .iter()
        .filter(|(from, edge, to)| {
            *edge == EdgeLabel::ServedBy && *from == zone_ref && to.label == NodeLabel::Utility
        })
        .map(|(_, _, to)| to.name.as_str())
        .collect();

    let mut pairs: Vec<(&str, &str)> = buildings
        .iter()
        .flat_map(|b| utilities.iter().map(move |u| (*b, *u)))
        .collect();
    pairs.sort();

    pairs
        .into_iter()
        .map(|(building, utility)| {
            let mut record = Record::new();
            record.insert("building".into(), PropertyValue::from(building));
            record.insert("utility".into(), PropertyValue::from(utility));
            record
        })
        .collect()
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn ensure_node(&self, node: &NodeRef, properties: &PropertyMap) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check_fault(&[node.name.as_str()])?;

        let entry = state.nodes.entry(node.clone()).or_default();
        for (key, value) in properties {
            entry.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn ensure_edge(&self, from: &NodeRef, edge: EdgeLabel, to: &NodeRef) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check_fault(&[from.name.as_str(), to.name.as_str()])?;

        state.nodes.entry(from.clone()).or_default();
        state.nodes.entry(to.clone()).or_default();
        state.edges.insert((from.clone(), edge, to.clone()));
        Ok(())
    }

    async fn read(&self, traversal: &Traversal) -> Result<Vec<Record>> {
        let state = self.state.lock().await;
        match traversal {
            Traversal::BuildingUtilities { zone } => {
                state.check_fault(&[zone.as_str()])?;
                Ok(building_utilities(&state, zone))
            }
        }
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let state = self.state.lock().await;
        let mut counts = GraphCounts {
            nodes: state.nodes.len(),
            relationships: state.edges.len(),
            ..Default::default()
        };
        for node in state.nodes.keys() {
            *counts
                .nodes_by_label
                .entry(node.label.as_str().to_string())
                .or_default() += 1;
        }
        for (_, edge, _) in &state.edges {
            *counts
                .relationships_by_type
                .entry(edge.as_str().to_string())
                .or_default() += 1;
        }
        Ok(counts)
    }
}
