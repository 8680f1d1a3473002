//! Neo4j connection client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Graph, Query, Row, Txn};
use serde::Deserialize;
use tracing::{debug, warn};

use zonegraph_core::{PropertyMap, PropertyValue, Record};

use crate::store::{EdgeLabel, GraphCounts, GraphStore, NodeRef, Traversal};

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Client for the zone graph in Neo4j.
///
/// Every write runs in its own explicit transaction and is committed before
/// the call returns; reads drain their rows inside a transaction too.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// `Graph::connect` only builds the pool, so a `RETURN 1` ping forces a real
    /// bolt handshake and fails fast when Neo4j is unreachable.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(4)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .with_context(|| format!("Neo4j at {} is not responding to queries", config.uri))?;

        Ok(Self { graph })
    }

    /// Execute a Cypher statement in a write transaction.
    pub async fn execute(&self, query: Query) -> Result<()> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to start write transaction")?;

        match txn.run(query).await {
            Ok(()) => {
                txn.commit()
                    .await
                    .context("Failed to commit write transaction")?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Write failed, rolling back");
                txn.rollback()
                    .await
                    .context("Failed to roll back write transaction")?;
                Err(e).context("Neo4j query execution failed")
            }
        }
    }

    /// Execute a Cypher query in a transaction and return every row.
    pub async fn query(&self, query: Query) -> Result<Vec<Row>> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to start read transaction")?;

        match collect_rows(&mut txn, query).await {
            Ok(rows) => {
                txn.commit()
                    .await
                    .context("Failed to close read transaction")?;
                Ok(rows)
            }
            Err(e) => {
                warn!(error = %e, "Read failed, rolling back");
                txn.rollback()
                    .await
                    .context("Failed to roll back read transaction")?;
                Err(e)
            }
        }
    }
}

async fn collect_rows(txn: &mut Txn, query: Query) -> Result<Vec<Row>> {
    let mut stream = txn.execute(query).await.context("Neo4j query failed")?;
    let mut rows = Vec::new();
    while let Some(row) = stream
        .next(txn.handle())
        .await
        .context("Failed to fetch result row")?
    {
        rows.push(row);
    }
    Ok(rows)
}

/// Upsert a node by its key. Existing properties not in `$properties` are kept.
fn node_merge_cypher(node: &NodeRef, with_properties: bool) -> String {
    let merge = format!(
        "MERGE (n:{} {{{}: $name}})",
        node.label,
        node.label.key_property()
    );
    if with_properties {
        format!("{} SET n += $properties", merge)
    } else {
        merge
    }
}

/// Upsert both endpoints by key, then the directed edge between them.
fn edge_merge_cypher(from: &NodeRef, edge: EdgeLabel, to: &NodeRef) -> String {
    format!(
        "MERGE (a:{} {{{}: $from}}) MERGE (b:{} {{{}: $to}}) MERGE (a)-[:{}]->(b)",
        from.label,
        from.label.key_property(),
        to.label,
        to.label.key_property(),
        edge
    )
}

fn to_bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::Null => BoltType::Null(BoltNull),
        PropertyValue::Bool(b) => (*b).into(),
        PropertyValue::Int(i) => (*i).into(),
        PropertyValue::Str(s) => s.as_str().into(),
    }
}

fn to_bolt_map(properties: &PropertyMap) -> BoltType {
    let mut map = BoltMap::new();
    for (key, value) in properties {
        map.put(BoltString::from(key.as_str()), to_bolt(value));
    }
    BoltType::Map(map)
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn ensure_node(&self, node: &NodeRef, properties: &PropertyMap) -> Result<()> {
        let query = Query::new(node_merge_cypher(node, !properties.is_empty()))
            .param("name", node.name.as_str())
            .param("properties", to_bolt_map(properties));

        self.execute(query)
            .await
            .with_context(|| format!("ensure {} node", node))?;
        debug!(label = %node.label, name = %node.name, "Ensured node");
        Ok(())
    }

    async fn ensure_edge(&self, from: &NodeRef, edge: EdgeLabel, to: &NodeRef) -> Result<()> {
        let query = Query::new(edge_merge_cypher(from, edge, to))
            .param("from", from.name.as_str())
            .param("to", to.name.as_str());

        self.execute(query)
            .await
            .with_context(|| format!("ensure {} edge {} -> {}", edge, from, to))?;
        debug!(from = %from, to = %to, edge = %edge, "Ensured edge");
        Ok(())
    }

    async fn read(&self, traversal: &Traversal) -> Result<Vec<Record>> {
        let mut query = Query::new(traversal.cypher().to_string());
        for (key, value) in traversal.parameters() {
            query = query.param(&key, to_bolt(&value));
        }

        let rows = self
            .query(query)
            .await
            .with_context(|| format!("read {}", traversal))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = Record::new();
            for column in traversal.columns() {
                let value: Option<String> = row
                    .get(column)
                    .with_context(|| format!("read column '{}' of {}", column, traversal))?;
                record.insert(column.to_string(), value.into());
            }
            records.push(record);
        }
        Ok(records)
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let node_query = Query::new(
            "MATCH (n) RETURN coalesce(labels(n)[0], '') AS label, count(n) AS count".to_string(),
        );
        let rel_query = Query::new(
            "MATCH ()-[r]->() RETURN type(r) AS rel_type, count(r) AS count".to_string(),
        );

        let mut counts = GraphCounts::default();

        for row in self.query(node_query).await.context("count nodes")? {
            let label: String = row.get("label").context("read node label")?;
            let count: i64 = row.get("count").context("read node count")?;
            counts.nodes += count as usize;
            *counts.nodes_by_label.entry(label).or_default() += count as usize;
        }

        for row in self.query(rel_query).await.context("count relationships")? {
            let rel_type: String = row.get("rel_type").context("read relationship type")?;
            let count: i64 = row.get("count").context("read relationship count")?;
            counts.relationships += count as usize;
            *counts.relationships_by_type.entry(rel_type).or_default() += count as usize;
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.database, "neo4j");
    }

    #[test]
    fn test_property_map_to_bolt() {
        let mut props = PropertyMap::new();
        props.insert("FamilySize".into(), PropertyValue::Int(4));
        props.insert("Landscape".into(), PropertyValue::from("Desert"));
        props.insert("PublicTransportAccess".into(), PropertyValue::Bool(true));

        match to_bolt_map(&props) {
            BoltType::Map(map) => assert_eq!(map.value.len(), 3),
            other => panic!("expected a map, got {:?}", other),
        }
    }

    #[test]
    fn test_node_merge_keeps_unlisted_properties() {
        let tempe = NodeRef::zone("Tempe");

        let cypher = node_merge_cypher(&tempe, true);
        assert_eq!(cypher, "MERGE (n:Zone {name: $name}) SET n += $properties");
        assert!(!cypher.contains("CREATE"));

        assert_eq!(node_merge_cypher(&tempe, false), "MERGE (n:Zone {name: $name})");
    }

    #[test]
    fn test_edge_merge_labels_and_direction() {
        let zone = NodeRef::zone("Mesa");
        let cases = [
            (NodeRef::building("Mesa Building A"), EdgeLabel::WithinZone, zone.clone()),
            (zone.clone(), EdgeLabel::ServedBy, NodeRef::utility("Water")),
            (zone.clone(), EdgeLabel::Neighbors, NodeRef::zone("Tempe")),
        ];
        let expected = [
            "MERGE (a:Building {name: $from}) MERGE (b:Zone {name: $to}) \
             MERGE (a)-[:WITHIN_ZONE]->(b)",
            "MERGE (a:Zone {name: $from}) MERGE (b:Utility {name: $to}) \
             MERGE (a)-[:SERVED_BY]->(b)",
            "MERGE (a:Zone {name: $from}) MERGE (b:Zone {name: $to}) \
             MERGE (a)-[:NEIGHBORS]->(b)",
        ];

        for ((from, edge, to), expected) in cases.iter().zip(expected) {
            let cypher = edge_merge_cypher(from, *edge, to);
            assert_eq!(cypher, expected);
            assert!(!cypher.contains("CREATE"));
        }
    }
}
