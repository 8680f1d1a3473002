//! Neo4j schema initialization (uniqueness constraints).

use anyhow::{Context, Result};
use neo4rs::Query;
use tracing::info;

use crate::GraphClient;

/// Cypher statements for schema initialization.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT zone_name IF NOT EXISTS FOR (z:Zone) REQUIRE z.name IS UNIQUE",
    "CREATE CONSTRAINT building_name IF NOT EXISTS FOR (b:Building) REQUIRE b.name IS UNIQUE",
    "CREATE CONSTRAINT utility_name IF NOT EXISTS FOR (u:Utility) REQUIRE u.name IS UNIQUE",
];

/// Initialize Neo4j schema with one uniqueness constraint per node label.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        client
            .execute(Query::new(statement.to_string()))
            .await
            .with_context(|| format!("Failed to apply schema statement: {}", statement))?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}
