//! # Zonegraph Graph
//!
//! Neo4j integration for the zone graph.
//!
//! Provides the store seam ([`GraphStore`]) with a Neo4j client and an
//! in-memory implementation, ingestion of parsed zones into the graph,
//! and the building/utility traversal.

pub mod client;
pub mod ingest;
pub mod memory;
pub mod queries;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig};
pub use ingest::{IngestReport, Ingestor};
pub use memory::MemoryGraph;
pub use queries::{buildings_with_utilities, BuildingUtility};
pub use store::{EdgeLabel, GraphCounts, GraphStore, NodeLabel, NodeRef, Traversal};
