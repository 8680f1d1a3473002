//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use zonegraph_graph::{GraphClient, GraphConfig, GraphStore, MemoryGraph};

pub mod ingest;
pub mod query;
pub mod status;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Urban planning zone graph
#[derive(Parser)]
#[command(name = "zonegraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Use an in-process graph instead of Neo4j
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(flatten)]
    pub neo4j: Neo4jArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest the CSV, then answer the zone question (default)
    Run(RunArgs),

    /// Ingest the CSV into the graph
    Ingest(ingest::IngestArgs),

    /// Query buildings and their utilities for a zone
    Query(query::QueryArgs),

    /// Show node and relationship counts
    Status,
}

/// Neo4j connection settings.
#[derive(Args, Debug, Clone)]
pub struct Neo4jArgs {
    /// Bolt URI
    #[arg(
        long = "neo4j-uri",
        env = "NEO4J_URI",
        default_value = "bolt://localhost:7687",
        global = true
    )]
    pub uri: String,

    #[arg(
        long = "neo4j-user",
        env = "NEO4J_USERNAME",
        default_value = "neo4j",
        global = true
    )]
    pub user: String,

    #[arg(
        long = "neo4j-password",
        env = "NEO4J_PASSWORD",
        default_value = "neo4j",
        hide_env_values = true,
        global = true
    )]
    pub password: String,

    #[arg(
        long = "neo4j-database",
        env = "NEO4J_DATABASE",
        default_value = "neo4j",
        global = true
    )]
    pub database: String,
}

impl From<Neo4jArgs> for GraphConfig {
    fn from(args: Neo4jArgs) -> Self {
        GraphConfig {
            uri: args.uri,
            user: args.user,
            password: args.password,
            database: args.database,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub ingest: ingest::IngestArgs,

    #[command(flatten)]
    pub query: query::QueryArgs,
}

/// The graph a command runs against. Held for the whole command.
pub enum Backend {
    Neo4j(GraphClient),
    Memory(MemoryGraph),
}

impl Backend {
    async fn open(cli: &Cli) -> Result<Self> {
        if cli.memory {
            info!("Using in-memory graph");
            return Ok(Self::Memory(MemoryGraph::new()));
        }

        let config: GraphConfig = cli.neo4j.clone().into();
        let client = tokio::time::timeout(CONNECT_TIMEOUT, GraphClient::connect(&config))
            .await
            .with_context(|| format!("Timed out connecting to Neo4j at {}", config.uri))??;
        info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self::Neo4j(client))
    }

    pub fn store(&self) -> &dyn GraphStore {
        match self {
            Self::Neo4j(client) => client,
            Self::Memory(graph) => graph,
        }
    }

    /// Apply uniqueness constraints. No-op for the in-memory graph.
    pub async fn prepare_schema(&self) -> Result<()> {
        match self {
            Self::Neo4j(client) => zonegraph_graph::schema::initialize_schema(client).await,
            Self::Memory(_) => Ok(()),
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let backend = Backend::open(&self).await?;
        let command = self.command.unwrap_or(Commands::Run(RunArgs::default()));

        match command {
            Commands::Run(args) => {
                ingest::execute(&backend, &args.ingest).await?;
                query::execute(&backend, &args.query).await
            }
            Commands::Ingest(args) => ingest::execute(&backend, &args).await,
            Commands::Query(args) => query::execute(&backend, &args).await,
            Commands::Status => status::execute(&backend).await,
        }
    }
}
