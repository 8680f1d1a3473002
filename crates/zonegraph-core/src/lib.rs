//! # Zonegraph Core
//!
//! Domain model for the zone graph: zones parsed from the urban planning CSV,
//! the buildings and utilities derived from them, the static neighbor table,
//! and the plain-text rendering of query results.

pub mod adjacency;
pub mod error;
pub mod property;
pub mod render;
pub mod zone;

pub use adjacency::AdjacencyTable;
pub use error::{ZoneError, ZoneResult};
pub use property::{PropertyMap, PropertyValue, Record};
pub use render::render_response;
pub use zone::{
    load_zones, load_zones_from_reader, BuildingSource, Lettered, LoadPolicy, LoadReport,
    RowFailure, Zone, ZoneAttributes,
};
