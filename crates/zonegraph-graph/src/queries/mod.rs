//! Read traversals over the zone graph.

pub mod utilities;

pub use utilities::{buildings_with_utilities, BuildingUtility};
