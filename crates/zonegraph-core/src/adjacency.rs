//! Static zone adjacency.
//!
//! Maps a zone name to the zones it borders. The table is configuration, not
//! source data: it is passed into ingestion, and every listed pair becomes a
//! pair of opposite `NEIGHBORS` edges regardless of whether the table lists it
//! from both sides.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ZoneError, ZoneResult};

/// Zone name to ordered neighbor names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyTable {
    entries: Vec<(String, Vec<String>)>,
}

#[derive(Deserialize)]
struct AdjacencyFile {
    neighbors: toml::Table,
}

impl AdjacencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone and its neighbors. Neighbors of a zone already present are appended.
    pub fn with_zone<I, S>(mut self, zone: impl Into<String>, neighbors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(zone, neighbors);
        self
    }

    pub fn insert<I, S>(&mut self, zone: impl Into<String>, neighbors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let zone = zone.into();
        let neighbors = neighbors.into_iter().map(Into::into);
        match self.entries.iter_mut().find(|(name, _)| *name == zone) {
            Some((_, list)) => list.extend(neighbors),
            None => self.entries.push((zone, neighbors.collect())),
        }
    }

    /// The Phoenix metro table the urban planning dataset ships with.
    pub fn phoenix_metro() -> Self {
        Self::new()
            .with_zone("Downtown Phoenix", ["Tempe", "Scottsdale", "Chandler"])
            .with_zone("Tempe", ["Downtown Phoenix", "Mesa", "Gilbert"])
            .with_zone("Scottsdale", ["Downtown Phoenix", "Mesa"])
            .with_zone("Mesa", ["Tempe", "Scottsdale", "Gilbert"])
            .with_zone("Gilbert", ["Tempe", "Mesa", "Chandler"])
            .with_zone("Chandler", ["Gilbert", "Downtown Phoenix"])
            .with_zone("Sun City", ["Scottsdale", "Mesa"])
    }

    /// Parse a TOML document with a `[neighbors]` table of string arrays.
    ///
    /// ```toml
    /// [neighbors]
    /// "Tempe" = ["Mesa", "Gilbert"]
    /// ```
    pub fn from_toml_str(text: &str) -> ZoneResult<Self> {
        let file: AdjacencyFile =
            toml::from_str(text).map_err(|e| ZoneError::Adjacency(e.to_string()))?;

        let mut table = Self::new();
        for (zone, value) in file.neighbors {
            let list = value.as_array().ok_or_else(|| {
                ZoneError::Adjacency(format!("neighbors of '{}' must be an array", zone))
            })?;
            let mut names = Vec::with_capacity(list.len());
            for item in list {
                let name = item.as_str().ok_or_else(|| {
                    ZoneError::Adjacency(format!("neighbor of '{}' must be a string", zone))
                })?;
                names.push(name.to_string());
            }
            table.insert(zone, names);
        }
        Ok(table)
    }

    pub fn from_toml_file(path: &Path) -> ZoneResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ZoneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Every (zone, neighbor) pair as listed, duplicates included.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(zone, neighbors)| {
            neighbors.iter().map(move |n| (zone.as_str(), n.as_str()))
        })
    }

    /// Unordered zone pairs, each once. Self-pairs are kept.
    pub fn undirected_pairs(&self) -> BTreeSet<(&str, &str)> {
        self.pairs()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
