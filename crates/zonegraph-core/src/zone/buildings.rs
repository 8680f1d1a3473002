//! Building derivation for parsed zones.

use super::model::Zone;

/// Supplies the buildings owned by a zone.
///
/// The source data carries no buildings, so the pipeline asks a source for
/// them. Swap the implementation to plug in real building data.
pub trait BuildingSource: Send + Sync {
    fn buildings_for(&self, zone: &Zone) -> Vec<String>;
}

/// Placeholder buildings named `"<Zone> Building A"`, `"... B"`, and so on.
#[derive(Debug, Clone, Copy)]
pub struct Lettered {
    count: u8,
}

impl Lettered {
    /// At most 26 buildings, one per letter.
    pub fn new(count: u8) -> Self {
        Self { count: count.min(26) }
    }
}

impl Default for Lettered {
    fn default() -> Self {
        Self::new(3)
    }
}

impl BuildingSource for Lettered {
    fn buildings_for(&self, zone: &Zone) -> Vec<String> {
        (0..self.count)
            .map(|i| format!("{} Building {}", zone.name, char::from(b'A' + i)))
            .collect()
    }
}

/// Append the source's buildings to the zone.
pub fn derive_buildings(zone: &mut Zone, source: &dyn BuildingSource) {
    let buildings = source.buildings_for(zone);
    zone.buildings.extend(buildings);
}
