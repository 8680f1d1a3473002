//! Zones loaded from the urban planning CSV.

pub mod buildings;
pub mod model;
pub mod parser;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ZoneError, ZoneResult};

pub use buildings::{derive_buildings, BuildingSource, Lettered};
pub use model::{Zone, ZoneAttributes};
pub use parser::{parse_zone, Header};

/// What to do with a row that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Fail the whole load on the first bad row.
    #[default]
    Abort,
    /// Skip bad rows and report them in [`LoadReport::failures`].
    SkipInvalid,
}

/// A row that was skipped under [`LoadPolicy::SkipInvalid`].
#[derive(Debug)]
pub struct RowFailure {
    /// 1-based data row number, header excluded.
    pub row: usize,
    /// Zone cell of the row, when it could be read.
    pub zone: Option<String>,
    pub error: ZoneError,
}

/// Zones loaded from a source, ready for ingestion.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub zones: Vec<Zone>,
    pub failures: Vec<RowFailure>,
}

/// Load zones from a CSV file on disk.
pub fn load_zones(
    path: &Path,
    policy: LoadPolicy,
    buildings: &dyn BuildingSource,
) -> ZoneResult<LoadReport> {
    let file = File::open(path).map_err(|source| ZoneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Reading zones");
    load_zones_from_reader(file, policy, buildings)
}

/// Load zones from any CSV reader. The first record is the header.
pub fn load_zones_from_reader<R: Read>(
    reader: R,
    policy: LoadPolicy,
    buildings: &dyn BuildingSource,
) -> ZoneResult<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = Header::new(csv_reader.headers()?.iter());
    if header.is_empty() {
        return Err(ZoneError::EmptySource);
    }

    let missing = header.missing_required();
    if !missing.is_empty() {
        return Err(ZoneError::MissingColumns {
            columns: missing.into_iter().map(String::from).collect(),
        });
    }

    let mut report = LoadReport::default();

    for (i, record) in csv_reader.records().enumerate() {
        let row = i + 1;
        let outcome = match record {
            Ok(record) => {
                let cells: Vec<&str> = record.iter().collect();
                parse_zone(&header, &cells).map_err(|e| {
                    let zone = header
                        .position(parser::COL_ZONE)
                        .ok()
                        .and_then(|idx| cells.get(idx))
                        .map(|s| s.to_string());
                    (zone, e)
                })
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => Err((None, e.into())),
        };

        match outcome {
            Ok(mut zone) => {
                derive_buildings(&mut zone, buildings);
                debug!(
                    zone = %zone.name,
                    buildings = ?zone.buildings,
                    utilities = ?zone.utilities,
                    "Parsed zone"
                );
                report.zones.push(zone);
            }
            Err((_, error)) if policy == LoadPolicy::Abort => {
                return Err(error.at_row(row));
            }
            Err((zone, error)) => {
                warn!(row, zone = zone.as_deref().unwrap_or(""), %error, "Skipping invalid row");
                report.failures.push(RowFailure { row, zone, error });
            }
        }
    }

    info!(
        zones = report.zones.len(),
        skipped = report.failures.len(),
        "Zones loaded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
Zone,FamilySize,MaritalStatus,NumChildren,AgeGroup,NearbyParks,NearbySchools,NearbyHospitals,LandType,Landscape,PublicTransportAccess,Utilities,ShoppingCenters
Tempe,4,Married,2,30-45,5,3,1,Residential,Desert,Yes,\"Water,Electric\",2
Mesa,3,Single,0,18-30,2,2,1,Mixed,Urban,No,Electric,4
";

    fn load(csv: &str, policy: LoadPolicy) -> ZoneResult<LoadReport> {
        load_zones_from_reader(csv.as_bytes(), policy, &Lettered::default())
    }

    #[test]
    fn test_load_from_reader() {
        let report = load(CSV, LoadPolicy::Abort).unwrap();
        assert_eq!(report.zones.len(), 2);
        assert!(report.failures.is_empty());
        assert_eq!(report.zones[0].name, "Tempe");
        assert_eq!(report.zones[0].utilities, vec!["Water", "Electric"]);
        assert_eq!(report.zones[0].buildings.len(), 3);
        assert_eq!(report.zones[1].name, "Mesa");
        assert!(!report.zones[1].attributes.public_transport_access);
    }

    #[test]
    fn test_abort_on_first_bad_row() {
        let csv = CSV.replace("Mesa,3,", "Mesa,three,");
        let err = load(&csv, LoadPolicy::Abort).unwrap_err();
        assert!(matches!(err, ZoneError::Row { row: 2, .. }));
        assert_eq!(err.field(), Some("FamilySize"));
    }

    #[test]
    fn test_skip_invalid_rows() {
        let csv = CSV.replace("Tempe,4,", "Tempe,four,");
        let report = load(&csv, LoadPolicy::SkipInvalid).unwrap();
        assert_eq!(report.zones.len(), 1);
        assert_eq!(report.zones[0].name, "Mesa");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 1);
        assert_eq!(report.failures[0].zone.as_deref(), Some("Tempe"));
        assert_eq!(report.failures[0].error.field(), Some("FamilySize"));
    }

    #[test]
    fn test_short_row_is_a_row_failure() {
        let csv = format!("{}Chandler,2\n", CSV);
        let err = load(&csv, LoadPolicy::Abort).unwrap_err();
        assert!(matches!(err, ZoneError::Row { row: 3, .. }));
    }

    #[test]
    fn test_empty_source() {
        let err = load("", LoadPolicy::Abort).unwrap_err();
        assert!(matches!(err, ZoneError::EmptySource));
    }

    #[test]
    fn test_header_only_source() {
        let header_only = CSV.lines().next().unwrap();
        let report = load(header_only, LoadPolicy::Abort).unwrap();
        assert!(report.zones.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let report = load_zones(file.path(), LoadPolicy::Abort, &Lettered::default()).unwrap();
        assert_eq!(report.zones.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/zones.csv");
        let err = load_zones(path, LoadPolicy::Abort, &Lettered::default()).unwrap_err();
        assert!(matches!(err, ZoneError::Io { .. }));
    }

    #[test]
    fn test_missing_header_column_aborts_under_any_policy() {
        let csv = CSV
            .replace(",Utilities,", ",")
            .replace(",\"Water,Electric\",", ",")
            .replace(",No,Electric,", ",No,");

        for policy in [LoadPolicy::Abort, LoadPolicy::SkipInvalid] {
            let err = load(&csv, policy).unwrap_err();
            let ZoneError::MissingColumns { columns } = &err else {
                panic!("expected missing columns, got {:?}", err);
            };
            assert_eq!(columns, &vec!["Utilities".to_string()]);
            assert!(err.to_string().contains("Utilities"));
        }
    }
}
