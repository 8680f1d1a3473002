//! CSV row parsing into [`Zone`] values.
//!
//! Cells are looked up by column name, never by position, so the source may
//! order its columns freely. Required columns must be present; the secondary
//! numeric columns default to zero when the source does not carry them.

use std::collections::HashMap;

use crate::error::{ZoneError, ZoneResult};
use super::model::{Zone, ZoneAttributes};

pub const COL_ZONE: &str = "Zone";
pub const COL_FAMILY_SIZE: &str = "FamilySize";
pub const COL_MARITAL_STATUS: &str = "MaritalStatus";
pub const COL_NUM_CHILDREN: &str = "NumChildren";
pub const COL_AGE_GROUP: &str = "AgeGroup";
pub const COL_NEARBY_PARKS: &str = "NearbyParks";
pub const COL_NEARBY_SCHOOLS: &str = "NearbySchools";
pub const COL_NEARBY_HOSPITALS: &str = "NearbyHospitals";
pub const COL_LAND_TYPE: &str = "LandType";
pub const COL_LANDSCAPE: &str = "Landscape";
pub const COL_PUBLIC_TRANSPORT: &str = "PublicTransportAccess";
pub const COL_UTILITIES: &str = "Utilities";
pub const COL_SHOPPING_CENTERS: &str = "ShoppingCenters";

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_ZONE,
    COL_FAMILY_SIZE,
    COL_MARITAL_STATUS,
    COL_NUM_CHILDREN,
    COL_AGE_GROUP,
    COL_NEARBY_PARKS,
    COL_NEARBY_SCHOOLS,
    COL_NEARBY_HOSPITALS,
    COL_LAND_TYPE,
    COL_LANDSCAPE,
    COL_PUBLIC_TRANSPORT,
    COL_UTILITIES,
    COL_SHOPPING_CENTERS,
];

/// Cell value that marks public transport access. Matched exactly.
pub const AFFIRMATIVE: &str = "Yes";

/// Separator inside the Utilities cell.
pub const UTILITY_DELIMITER: char = ',';

/// Column name to position lookup built from the header row.
#[derive(Debug, Clone)]
pub struct Header {
    positions: HashMap<String, usize>,
    len: usize,
}

impl Header {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = HashMap::new();
        let mut len = 0;
        for (i, name) in columns.into_iter().enumerate() {
            // First occurrence wins on duplicate names
            positions.entry(name.as_ref().to_string()).or_insert(i);
            len = i + 1;
        }
        Self { positions, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Position of a column, or a [`ZoneError::MissingColumn`].
    pub fn position(&self, column: &str) -> ZoneResult<usize> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| ZoneError::missing_column(column))
    }

    /// Required columns absent from this header.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !self.contains(c))
            .collect()
    }
}

/// One data row viewed through its header.
struct Cells<'a, S> {
    header: &'a Header,
    row: &'a [S],
}

impl<S: AsRef<str>> Cells<'_, S> {
    fn text(&self, column: &str) -> ZoneResult<&str> {
        let idx = self.header.position(column)?;
        Ok(self.row[idx].as_ref())
    }

    fn int(&self, column: &str) -> ZoneResult<i64> {
        let raw = self.text(column)?;
        parse_int(column, raw)
    }

    fn optional_int(&self, column: &str) -> ZoneResult<i64> {
        if self.header.contains(column) {
            self.int(column)
        } else {
            Ok(0)
        }
    }
}

fn parse_int(field: &str, raw: &str) -> ZoneResult<i64> {
    raw.parse::<i64>().map_err(|source| ZoneError::InvalidInteger {
        field: field.to_string(),
        value: raw.to_string(),
        source,
    })
}

/// Split the Utilities cell into trimmed, non-empty names.
pub fn split_utilities(cell: &str) -> Vec<String> {
    cell.split(UTILITY_DELIMITER)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Parse one data row into a [`Zone`].
///
/// The returned zone has no buildings; those come from a
/// [`BuildingSource`](super::BuildingSource).
pub fn parse_zone<S: AsRef<str>>(header: &Header, row: &[S]) -> ZoneResult<Zone> {
    if row.len() != header.len() {
        return Err(ZoneError::RowArity {
            expected: header.len(),
            found: row.len(),
        });
    }

    let cells = Cells { header, row };

    let attributes = ZoneAttributes {
        family_size: cells.int(COL_FAMILY_SIZE)?,
        marital_status: cells.text(COL_MARITAL_STATUS)?.to_string(),
        num_children: cells.int(COL_NUM_CHILDREN)?,
        age_group: cells.text(COL_AGE_GROUP)?.to_string(),
        nearby_parks: cells.int(COL_NEARBY_PARKS)?,
        nearby_schools: cells.int(COL_NEARBY_SCHOOLS)?,
        nearby_hospitals: cells.int(COL_NEARBY_HOSPITALS)?,
        land_type: cells.text(COL_LAND_TYPE)?.to_string(),
        landscape: cells.text(COL_LANDSCAPE)?.to_string(),
        public_transport_access: cells.text(COL_PUBLIC_TRANSPORT)? == AFFIRMATIVE,
        shopping_centers: cells.int(COL_SHOPPING_CENTERS)?,
        fitness_centers: cells.optional_int("FitnessCenters")?,
        child_care_services: cells.optional_int("ChildCareServices")?,
        avg_housing_cost: cells.optional_int("AvgHousingCost")?,
        crime_rate: cells.optional_int("CrimeRate")?,
        rental_availability: cells.optional_int("RentalAvailability")?,
        avg_size_per_home: cells.optional_int("AvgSizePerHome")?,
        air_quality_index: cells.optional_int("AirQualityIndex")?,
        green_cover: cells.optional_int("GreenCover")?,
        noise_pollution_level: cells.optional_int("NoisePollutionLevel")?,
    };

    let mut zone = Zone::new(cells.text(COL_ZONE)?, attributes);
    zone.utilities = split_utilities(cells.text(COL_UTILITIES)?);
    Ok(zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[&str] = &[
        "Zone", "FamilySize", "MaritalStatus", "NumChildren", "AgeGroup",
        "NearbyParks", "NearbySchools", "NearbyHospitals", "LandType",
        "Landscape", "PublicTransportAccess", "Utilities", "ShoppingCenters",
    ];

    fn tempe_row() -> Vec<&'static str> {
        vec![
            "Tempe", "4", "Married", "2", "30-45", "5", "3", "1", "Residential",
            "Desert", "Yes", "Water,Electric", "2",
        ]
    }

    #[test]
    fn test_parse_well_formed_row() {
        let header = Header::new(HEADER);
        let zone = parse_zone(&header, &tempe_row()).unwrap();

        assert_eq!(zone.name, "Tempe");
        assert_eq!(zone.attributes.family_size, 4);
        assert_eq!(zone.attributes.marital_status, "Married");
        assert_eq!(zone.attributes.num_children, 2);
        assert_eq!(zone.attributes.age_group, "30-45");
        assert_eq!(zone.attributes.nearby_parks, 5);
        assert_eq!(zone.attributes.nearby_schools, 3);
        assert_eq!(zone.attributes.nearby_hospitals, 1);
        assert_eq!(zone.attributes.land_type, "Residential");
        assert_eq!(zone.attributes.landscape, "Desert");
        assert!(zone.attributes.public_transport_access);
        assert_eq!(zone.attributes.shopping_centers, 2);
        assert_eq!(zone.utilities, vec!["Water", "Electric"]);
        assert!(zone.buildings.is_empty());
    }

    #[test]
    fn test_reordered_header() {
        let mut header: Vec<&str> = HEADER.to_vec();
        let mut row = tempe_row();
        header.reverse();
        row.reverse();

        let zone = parse_zone(&Header::new(header), &row).unwrap();
        assert_eq!(zone.name, "Tempe");
        assert_eq!(zone.attributes.family_size, 4);
        assert_eq!(zone.attributes.shopping_centers, 2);
    }

    #[test]
    fn test_non_numeric_cell_names_field() {
        for (idx, column) in HEADER.iter().enumerate() {
            if !matches!(
                *column,
                "FamilySize" | "NumChildren" | "NearbyParks" | "NearbySchools"
                    | "NearbyHospitals" | "ShoppingCenters"
            ) {
                continue;
            }
            let mut row = tempe_row();
            row[idx] = "many";
            let err = parse_zone(&Header::new(HEADER), &row).unwrap_err();
            assert_eq!(err.field(), Some(*column));
            assert!(err.to_string().contains(column));
        }
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let header: Vec<&str> = HEADER.iter().copied().filter(|c| *c != "LandType").collect();
        let row: Vec<&str> = tempe_row()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| HEADER[*i] != "LandType")
            .map(|(_, v)| v)
            .collect();

        let err = parse_zone(&Header::new(header), &row).unwrap_err();
        assert!(matches!(err, ZoneError::MissingColumn { ref column } if column == "LandType"));
    }

    #[test]
    fn test_row_arity_mismatch() {
        let mut row = tempe_row();
        row.pop();
        let err = parse_zone(&Header::new(HEADER), &row).unwrap_err();
        assert!(matches!(err, ZoneError::RowArity { expected: 13, found: 12 }));
    }

    #[test]
    fn test_transport_flag_exact_match() {
        let header = Header::new(HEADER);
        let cases = [
            ("Yes", true),
            ("yes", false),
            ("YES", false),
            ("No", false),
            ("", false),
        ];
        for (cell, expected) in cases {
            let mut row = tempe_row();
            row[10] = cell;
            let zone = parse_zone(&header, &row).unwrap();
            assert_eq!(zone.attributes.public_transport_access, expected, "cell {:?}", cell);
        }
    }

    #[test]
    fn test_split_utilities() {
        assert_eq!(split_utilities("Water,Electric"), vec!["Water", "Electric"]);
        assert_eq!(split_utilities("Water, Electric ,Gas"), vec!["Water", "Electric", "Gas"]);
        assert_eq!(split_utilities("Electric"), vec!["Electric"]);
        assert!(split_utilities("").is_empty());
        assert!(split_utilities(" , ").is_empty());
    }

    #[test]
    fn test_optional_numeric_columns() {
        let mut header: Vec<&str> = HEADER.to_vec();
        header.push("CrimeRate");
        header.push("GreenCover");
        let mut row = tempe_row();
        row.push("12");
        row.push("35");

        let zone = parse_zone(&Header::new(&header), &row).unwrap();
        assert_eq!(zone.attributes.crime_rate, 12);
        assert_eq!(zone.attributes.green_cover, 35);
        assert_eq!(zone.attributes.air_quality_index, 0);

        row[14] = "lush";
        let err = parse_zone(&Header::new(&header), &row).unwrap_err();
        assert_eq!(err.field(), Some("GreenCover"));
    }

    #[test]
    fn test_missing_required() {
        let header = Header::new(["Zone", "Utilities"]);
        let missing = header.missing_required();
        assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 2);
        assert!(missing.contains(&"FamilySize"));
        assert!(Header::new(HEADER).missing_required().is_empty());
    }
}
