//! Zone model types.

use serde::{Deserialize, Serialize};

use crate::property::PropertyMap;

/// Descriptive attributes of a zone, written onto the Zone node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAttributes {
    pub family_size: i64,
    pub marital_status: String,
    pub num_children: i64,
    pub age_group: String,
    pub nearby_parks: i64,
    pub nearby_schools: i64,
    pub nearby_hospitals: i64,
    pub land_type: String,
    pub landscape: String,
    pub public_transport_access: bool,
    pub shopping_centers: i64,
    pub fitness_centers: i64,
    pub child_care_services: i64,
    pub avg_housing_cost: i64,
    pub crime_rate: i64,
    pub rental_availability: i64,
    pub avg_size_per_home: i64,
    pub air_quality_index: i64,
    pub green_cover: i64,
    pub noise_pollution_level: i64,
}

impl ZoneAttributes {
    /// Flatten into node properties, named after the source columns.
    pub fn to_properties(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert("FamilySize".into(), self.family_size.into());
        props.insert("MaritalStatus".into(), self.marital_status.as_str().into());
        props.insert("NumChildren".into(), self.num_children.into());
        props.insert("AgeGroup".into(), self.age_group.as_str().into());
        props.insert("NearbyParks".into(), self.nearby_parks.into());
        props.insert("NearbySchools".into(), self.nearby_schools.into());
        props.insert("NearbyHospitals".into(), self.nearby_hospitals.into());
        props.insert("LandType".into(), self.land_type.as_str().into());
        props.insert("Landscape".into(), self.landscape.as_str().into());
        props.insert(
            "PublicTransportAccess".into(),
            self.public_transport_access.into(),
        );
        props.insert("ShoppingCenters".into(), self.shopping_centers.into());
        props.insert("FitnessCenters".into(), self.fitness_centers.into());
        props.insert("ChildCareServices".into(), self.child_care_services.into());
        props.insert("AvgHousingCost".into(), self.avg_housing_cost.into());
        props.insert("CrimeRate".into(), self.crime_rate.into());
        props.insert("RentalAvailability".into(), self.rental_availability.into());
        props.insert("AvgSizePerHome".into(), self.avg_size_per_home.into());
        props.insert("AirQualityIndex".into(), self.air_quality_index.into());
        props.insert("GreenCover".into(), self.green_cover.into());
        props.insert("NoisePollutionLevel".into(), self.noise_pollution_level.into());
        props
    }
}

/// A named zone with its attributes and derived collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub attributes: ZoneAttributes,
    /// Utility names serving this zone, in source order.
    pub utilities: Vec<String>,
    /// Buildings owned by this zone. Filled by a [`BuildingSource`](super::BuildingSource).
    pub buildings: Vec<String>,
}

impl Zone {
    pub fn new(name: impl Into<String>, attributes: ZoneAttributes) -> Self {
        Self {
            name: name.into(),
            attributes,
            utilities: Vec::new(),
            buildings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;

    #[test]
    fn test_properties_cover_every_attribute() {
        let attrs = ZoneAttributes {
            family_size: 4,
            marital_status: "Married".to_string(),
            public_transport_access: true,
            noise_pollution_level: 7,
            ..Default::default()
        };
        let props = attrs.to_properties();
        assert_eq!(props.len(), 20);
        assert_eq!(props["FamilySize"], PropertyValue::Int(4));
        assert_eq!(props["MaritalStatus"], PropertyValue::Str("Married".to_string()));
        assert_eq!(props["PublicTransportAccess"], PropertyValue::Bool(true));
        assert_eq!(props["NoisePollutionLevel"], PropertyValue::Int(7));
        assert_eq!(props["GreenCover"], PropertyValue::Int(0));
    }
}
