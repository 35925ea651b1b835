//! Tunable constants of the scoring model.

use serde::{Deserialize, Serialize};
use vireon_geo::GeoPoint;

/// A named place whose proximity raises economic benefit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCenter {
    pub name: String,
    pub location: GeoPoint,
}

impl ActivityCenter {
    pub fn new(name: impl Into<String>, lng: f64, lat: f64) -> Self {
        Self {
            name: name.into(),
            location: GeoPoint::new(lng, lat),
        }
    }
}

/// Every coefficient the five criteria use.
///
/// `Default` is the calibrated model. The economic floor deliberately biases
/// economic benefit upward: a building is presumed to bring some benefit
/// before any proximity or intensity is counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactModel {
    // Distances assumed when a layer is absent or empty
    pub default_park_distance_m: f64,
    pub default_water_distance_m: f64,
    pub default_road_distance_m: f64,
    pub default_residential_distance_m: f64,

    // Environmental sensitivity
    pub park_coefficient: f64,
    pub water_coefficient: f64,
    /// Added to distances before inverting so that zero distance stays finite.
    pub distance_softening_m: f64,
    pub overlap_weight: f64,

    // Intensity, shared by infrastructure strain and economic benefit
    pub intensity_reference_m3: f64,

    // Infrastructure strain
    pub road_distance_cap_m: f64,
    pub infrastructure_scale: f64,

    // Livability
    pub livability_coefficient: f64,

    // Economic benefit
    pub economic_floor: f64,
    pub economic_span: f64,
    /// Share of the span earned by intensity alone, with no nearby centers.
    pub proximity_base: f64,
    pub proximity_decay_m: f64,
    pub activity_centers: Vec<ActivityCenter>,

    // Public acceptance
    pub acceptance_economic_weight: f64,
    pub acceptance_environment_weight: f64,
    pub acceptance_infrastructure_weight: f64,
    pub acceptance_livability_weight: f64,
    pub acceptance_offset: f64,

    // Cost
    pub cost_per_m2: f64,
    /// Converts volume into gross floor area for costing.
    pub storey_height_m: f64,
}

impl Default for ImpactModel {
    fn default() -> Self {
        Self {
            default_park_distance_m: 9999.0,
            default_water_distance_m: 9999.0,
            default_road_distance_m: 400.0,
            default_residential_distance_m: 500.0,

            park_coefficient: 1500.0,
            water_coefficient: 1000.0,
            distance_softening_m: 10.0,
            overlap_weight: 40.0,

            intensity_reference_m3: 200_000.0,

            road_distance_cap_m: 800.0,
            infrastructure_scale: 50.0,

            livability_coefficient: 200.0,

            economic_floor: 35.0,
            economic_span: 65.0,
            proximity_base: 0.4,
            proximity_decay_m: 1500.0,
            activity_centers: vec![
                ActivityCenter::new("Downtown core", -76.4810, 44.2312),
                ActivityCenter::new("Queen's University", -76.4951, 44.2253),
                ActivityCenter::new("Cataraqui Centre", -76.5556, 44.2570),
            ],

            acceptance_economic_weight: 0.6,
            acceptance_environment_weight: 0.35,
            acceptance_infrastructure_weight: 0.15,
            acceptance_livability_weight: 0.3,
            acceptance_offset: 15.0,

            cost_per_m2: 3200.0,
            storey_height_m: 3.5,
        }
    }
}
