//! Building a job request from a scored placement.

use vireon_impact::{CriterionId, ImpactResult, Placement};

use crate::types::{
    BuildingPayload, ImpactDrivers, ImpactFlags, ImpactPayload, ImpactScores, SimulateRequest,
};

/// Park or waterway closer than this marks the site as sensitive.
pub const NEAR_SENSITIVE_M: f64 = 150.0;
pub const NEAR_RESIDENTIAL_M: f64 = 200.0;
pub const NEAR_MAJOR_ROAD_M: f64 = 150.0;

impl ImpactFlags {
    pub fn from_drivers(drivers: &ImpactDrivers) -> Self {
        Self {
            near_sensitive_zone: drivers.d_to_park_m.min(drivers.d_to_water_m) < NEAR_SENSITIVE_M
                || drivers.overlap_sensitive_m2 > 0.0,
            near_residential: drivers.d_to_residential_m < NEAR_RESIDENTIAL_M,
            near_major_road: drivers.d_to_major_road_m < NEAR_MAJOR_ROAD_M,
        }
    }
}

impl ImpactPayload {
    pub fn from_impact(impact: &ImpactResult) -> Self {
        let score = |id| impact.score(id).map(f64::from).unwrap_or_default();
        let scores = ImpactScores {
            environmental_sensitivity: score(CriterionId::EnvironmentalSensitivity),
            infrastructure_strain: score(CriterionId::InfrastructureStrain),
            livability_proxy: score(CriterionId::LivabilityProxy),
            economic_benefit: score(CriterionId::EconomicBenefit),
            deterministic_acceptance: score(CriterionId::DeterministicAcceptance),
        };

        let fallback = ImpactDrivers::default();
        let driver = |key: &str, default: f64| impact.driver(key).map_or(default, |d| d.value);
        let drivers = ImpactDrivers {
            d_to_park_m: driver("d_to_park_m", fallback.d_to_park_m),
            d_to_water_m: driver("d_to_water_m", fallback.d_to_water_m),
            overlap_sensitive_m2: driver("overlap_sensitive_m2", fallback.overlap_sensitive_m2),
            d_to_major_road_m: driver("d_to_major_road_m", fallback.d_to_major_road_m),
            d_to_residential_m: driver("d_to_residential_m", fallback.d_to_residential_m),
            intensity: driver("intensity", fallback.intensity),
            center_proximity_score: driver("center_proximity_score", fallback.center_proximity_score),
        };

        Self {
            flags: ImpactFlags::from_drivers(&drivers),
            scores,
            drivers,
        }
    }
}

impl SimulateRequest {
    pub fn from_impact(model_id: &str, placement: &Placement, impact: &ImpactResult) -> Self {
        let building = &placement.building;
        Self {
            model_id: model_id.to_string(),
            building: BuildingPayload {
                id: building.id.clone(),
                name: building.name.clone(),
                kind: building.kind.clone(),
                description: building.description.clone(),
                height_m: placement.height_m,
                cost_estimate: impact.cost_estimate,
            },
            impacts: ImpactPayload::from_impact(impact),
        }
    }
}
