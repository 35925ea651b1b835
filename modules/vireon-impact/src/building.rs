use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vireon_geo::{transformed_footprint, Footprint, GeoPoint};

/// A placeable building: its local footprint plus descriptive metadata that
/// is forwarded to the stakeholder simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub footprint: Footprint,
    pub default_height_m: f64,
    /// Explicit cost in dollars; zero or negative means "estimate it".
    #[serde(default)]
    pub cost_estimate: f64,
}

/// One building placed on the map.
///
/// The geographic footprint is always derived from the template, center and
/// rotation, never stored, so it cannot go stale when the placement moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub building: Arc<BuildingTemplate>,
    pub center: GeoPoint,
    /// Degrees clockwise.
    pub rotation_deg: f64,
    pub height_m: f64,
}

impl Placement {
    /// Place a template at its default height with no rotation.
    pub fn new(building: Arc<BuildingTemplate>, center: GeoPoint) -> Self {
        let height_m = building.default_height_m;
        Self {
            building,
            center,
            rotation_deg: 0.0,
            height_m,
        }
    }

    pub fn with_center(&self, center: GeoPoint) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }

    pub fn with_height(&self, height_m: f64) -> Self {
        Self {
            height_m,
            ..self.clone()
        }
    }

    pub fn with_rotation(&self, rotation_deg: f64) -> Self {
        Self {
            rotation_deg,
            ..self.clone()
        }
    }

    /// The footprint ring in geographic coordinates.
    pub fn footprint(&self) -> Vec<GeoPoint> {
        transformed_footprint(&self.building.footprint, self.center, self.rotation_deg)
    }
}
