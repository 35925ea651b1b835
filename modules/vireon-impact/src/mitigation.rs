//! Mitigation search: find a nearby placement that scores better, or fall
//! back to shrinking the building.
//!
//! The search is an exhaustive ring grid around the current center. Every
//! candidate is scored by the same `ImpactModel::evaluate` as the baseline,
//! so a proposed move can never score worse than where the building already
//! is. The grid only runs when a layer bearing on the worst criterion is
//! loaded; otherwise the height fallback applies directly.

use serde::{Deserialize, Serialize};
use vireon_geo::{
    distance_m, meters_per_degree_lng, nearest_feature_centroid, GeoPoint, METERS_PER_DEGREE_LAT,
};

use crate::building::Placement;
use crate::criteria::{CriterionId, CriterionResult, ImpactResult};
use crate::layers::{CityLayers, LayerKind};
use crate::model::ImpactModel;

/// Grid and fallback parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationSearch {
    /// Ascending; smaller radii are tried first and win ties.
    pub radii_m: Vec<f64>,
    pub angle_step_deg: f64,
    pub height_reduction: f64,
    pub min_height_m: f64,
}

impl Default for MitigationSearch {
    fn default() -> Self {
        Self {
            radii_m: vec![100.0, 300.0, 500.0, 800.0],
            angle_step_deg: 30.0,
            height_reduction: 0.2,
            min_height_m: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationResult {
    pub description: String,
    /// The criterion that looked worst before mitigation.
    pub target: CriterionId,
    pub new_center: Option<GeoPoint>,
    pub new_height_m: Option<f64>,
    pub before_acceptance: u8,
    pub after_acceptance: u8,
    pub before: Vec<CriterionResult>,
    pub after: Vec<CriterionResult>,
}

struct Candidate {
    center: GeoPoint,
    impact: ImpactResult,
}

fn compass(bearing_deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["north", "north-east", "east", "south-east", "south", "south-west", "west", "north-west"];
    let idx = ((bearing_deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    POINTS[idx]
}

/// Offset `origin` by `radius_m` along a bearing measured clockwise from
/// north, on a flat local approximation.
fn offset(origin: GeoPoint, radius_m: f64, bearing_deg: f64) -> GeoPoint {
    let (sin, cos) = bearing_deg.to_radians().sin_cos();
    GeoPoint::new(
        origin.lng + radius_m * sin / meters_per_degree_lng(origin.lat),
        origin.lat + radius_m * cos / METERS_PER_DEGREE_LAT,
    )
}

/// Layers whose features drive a criterion.
fn driving_layers(target: CriterionId) -> &'static [LayerKind] {
    match target {
        CriterionId::EnvironmentalSensitivity => &[LayerKind::Parks, LayerKind::Waterways],
        CriterionId::InfrastructureStrain => &[LayerKind::MajorRoads],
        CriterionId::LivabilityProxy => &[LayerKind::Residential],
        CriterionId::EconomicBenefit | CriterionId::DeterministicAcceptance => &[],
    }
}

impl MitigationSearch {
    /// Candidate centers in search order: each radius in turn, then each
    /// angle clockwise from north.
    pub fn candidates(&self, origin: GeoPoint) -> Vec<GeoPoint> {
        let step = if self.angle_step_deg > 0.0 { self.angle_step_deg } else { 360.0 };
        let steps = (360.0 / step).round().max(1.0) as usize;
        self.radii_m
            .iter()
            .flat_map(|&r| (0..steps).map(move |i| offset(origin, r, i as f64 * step)))
            .collect()
    }

    /// Propose a mitigation for `placement`, whose current score is `impact`.
    ///
    /// Candidates are compared on public acceptance with a strict `>`, so
    /// ties keep the first candidate in [`Self::candidates`] order. Returns
    /// `None` only when `impact` has no criteria to target.
    pub fn propose(
        &self,
        model: &ImpactModel,
        placement: &Placement,
        impact: &ImpactResult,
        layers: &CityLayers,
    ) -> Option<MitigationResult> {
        let target = impact.worst_criterion()?.id;
        let baseline = impact.overall_acceptance;

        if !driving_layers(target).iter().any(|kind| layers.get(*kind).is_some()) {
            tracing::debug!(criterion = %target, "No layer drives the worst criterion, skipping site search");
            return Some(self.height_fallback(model, placement, impact, target, layers, false));
        }

        let mut best: Option<Candidate> = None;
        for center in self.candidates(placement.center) {
            let candidate = model.evaluate(&placement.with_center(center), layers);
            let better = match &best {
                Some(b) => candidate.overall_acceptance > b.impact.overall_acceptance,
                None => true,
            };
            if better {
                best = Some(Candidate {
                    center,
                    impact: candidate,
                });
            }
        }

        match best {
            Some(b) if b.impact.overall_acceptance > baseline => {
                Some(self.relocation(placement, impact, target, b, layers))
            }
            _ => Some(self.height_fallback(model, placement, impact, target, layers, true)),
        }
    }

    fn relocation(
        &self,
        placement: &Placement,
        impact: &ImpactResult,
        target: CriterionId,
        best: Candidate,
        layers: &CityLayers,
    ) -> MitigationResult {
        let moved_m = distance_m(placement.center, best.center);
        let east = (best.center.lng - placement.center.lng) * placement.center.lat.to_radians().cos();
        let bearing = east.atan2(best.center.lat - placement.center.lat).to_degrees();

        let mut description = format!(
            "Move the building {moved_m:.0} m {} to address {}: public acceptance rises from {} to {}.",
            compass(bearing),
            target.label().to_lowercase(),
            impact.overall_acceptance,
            best.impact.overall_acceptance,
        );

        for kind in driving_layers(target) {
            let Some(features) = layers.get(*kind) else {
                continue;
            };
            let before = nearest_feature_centroid(impact.centroid, features);
            let after = nearest_feature_centroid(best.impact.centroid, features);
            if let (Some(before), Some(after)) = (before, after) {
                description.push_str(&format!(
                    " Nearest {} goes from {:.0} m to {:.0} m.",
                    kind.feature_noun(),
                    before.distance_m,
                    after.distance_m
                ));
            }
        }

        tracing::info!(
            building = %placement.building.id,
            moved_m,
            before = impact.overall_acceptance,
            after = best.impact.overall_acceptance,
            "Proposing relocation"
        );

        MitigationResult {
            description,
            target,
            new_center: Some(best.center),
            new_height_m: None,
            before_acceptance: impact.overall_acceptance,
            after_acceptance: best.impact.overall_acceptance,
            before: impact.criteria.clone(),
            after: best.impact.criteria,
        }
    }

    fn height_fallback(
        &self,
        model: &ImpactModel,
        placement: &Placement,
        impact: &ImpactResult,
        target: CriterionId,
        layers: &CityLayers,
        searched: bool,
    ) -> MitigationResult {
        let current = placement.height_m;
        let reduced = (current * (1.0 - self.height_reduction)).max(self.min_height_m);
        let new_height = reduced.min(current);
        let after = model.evaluate(&placement.with_height(new_height), layers);

        let reason = if searched {
            format!(
                "No nearby site within {:.0} m scores better.",
                self.radii_m.iter().copied().fold(0.0, f64::max)
            )
        } else {
            format!("No mapped layer bears on {}.", target.label().to_lowercase())
        };
        let description = if new_height < current {
            format!(
                "{reason} Reduce height from {current:.1} m to {new_height:.1} m to address {}: public acceptance goes from {} to {}.",
                target.label().to_lowercase(),
                impact.overall_acceptance,
                after.overall_acceptance,
            )
        } else {
            format!(
                "{reason} The building is already at the {:.1} m minimum height.",
                self.min_height_m
            )
        };

        tracing::info!(
            building = %placement.building.id,
            from_m = current,
            to_m = new_height,
            "Proposing height reduction"
        );

        MitigationResult {
            description,
            target,
            new_center: None,
            new_height_m: Some(new_height),
            before_acceptance: impact.overall_acceptance,
            after_acceptance: after.overall_acceptance,
            before: impact.criteria.clone(),
            after: after.criteria,
        }
    }
}
