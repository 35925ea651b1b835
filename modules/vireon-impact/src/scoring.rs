//! The five-criterion impact score.
//!
//! Each criterion is a closed-form function of the footprint centroid, area,
//! height and distances to city layers. Intermediate math is unrounded
//! floating point; each criterion rounds and clamps to `0..=100` as its last
//! step. Public acceptance combines the unrounded (clamped) values of the
//! other four, which keeps it monotone in its inputs.

use vireon_geo::{
    distance_m, min_distance_to_features, point_in_features, polygon_area_m2, polygon_centroid,
    GeoPoint,
};

use crate::building::Placement;
use crate::criteria::{CriterionId, CriterionResult, Driver, Effect, ImpactResult};
use crate::layers::{CityLayers, LayerKind};
use crate::model::ImpactModel;

const TOP_DRIVER_COUNT: usize = 3;
const ACCEPTANCE_DRIVER_COUNT: usize = 2;

/// A criterion result plus the clamped value before rounding.
struct Scored {
    value: f64,
    result: CriterionResult,
}

fn scored(id: CriterionId, raw: f64, drivers: Vec<Driver>) -> Scored {
    let value = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) };
    Scored {
        value,
        result: CriterionResult::new(id, value.round() as u8, drivers),
    }
}

/// Distance to the nearest feature of a layer, or the model's assumed
/// distance when the layer has no data.
struct LayerDistance {
    meters: f64,
    measured: bool,
}

fn proximity_band(meters: f64, moderate_below_m: f64, far_word: &str) -> String {
    if meters < 100.0 {
        "very close".to_string()
    } else if meters < moderate_below_m {
        "moderate".to_string()
    } else {
        far_word.to_string()
    }
}

fn distance_description(kind: LayerKind, d: &LayerDistance, band: Option<String>) -> String {
    let noun = kind.feature_noun();
    match (d.measured, band) {
        (false, _) => format!("No {noun} data; assuming {:.0} m", d.meters),
        (true, Some(band)) => format!("Nearest {noun} is {band} ({:.0} m)", d.meters),
        (true, None) => format!("Nearest {noun} is {:.0} m away", d.meters),
    }
}

impl ImpactModel {
    /// Score one placement. Pure: the same inputs always give the same result.
    pub fn evaluate(&self, placement: &Placement, layers: &CityLayers) -> ImpactResult {
        let ring = placement.footprint();
        let centroid = polygon_centroid(&ring);
        let area = polygon_area_m2(&ring);
        let height = placement.height_m.max(0.0);
        let volume = area * height;
        let intensity = self.intensity(volume);

        let environment = self.environmental_sensitivity(&ring, centroid, area, layers);
        let infrastructure = self.infrastructure_strain(centroid, intensity, volume, layers);
        let livability = self.livability(centroid, height, layers);
        let economic = self.economic_benefit(centroid, intensity);
        let acceptance = self.public_acceptance(&environment, &infrastructure, &livability, &economic);

        let criteria: Vec<CriterionResult> = [environment, infrastructure, livability, economic, acceptance]
            .into_iter()
            .map(|s| s.result)
            .collect();
        let overall_acceptance = criteria[4].score;
        let top_drivers = top_drivers(&criteria, TOP_DRIVER_COUNT);

        let cost_estimate = if placement.building.cost_estimate > 0.0 {
            placement.building.cost_estimate
        } else {
            volume * self.cost_per_m2 / self.storey_height_m
        };

        tracing::debug!(
            building = %placement.building.id,
            acceptance = overall_acceptance,
            area_m2 = area,
            height_m = height,
            "Scored placement"
        );

        ImpactResult {
            criteria,
            overall_acceptance,
            top_drivers,
            cost_estimate,
            gross_volume_m3: volume,
            footprint_area_m2: area,
            centroid,
        }
    }

    /// Building volume relative to the reference volume, capped at 1.
    pub fn intensity(&self, volume_m3: f64) -> f64 {
        if self.intensity_reference_m3 <= 0.0 {
            return 0.0;
        }
        (volume_m3 / self.intensity_reference_m3).clamp(0.0, 1.0)
    }

    /// Mean exponential decay of distance to the activity centers, in `0..=1`.
    pub fn center_proximity(&self, p: GeoPoint) -> f64 {
        if self.activity_centers.is_empty() || self.proximity_decay_m <= 0.0 {
            return 0.0;
        }
        let total: f64 = self
            .activity_centers
            .iter()
            .map(|c| (-distance_m(p, c.location) / self.proximity_decay_m).exp())
            .sum();
        total / self.activity_centers.len() as f64
    }

    fn layer_distance(&self, p: GeoPoint, layers: &CityLayers, kind: LayerKind) -> LayerDistance {
        let measured = layers
            .get(kind)
            .and_then(|features| min_distance_to_features(p, features));
        match measured {
            Some(meters) => LayerDistance { meters, measured: true },
            None => LayerDistance {
                meters: match kind {
                    LayerKind::Parks => self.default_park_distance_m,
                    LayerKind::Waterways => self.default_water_distance_m,
                    LayerKind::MajorRoads => self.default_road_distance_m,
                    LayerKind::Residential => self.default_residential_distance_m,
                },
                measured: false,
            },
        }
    }

    /// Share of footprint sample points (vertices and centroid) that fall
    /// inside a park or waterway polygon.
    fn sensitive_overlap_fraction(&self, ring: &[GeoPoint], centroid: GeoPoint, layers: &CityLayers) -> f64 {
        let samples: Vec<GeoPoint> = ring.iter().copied().chain(std::iter::once(centroid)).collect();
        let inside = samples
            .iter()
            .filter(|p| layers.sensitive().any(|fc| point_in_features(**p, fc)))
            .count();
        inside as f64 / samples.len() as f64
    }

    fn environmental_sensitivity(
        &self,
        ring: &[GeoPoint],
        centroid: GeoPoint,
        area: f64,
        layers: &CityLayers,
    ) -> Scored {
        let park = self.layer_distance(centroid, layers, LayerKind::Parks);
        let water = self.layer_distance(centroid, layers, LayerKind::Waterways);
        let overlap = self.sensitive_overlap_fraction(ring, centroid, layers);

        let raw = self.park_coefficient / (park.meters + self.distance_softening_m)
            + self.water_coefficient / (water.meters + self.distance_softening_m)
            + self.overlap_weight * overlap;

        let drivers = vec![
            Driver::new(
                "d_to_park_m",
                "Distance to nearest park/green",
                park.meters,
                "m",
                distance_description(LayerKind::Parks, &park, Some(proximity_band(park.meters, 300.0, "distant"))),
            ),
            Driver::new(
                "d_to_water_m",
                "Distance to nearest waterway",
                water.meters,
                "m",
                distance_description(LayerKind::Waterways, &water, Some(proximity_band(water.meters, 500.0, "far"))),
            ),
            Driver::new(
                "overlap_sensitive_m2",
                "Footprint overlapping sensitive areas",
                overlap * area,
                "m²",
                format!("{:.0}% of the footprint sits inside parks or waterways", overlap * 100.0),
            ),
        ];

        scored(CriterionId::EnvironmentalSensitivity, raw, drivers)
    }

    fn infrastructure_strain(&self, centroid: GeoPoint, intensity: f64, volume: f64, layers: &CityLayers) -> Scored {
        let road = self.layer_distance(centroid, layers, LayerKind::MajorRoads);
        let cap = self.road_distance_cap_m.max(1.0);
        let road_penalty = 1.0 + road.meters.min(cap) / cap;
        let raw = self.infrastructure_scale * intensity * road_penalty;

        let drivers = vec![
            Driver::new(
                "intensity",
                "Building intensity",
                intensity,
                "ratio",
                format!(
                    "{volume:.0} m³ against a {:.0} m³ reference volume",
                    self.intensity_reference_m3
                ),
            ),
            Driver::new(
                "d_to_major_road_m",
                "Distance to nearest major road",
                road.meters,
                "m",
                distance_description(LayerKind::MajorRoads, &road, None),
            ),
        ];

        scored(CriterionId::InfrastructureStrain, raw, drivers)
    }

    fn livability(&self, centroid: GeoPoint, height: f64, layers: &CityLayers) -> Scored {
        let residential = self.layer_distance(centroid, layers, LayerKind::Residential);
        let raw = self.livability_coefficient * height / residential.meters.max(1.0);

        let drivers = vec![
            Driver::new(
                "d_to_residential_m",
                "Distance to nearest residential zone",
                residential.meters,
                "m",
                distance_description(LayerKind::Residential, &residential, None),
            ),
            Driver::new(
                "height_m",
                "Building height",
                height,
                "m",
                format!("{height:.1} m tall"),
            ),
        ];

        scored(CriterionId::LivabilityProxy, raw, drivers)
    }

    fn economic_benefit(&self, centroid: GeoPoint, intensity: f64) -> Scored {
        let proximity = self.center_proximity(centroid);
        let reach = self.proximity_base + (1.0 - self.proximity_base) * proximity;
        let raw = self.economic_floor + self.economic_span * intensity * reach;

        let mut drivers = vec![Driver::new(
            "center_proximity_score",
            "Proximity to activity centers",
            proximity,
            "ratio",
            format!(
                "Mean decay over {} activity centers ({:.0} m scale)",
                self.activity_centers.len(),
                self.proximity_decay_m
            ),
        )];

        let nearest = self
            .activity_centers
            .iter()
            .map(|c| (c, distance_m(centroid, c.location)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((center, meters)) = nearest {
            drivers.push(Driver::new(
                "d_to_activity_center_m",
                "Distance to nearest activity center",
                meters,
                "m",
                format!("{} is {meters:.0} m away", center.name),
            ));
        }

        scored(CriterionId::EconomicBenefit, raw, drivers)
    }

    fn public_acceptance(
        &self,
        environment: &Scored,
        infrastructure: &Scored,
        livability: &Scored,
        economic: &Scored,
    ) -> Scored {
        let contributions = [
            (economic, self.acceptance_economic_weight, Effect::Positive),
            (environment, -self.acceptance_environment_weight, Effect::Negative),
            (infrastructure, -self.acceptance_infrastructure_weight, Effect::Negative),
            (livability, -self.acceptance_livability_weight, Effect::Negative),
        ];

        let raw = 50.0 - self.acceptance_offset
            + contributions
                .iter()
                .map(|(s, weight, _)| weight * s.value)
                .sum::<f64>();

        let mut drivers: Vec<Driver> = contributions
            .iter()
            .map(|(s, weight, effect)| {
                let id = s.result.id;
                Driver::new(
                    format!("{}_contribution", id.as_str()),
                    format!("{} (weighted)", id.label()),
                    weight * s.value,
                    "points",
                    format!("{:.0} × {:.2}", s.value, weight.abs()),
                )
                .with_effect(*effect)
            })
            .collect();
        drivers.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
        drivers.truncate(ACCEPTANCE_DRIVER_COUNT);

        scored(CriterionId::DeterministicAcceptance, raw, drivers)
    }
}

/// Largest-magnitude drivers across all criteria, ignoring zero and
/// non-finite values. Ties keep criterion order.
fn top_drivers(criteria: &[CriterionResult], n: usize) -> Vec<Driver> {
    let mut pool: Vec<Driver> = criteria
        .iter()
        .flat_map(|c| c.drivers.iter())
        .filter(|d| d.value != 0.0 && d.value.is_finite())
        .cloned()
        .collect();
    pool.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    pool.truncate(n);
    pool
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vireon_geo::{Feature, FeatureCollection, Footprint, Geometry, METERS_PER_DEGREE_LAT};

    use super::*;
    use crate::building::BuildingTemplate;

    const SITE: GeoPoint = GeoPoint::new(-76.5200, 44.2400);

    fn template(width: f64, depth: f64, height: f64) -> Arc<BuildingTemplate> {
        Arc::new(BuildingTemplate {
            id: "block".to_string(),
            name: "Mid-rise block".to_string(),
            kind: "residential".to_string(),
            description: String::new(),
            footprint: Footprint::rectangle(width, depth),
            default_height_m: height,
            cost_estimate: 0.0,
        })
    }

    fn north_of(p: GeoPoint, meters: f64) -> GeoPoint {
        GeoPoint::new(p.lng, p.lat + meters / METERS_PER_DEGREE_LAT)
    }

    fn point_layer(p: GeoPoint) -> FeatureCollection {
        FeatureCollection::new(vec![Feature::new(Geometry::Point(p))])
    }

    #[test]
    fn no_layers_still_scores_every_criterion() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(50.0, 30.0, 14.0), SITE);
        let result = model.evaluate(&placement, &CityLayers::default());

        assert_eq!(result.criteria.len(), 5);
        for c in &result.criteria {
            assert!(c.score <= 100, "{} out of range", c.id);
        }
        assert_eq!(result.driver("d_to_major_road_m").unwrap().value, model.default_road_distance_m);
        assert!(result.driver("d_to_park_m").unwrap().description.starts_with("No park data"));
    }

    #[test]
    fn acceptance_copies_fifth_criterion() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(50.0, 30.0, 14.0), SITE);
        let result = model.evaluate(&placement, &CityLayers::default());
        assert_eq!(result.overall_acceptance, result.criteria[4].score);
        assert_eq!(result.criteria[4].id, CriterionId::DeterministicAcceptance);
    }

    #[test]
    fn acceptance_keeps_two_signed_drivers() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(50.0, 30.0, 14.0), SITE);
        let result = model.evaluate(&placement, &CityLayers::default());
        let drivers = &result.criterion(CriterionId::DeterministicAcceptance).unwrap().drivers;

        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].key, "economic_benefit_contribution");
        assert_eq!(drivers[0].effect, Some(Effect::Positive));
        assert!(drivers[0].value.abs() >= drivers[1].value.abs());
    }

    #[test]
    fn explicit_cost_wins_over_estimate() {
        let model = ImpactModel::default();
        let mut t = (*template(50.0, 30.0, 14.0)).clone();
        let estimated = model.evaluate(&Placement::new(Arc::new(t.clone()), SITE), &CityLayers::default());
        t.cost_estimate = 12_500_000.0;
        let explicit = model.evaluate(&Placement::new(Arc::new(t), SITE), &CityLayers::default());

        assert_eq!(explicit.cost_estimate, 12_500_000.0);
        let expected = estimated.gross_volume_m3 * model.cost_per_m2 / model.storey_height_m;
        assert!((estimated.cost_estimate - expected).abs() < 1e-6);
    }

    #[test]
    fn gross_volume_is_area_times_height() {
        let model = ImpactModel::default();
        let result = model.evaluate(&Placement::new(template(50.0, 30.0, 14.0), SITE), &CityLayers::default());
        assert!((result.footprint_area_m2 - 1500.0).abs() < 1.0);
        assert!((result.gross_volume_m3 - result.footprint_area_m2 * 14.0).abs() < 1e-9);
    }

    #[test]
    fn road_distance_is_capped() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(50.0, 30.0, 14.0), SITE);
        let at = |meters: f64| {
            let layers = CityLayers::default().with(LayerKind::MajorRoads, point_layer(north_of(SITE, meters)));
            model.evaluate(&placement, &layers).score(CriterionId::InfrastructureStrain)
        };
        assert_eq!(at(1_000.0), at(3_000.0));
        assert!(at(50.0) < at(1_000.0));
    }

    #[test]
    fn close_residential_hurts_livability() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(20.0, 20.0, 40.0), SITE);
        let layers = CityLayers::default().with(LayerKind::Residential, point_layer(north_of(SITE, 40.0)));
        let result = model.evaluate(&placement, &layers);
        assert_eq!(result.score(CriterionId::LivabilityProxy), Some(100));
    }

    #[test]
    fn water_bands_describe_distance() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(20.0, 20.0, 10.0), SITE);
        let describe = |meters: f64| {
            let layers = CityLayers::default().with(LayerKind::Waterways, point_layer(north_of(SITE, meters)));
            model.evaluate(&placement, &layers).driver("d_to_water_m").unwrap().description.clone()
        };
        assert!(describe(60.0).contains("very close"));
        assert!(describe(400.0).contains("moderate"));
        assert!(describe(900.0).contains("far"));
    }

    #[test]
    fn top_drivers_skip_zero_and_sort_by_magnitude() {
        let model = ImpactModel::default();
        let placement = Placement::new(template(50.0, 30.0, 14.0), SITE);
        let result = model.evaluate(&placement, &CityLayers::default());

        assert_eq!(result.top_drivers.len(), 3);
        assert!(result.top_drivers.iter().all(|d| d.value != 0.0 && d.value.is_finite()));
        for pair in result.top_drivers.windows(2) {
            assert!(pair[0].value.abs() >= pair[1].value.abs());
        }
        // Assumed 9999 m park and water distances dominate with no data.
        assert_eq!(result.top_drivers[0].key, "d_to_park_m");
    }

    #[test]
    fn intensity_is_capped() {
        let model = ImpactModel::default();
        assert_eq!(model.intensity(model.intensity_reference_m3 * 4.0), 1.0);
        assert_eq!(model.intensity(0.0), 0.0);
    }
}
