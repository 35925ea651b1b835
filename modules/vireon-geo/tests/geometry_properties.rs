//! Properties the scoring engine relies on, checked over a spread of inputs.

use vireon_geo::{
    distance_m, point_in_polygon, polygon_centroid, transformed_footprint, Footprint, GeoPoint,
    LocalOffset,
};

fn sample_points() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(-76.4810, 44.2312),
        GeoPoint::new(-76.5556, 44.2570),
        GeoPoint::new(-93.2650, 44.9778),
        GeoPoint::new(8.6567, 50.6214),
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(179.9, -45.0),
    ]
}

#[test]
fn distance_is_zero_to_self_and_symmetric() {
    let points = sample_points();
    for a in &points {
        assert_eq!(distance_m(*a, *a), 0.0);
        for b in &points {
            assert!((distance_m(*a, *b) - distance_m(*b, *a)).abs() < 1e-6);
            if a != b {
                assert!(distance_m(*a, *b) > 0.0);
            }
        }
    }
}

#[test]
fn centroid_of_placed_convex_footprints_is_inside() {
    let hexagon = Footprint::new(
        (0..6)
            .map(|i| {
                let theta = (i as f64) * std::f64::consts::PI / 3.0;
                LocalOffset {
                    x: 40.0 * theta.cos(),
                    y: 25.0 * theta.sin(),
                }
            })
            .collect(),
    );
    let footprints = [Footprint::rectangle(50.0, 30.0), Footprint::rectangle(12.0, 80.0), hexagon];

    for center in sample_points().into_iter().filter(|p| p.lat.abs() < 60.0) {
        for fp in &footprints {
            for rotation in [0.0, 17.0, 45.0, 90.0, 233.0] {
                let ring = transformed_footprint(fp, center, rotation);
                assert!(
                    point_in_polygon(polygon_centroid(&ring), &ring),
                    "centroid outside at {center:?} rotated {rotation}"
                );
            }
        }
    }
}

#[test]
fn rotation_by_multiples_of_full_turn_is_identity() {
    let fp = Footprint::rectangle(50.0, 30.0);
    let center = GeoPoint::new(-76.4951, 44.2253);
    let base = transformed_footprint(&fp, center, 0.0);
    for turns in [360.0, 720.0, -360.0] {
        for (a, b) in base.iter().zip(transformed_footprint(&fp, center, turns)) {
            assert!((a.lng - b.lng).abs() < 1e-11 && (a.lat - b.lat).abs() < 1e-11);
        }
    }
}
