//! Building footprints in local meters and their placement on the map.

use serde::{Deserialize, Serialize};

use crate::distance::{meters_per_degree_lng, METERS_PER_DEGREE_LAT};
use crate::feature::GeoPoint;

/// An `(x, y)` offset in meters from the footprint's local origin; `x` points
/// east, `y` points north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LocalOffset {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for LocalOffset {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<LocalOffset> for [f64; 2] {
    fn from(o: LocalOffset) -> Self {
        [o.x, o.y]
    }
}

/// A simple polygon in local meter offsets. Shared read-only by every
/// placement of the same building template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Footprint(Vec<LocalOffset>);

impl Footprint {
    pub fn new(points: Vec<LocalOffset>) -> Self {
        Self(points)
    }

    /// Axis-aligned `width × depth` rectangle centered on the origin.
    pub fn rectangle(width_m: f64, depth_m: f64) -> Self {
        let (hw, hd) = (width_m / 2.0, depth_m / 2.0);
        Self(vec![
            LocalOffset { x: -hw, y: -hd },
            LocalOffset { x: hw, y: -hd },
            LocalOffset { x: hw, y: hd },
            LocalOffset { x: -hw, y: hd },
        ])
    }

    pub fn points(&self) -> &[LocalOffset] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Place a local footprint on the map at `center`, rotated clockwise by
/// `rotation_deg` about that center.
///
/// The rotation is applied to longitude/latitude directly, as if they were
/// Cartesian; building-sized shapes do not notice. A rotation of exactly 0
/// skips the trigonometry so the output is the plain translation.
pub fn transformed_footprint(
    footprint: &Footprint,
    center: GeoPoint,
    rotation_deg: f64,
) -> Vec<GeoPoint> {
    let kx = meters_per_degree_lng(center.lat);
    let translated = footprint.points().iter().map(|o| {
        GeoPoint::new(center.lng + o.x / kx, center.lat + o.y / METERS_PER_DEGREE_LAT)
    });

    if rotation_deg == 0.0 {
        return translated.collect();
    }

    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    translated
        .map(|p| {
            let (dx, dy) = (p.lng - center.lng, p.lat - center.lat);
            GeoPoint::new(
                center.lng + dx * cos + dy * sin,
                center.lat - dx * sin + dy * cos,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::distance_m;
    use crate::measure::{polygon_area_m2, polygon_centroid};

    const CENTER: GeoPoint = GeoPoint::new(-76.4951, 44.2253);

    #[test]
    fn zero_rotation_is_plain_translation() {
        let fp = Footprint::rectangle(50.0, 30.0);
        let placed = transformed_footprint(&fp, CENTER, 0.0);
        let kx = meters_per_degree_lng(CENTER.lat);
        for (o, p) in fp.points().iter().zip(&placed) {
            assert_eq!(p.lng, CENTER.lng + o.x / kx);
            assert_eq!(p.lat, CENTER.lat + o.y / METERS_PER_DEGREE_LAT);
        }
    }

    #[test]
    fn full_turn_matches_no_rotation() {
        let fp = Footprint::rectangle(50.0, 30.0);
        let base = transformed_footprint(&fp, CENTER, 0.0);
        let turned = transformed_footprint(&fp, CENTER, 360.0);
        for (a, b) in base.iter().zip(&turned) {
            assert!((a.lng - b.lng).abs() < 1e-12);
            assert!((a.lat - b.lat).abs() < 1e-12);
        }
    }

    #[test]
    fn quarter_turn_is_clockwise() {
        // A point due north of the center ends up due east after 90° clockwise.
        let fp = Footprint::new(vec![LocalOffset { x: 0.0, y: 100.0 }]);
        let p = transformed_footprint(&fp, CENTER, 90.0)[0];
        assert!(p.lng > CENTER.lng);
        assert!((p.lat - CENTER.lat).abs() < 1e-12);
    }

    #[test]
    fn rectangle_area_and_centroid_survive_placement() {
        let fp = Footprint::rectangle(50.0, 30.0);
        let placed = transformed_footprint(&fp, CENTER, 0.0);
        let area = polygon_area_m2(&placed);
        assert!((area - 1500.0).abs() < 1.0, "got {area}");
        assert!(distance_m(polygon_centroid(&placed), CENTER) < 0.01);
    }

    #[test]
    fn footprint_deserializes_from_pairs() {
        let fp: Footprint = serde_json::from_str("[[-25,-15],[25,-15],[25,15],[-25,15]]").unwrap();
        assert_eq!(fp, Footprint::rectangle(50.0, 30.0));
    }
}
