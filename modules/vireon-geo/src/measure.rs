//! Distance, containment and area measurements between a point and city
//! features.
//!
//! Projections here are local equirectangular approximations: longitude is
//! scaled by `cos(lat)` and then treated as Cartesian. That is accurate at
//! building and neighborhood scale (a few kilometers) and nowhere near it at
//! continental scale.

use crate::distance::{distance_m, meters_per_degree_lng, METERS_PER_DEGREE_LAT};
use crate::feature::{FeatureCollection, GeoPoint, Geometry, Polygon};

/// Distance from `p` to the closest location on segment `a`–`b`.
///
/// The projection parameter is found in a flat frame scaled by `cos(p.lat)`,
/// then the closest point is measured with the haversine distance.
pub fn point_to_segment_distance(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let k = p.lat.to_radians().cos();
    let (ax, ay) = ((a.lng - p.lng) * k, a.lat - p.lat);
    let (bx, by) = ((b.lng - p.lng) * k, b.lat - p.lat);
    let (dx, dy) = (bx - ax, by - ay);

    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return distance_m(p, a);
    }

    // p sits at the origin of the flat frame
    let t = (-(ax * dx + ay * dy) / len2).clamp(0.0, 1.0);
    let closest = GeoPoint::new(a.lng + t * (b.lng - a.lng), a.lat + t * (b.lat - a.lat));
    distance_m(p, closest)
}

/// Minimum distance from `p` to any segment of an open polyline.
pub fn point_to_line_distance(p: GeoPoint, line: &[GeoPoint]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => distance_m(p, *only),
        _ => line
            .windows(2)
            .map(|w| point_to_segment_distance(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Minimum distance from `p` to the edges of a ring. The ring is treated as
/// closed whether or not its last vertex repeats the first.
pub fn point_to_polygon_edge_distance(p: GeoPoint, ring: &[GeoPoint]) -> f64 {
    let open = point_to_line_distance(p, ring);
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 2 && first != last => {
            open.min(point_to_segment_distance(p, *last, *first))
        }
        _ => open,
    }
}

/// Ray-casting parity test.
///
/// Points lying exactly on an edge or vertex may land on either side; callers
/// that care about the boundary should also check the edge distance.
pub fn point_in_polygon(p: GeoPoint, ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.lat > p.lat) != (pj.lat > p.lat)
            && p.lng < (pj.lng - pi.lng) * (p.lat - pi.lat) / (pj.lat - pi.lat) + pi.lng
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Containment against a polygon with holes: inside the outer ring and
/// outside every hole.
fn point_in_polygon_with_holes(p: GeoPoint, polygon: &Polygon) -> bool {
    match polygon.split_first() {
        Some((outer, holes)) => {
            point_in_polygon(p, outer) && !holes.iter().any(|h| point_in_polygon(p, h))
        }
        None => false,
    }
}

/// Shoelace area in square meters on a flat projection anchored at the
/// ring's first vertex. Rings with fewer than 3 points have zero area.
pub fn polygon_area_m2(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let origin = ring[0];
    let kx = meters_per_degree_lng(origin.lat);
    let project = |q: &GeoPoint| ((q.lng - origin.lng) * kx, (q.lat - origin.lat) * METERS_PER_DEGREE_LAT);

    let mut twice_area = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        let (ax, ay) = project(a);
        let (bx, by) = project(b);
        twice_area += ax * by - bx * ay;
    }
    twice_area.abs() / 2.0
}

/// Vertex average of a ring.
///
/// This is not the area-weighted centroid: vertex clustering pulls it off
/// center. Good enough for compact building footprints and for directional
/// hints. A repeated closing vertex counts twice. An empty ring yields
/// `(0, 0)`.
pub fn polygon_centroid(ring: &[GeoPoint]) -> GeoPoint {
    if ring.is_empty() {
        return GeoPoint::new(0.0, 0.0);
    }
    let n = ring.len() as f64;
    let (sum_lng, sum_lat) = ring
        .iter()
        .fold((0.0, 0.0), |(x, y), q| (x + q.lng, y + q.lat));
    GeoPoint::new(sum_lng / n, sum_lat / n)
}

/// Distance from `p` to a single geometry: zero inside polygons, edge
/// distance otherwise. `None` for geometries with nothing to measure.
fn distance_to_geometry(p: GeoPoint, geometry: &Geometry) -> Option<f64> {
    match geometry {
        Geometry::Point(q) => Some(distance_m(p, *q)),
        Geometry::MultiPoint(qs) => min_of(qs.iter().map(|q| distance_m(p, *q))),
        Geometry::LineString(line) => min_of(std::iter::once(point_to_line_distance(p, line))),
        Geometry::MultiLineString(lines) => {
            min_of(lines.iter().map(|l| point_to_line_distance(p, l)))
        }
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {
            let polygons = geometry.polygons();
            if polygons.iter().any(|poly| point_in_polygon_with_holes(p, poly)) {
                return Some(0.0);
            }
            min_of(
                polygons
                    .iter()
                    .flatten()
                    .map(|ring| point_to_polygon_edge_distance(p, ring)),
            )
        }
        Geometry::Unsupported => None,
    }
}

fn min_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|d| d.is_finite()).reduce(f64::min)
}

/// Minimum distance from `p` to any feature in the collection.
///
/// Returns `Some(0.0)` as soon as `p` is found inside a polygon, and `None`
/// when the collection has no measurable geometry.
pub fn min_distance_to_features(p: GeoPoint, features: &FeatureCollection) -> Option<f64> {
    let mut best: Option<f64> = None;
    for geometry in features.geometries() {
        let Some(d) = distance_to_geometry(p, geometry) else {
            continue;
        };
        if d == 0.0 {
            return Some(0.0);
        }
        best = Some(best.map_or(d, |b| b.min(d)));
    }
    best
}

/// Whether `p` lies inside any polygon feature of the collection. Line and
/// point features never contain anything.
pub fn point_in_features(p: GeoPoint, features: &FeatureCollection) -> bool {
    features
        .geometries()
        .flat_map(Geometry::polygons)
        .any(|poly| point_in_polygon_with_holes(p, poly))
}

/// Closest feature by representative point, for directional hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestFeature {
    pub centroid: GeoPoint,
    pub distance_m: f64,
}

/// A representative point per geometry: ring centroid for polygons, the
/// middle vertex for lines, the point itself for points.
fn representative_point(geometry: &Geometry) -> Option<GeoPoint> {
    fn middle(line: &[GeoPoint]) -> Option<GeoPoint> {
        line.get(line.len() / 2).copied()
    }

    match geometry {
        Geometry::Point(q) => Some(*q),
        Geometry::MultiPoint(qs) => (!qs.is_empty()).then(|| polygon_centroid(qs)),
        Geometry::LineString(line) => middle(line),
        Geometry::MultiLineString(lines) => lines.first().and_then(|l| middle(l)),
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => geometry
            .polygons()
            .first()
            .and_then(|poly| poly.first())
            .filter(|ring| !ring.is_empty())
            .map(|ring| polygon_centroid(ring)),
        Geometry::Unsupported => None,
    }
}

/// The feature whose representative point is closest to `p`.
///
/// Measures centroid distance, not edge distance, so a large polygon right
/// next to `p` can lose to a small one further away.
pub fn nearest_feature_centroid(p: GeoPoint, features: &FeatureCollection) -> Option<NearestFeature> {
    features
        .geometries()
        .filter_map(representative_point)
        .map(|centroid| NearestFeature {
            centroid,
            distance_m: distance_m(p, centroid),
        })
        .fold(None, |best: Option<NearestFeature>, cand| match best {
            Some(b) if b.distance_m <= cand.distance_m => Some(b),
            _ => Some(cand),
        })
}
