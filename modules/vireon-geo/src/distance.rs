use std::f64::consts::PI;

use crate::feature::GeoPoint;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Approximate length of one degree of latitude. Longitude degrees shrink by
/// `cos(lat)` on top of this.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Haversine great-circle distance in meters. Symmetric; zero only for
/// identical points.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let to_rad = |deg: f64| deg * PI / 180.0;

    let dlat = to_rad(b.lat - a.lat);
    let dlng = to_rad(b.lng - a.lng);

    let h = (dlat / 2.0).sin().powi(2)
        + to_rad(a.lat).cos() * to_rad(b.lat).cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_METERS * c
}

/// Meters per degree of longitude at the given latitude.
pub fn meters_per_degree_lng(lat: f64) -> f64 {
    METERS_PER_DEGREE_LAT * lat.to_radians().cos()
}
