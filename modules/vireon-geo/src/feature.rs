//! The GeoJSON subset city layers are delivered in.
//!
//! Only the geometry matters for scoring; properties are carried through
//! untouched. Geometry types outside the subset are kept as
//! [`Geometry::Unsupported`] and null geometries as `None`, so a single odd
//! feature never fails a whole layer.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// A `[lng, lat]` coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl TryFrom<Vec<f64>> for GeoPoint {
    type Error = GeoError;

    /// GeoJSON positions may carry a third (altitude) element; it is dropped.
    fn try_from(position: Vec<f64>) -> Result<Self, Self::Error> {
        if position.len() < 2 {
            return Err(GeoError::InvalidPosition(position.len()));
        }
        let (lng, lat) = (position[0], position[1]);
        if !lng.is_finite() || !lat.is_finite() {
            return Err(GeoError::NonFinite { lng, lat });
        }
        Ok(Self { lng, lat })
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lng, p.lat]
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

/// A polygon is an outer ring followed by zero or more holes.
pub type Polygon = Vec<Vec<GeoPoint>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Polygons of this geometry (none for lines and points).
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(ps) => ps,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            properties: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Geometries of all features, skipping null and unsupported ones.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .filter(|g| !matches!(g, Geometry::Unsupported))
    }

    pub fn is_empty(&self) -> bool {
        self.geometries().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "City Park"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-76.49,44.22],[-76.48,44.22],[-76.48,44.23],[-76.49,44.22]]]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "LineString", "coordinates": [[-76.5,44.2,81.0],[-76.4,44.3]]}},
                {"type": "Feature", "geometry": null},
                {"type": "Feature",
                 "geometry": {"type": "GeometryCollection", "geometries": []}}
            ]
        }"#;

        let fc: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(fc.features.len(), 4);
        assert_eq!(fc.geometries().count(), 2);
        match fc.features[1].geometry.as_ref().unwrap() {
            Geometry::LineString(line) => assert_eq!(line[0], GeoPoint::new(-76.5, 44.2)),
            other => panic!("expected line, got {other:?}"),
        }
        assert_eq!(fc.features[3].geometry, Some(Geometry::Unsupported));
    }

    #[test]
    fn rejects_short_position() {
        let err = serde_json::from_str::<GeoPoint>("[1.0]").unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn geo_point_serializes_as_pair() {
        let json = serde_json::to_string(&GeoPoint::new(-76.5, 44.2)).unwrap();
        assert_eq!(json, "[-76.5,44.2]");
    }

    #[test]
    fn empty_collection_has_no_geometries() {
        let fc = FeatureCollection::new(vec![Feature {
            geometry: None,
            properties: None,
        }]);
        assert!(fc.is_empty());
    }
}
