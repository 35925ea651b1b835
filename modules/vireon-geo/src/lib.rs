//! Geographic primitives for placing building footprints against city data.
//!
//! All functions are pure. Distances are meters, coordinates are degrees in
//! `[lng, lat]` order (GeoJSON convention).

pub mod distance;
pub mod error;
pub mod feature;
pub mod footprint;
pub mod measure;

pub use distance::{distance_m, meters_per_degree_lng, EARTH_RADIUS_METERS, METERS_PER_DEGREE_LAT};
pub use error::{GeoError, Result};
pub use feature::{Feature, FeatureCollection, GeoPoint, Geometry, Polygon};
pub use footprint::{transformed_footprint, Footprint, LocalOffset};
pub use measure::{
    min_distance_to_features, nearest_feature_centroid, point_in_features, point_in_polygon,
    point_to_line_distance, point_to_polygon_edge_distance, point_to_segment_distance,
    polygon_area_m2, polygon_centroid, NearestFeature,
};
