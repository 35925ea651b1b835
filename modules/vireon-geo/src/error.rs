use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid position: expected at least 2 numbers, got {0}")]
    InvalidPosition(usize),

    #[error("Non-finite coordinate: [{lng}, {lat}]")]
    NonFinite { lng: f64, lat: f64 },
}
