use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImpactError>;

#[derive(Debug, Error)]
pub enum ImpactError {
    #[error("Unknown building template: {0}")]
    UnknownBuilding(String),

    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ImpactError {
    fn from(err: std::io::Error) -> Self {
        ImpactError::CatalogLoad(err.to_string())
    }
}

impl From<serde_json::Error> for ImpactError {
    fn from(err: serde_json::Error) -> Self {
        ImpactError::Parse(err.to_string())
    }
}
