use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Clone, Error)]
pub enum SimulationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Simulation failed: {0}")]
    JobFailed(String),
}

impl From<reqwest::Error> for SimulationError {
    fn from(err: reqwest::Error) -> Self {
        SimulationError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        SimulationError::Parse(err.to_string())
    }
}
