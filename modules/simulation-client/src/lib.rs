//! Client for the external stakeholder simulation service.
//!
//! [`SimulationClient`] submits one job at a time for a scored placement and
//! polls it to completion; [`HttpJobApi`] speaks the service's REST contract.

pub mod api;
pub mod client;
pub mod error;
pub mod payload;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use api::{list_models, HttpJobApi, JobApi, ALLOWED_MODELS, DEFAULT_MODEL};
pub use client::{Phase, SimulationClient, SimulationSnapshot, DEFAULT_POLL_INTERVAL};
pub use error::{Result, SimulationError};
pub use types::{
    AgentReaction, AggregateResult, BuildingPayload, DriverCitation, ImpactDrivers, ImpactFlags,
    ImpactPayload, ImpactScores, JobCreated, JobStatus, ModelList, PartialProgress,
    SimulateRequest, SimulateResult, SimulateStatus, SimulationMetadata, Stance,
};
