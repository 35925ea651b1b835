//! Impact & mitigation engine.
//!
//! Scores a building placement against city layers on five criteria, proposes
//! a better placement when one exists, and keeps per-session placement state.
//! Everything here is synchronous and side-effect free except the footprint
//! catalog, which loads templates once.

pub mod building;
pub mod catalog;
pub mod criteria;
pub mod error;
pub mod layers;
pub mod mitigation;
pub mod model;
pub mod scoring;
pub mod session;

pub use building::{BuildingTemplate, Placement};
pub use catalog::{FootprintCatalog, FootprintLoader, JsonFileLoader};
pub use criteria::{CriterionId, CriterionResult, Driver, Effect, ImpactResult};
pub use error::{ImpactError, Result};
pub use layers::{CityLayers, LayerKind};
pub use mitigation::{MitigationResult, MitigationSearch};
pub use model::{ActivityCenter, ImpactModel};
pub use session::{SessionAction, SessionReducer, SessionState};
