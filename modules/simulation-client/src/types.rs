use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingPayload {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub height_m: f64,
    #[serde(default)]
    pub cost_estimate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactScores {
    pub environmental_sensitivity: f64,
    pub infrastructure_strain: f64,
    pub livability_proxy: f64,
    pub economic_benefit: f64,
    pub deterministic_acceptance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactDrivers {
    pub d_to_park_m: f64,
    pub d_to_water_m: f64,
    pub overlap_sensitive_m2: f64,
    pub d_to_major_road_m: f64,
    pub d_to_residential_m: f64,
    pub intensity: f64,
    pub center_proximity_score: f64,
}

/// Distances the job API assumes for a driver that was not sent.
pub const UNKNOWN_DISTANCE_M: f64 = 9999.0;

impl Default for ImpactDrivers {
    fn default() -> Self {
        Self {
            d_to_park_m: UNKNOWN_DISTANCE_M,
            d_to_water_m: UNKNOWN_DISTANCE_M,
            overlap_sensitive_m2: 0.0,
            d_to_major_road_m: UNKNOWN_DISTANCE_M,
            d_to_residential_m: UNKNOWN_DISTANCE_M,
            intensity: 0.0,
            center_proximity_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactFlags {
    pub near_sensitive_zone: bool,
    pub near_residential: bool,
    pub near_major_road: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactPayload {
    pub scores: ImpactScores,
    pub drivers: ImpactDrivers,
    #[serde(default)]
    pub flags: ImpactFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub model_id: String,
    pub building: BuildingPayload,
    pub impacts: ImpactPayload,
}

// ---------------------------------------------------------------------------
// Job lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: String,
}

/// Server-side job status. Unrecognized values are treated as still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Complete,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialProgress {
    pub agents_done: u32,
    pub agents_total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateStatus {
    pub status: JobStatus,
    /// 0-100.
    #[serde(default)]
    pub progress: u8,
    /// Server phase label: impacts, agents, aggregate, complete.
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub partial: Option<PartialProgress>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Support,
    Oppose,
    #[serde(other)]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverCitation {
    pub driver: String,
    /// Number or string, as the agent cited it.
    pub value: serde_json::Value,
    /// positive, negative or neutral.
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReaction {
    pub agent_id: String,
    pub display_name: String,
    pub stance: Stance,
    pub score: u8,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub why: Vec<String>,
    #[serde(default)]
    pub would_change_mind_if: Vec<String>,
    #[serde(default)]
    pub proposed_amendments: Vec<String>,
    #[serde(default)]
    pub driver_citations: Vec<DriverCitation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub sentiment_score: f64,
    pub final_score: f64,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub model_id: String,
    #[serde(default)]
    pub run_ms: u64,
    /// Absent when the server sent an empty or unparseable timestamp.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateResult {
    pub impacts: ImpactPayload,
    pub agents: Vec<AgentReaction>,
    pub aggregate: AggregateResult,
    pub metadata: SimulationMetadata,
}

impl SimulateResult {
    /// Agents grouped by stance: (support, neutral, oppose).
    pub fn stance_counts(&self) -> (usize, usize, usize) {
        self.agents
            .iter()
            .fold((0, 0, 0), |(s, n, o), a| match a.stance {
                Stance::Support => (s + 1, n, o),
                Stance::Neutral => (s, n + 1, o),
                Stance::Oppose => (s, n, o + 1),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<String>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc)))
}
