//! Result types: criteria, their drivers, and the whole-placement result.

use serde::{Deserialize, Serialize};
use vireon_geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionId {
    EnvironmentalSensitivity,
    InfrastructureStrain,
    LivabilityProxy,
    EconomicBenefit,
    DeterministicAcceptance,
}

impl CriterionId {
    pub const ALL: [CriterionId; 5] = [
        CriterionId::EnvironmentalSensitivity,
        CriterionId::InfrastructureStrain,
        CriterionId::LivabilityProxy,
        CriterionId::EconomicBenefit,
        CriterionId::DeterministicAcceptance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnvironmentalSensitivity => "environmental_sensitivity",
            Self::InfrastructureStrain => "infrastructure_strain",
            Self::LivabilityProxy => "livability_proxy",
            Self::EconomicBenefit => "economic_benefit",
            Self::DeterministicAcceptance => "deterministic_acceptance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EnvironmentalSensitivity => "Environmental Sensitivity",
            Self::InfrastructureStrain => "Infrastructure Strain",
            Self::LivabilityProxy => "Livability Impact",
            Self::EconomicBenefit => "Economic Benefit",
            Self::DeterministicAcceptance => "Public Acceptance",
        }
    }

    pub fn higher_is_worse(self) -> bool {
        matches!(
            self,
            Self::EnvironmentalSensitivity | Self::InfrastructureStrain | Self::LivabilityProxy
        )
    }
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction a weighted contribution pushes public acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Positive,
    Negative,
}

/// A named intermediate value explaining a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub key: String,
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

impl Driver {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value,
            unit: unit.into(),
            description: description.into(),
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub id: CriterionId,
    pub label: String,
    /// Always an integer in `0..=100`.
    pub score: u8,
    pub higher_is_worse: bool,
    pub drivers: Vec<Driver>,
}

impl CriterionResult {
    pub fn new(id: CriterionId, score: u8, drivers: Vec<Driver>) -> Self {
        Self {
            id,
            label: id.label().to_string(),
            score,
            higher_is_worse: id.higher_is_worse(),
            drivers,
        }
    }

    /// How bad this score is on a common scale where 100 is worst.
    pub fn badness(&self) -> u8 {
        if self.higher_is_worse {
            self.score
        } else {
            100 - self.score
        }
    }
}

/// Everything computed for one placement. Recomputed whole on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// The five criteria, in [`CriterionId::ALL`] order.
    pub criteria: Vec<CriterionResult>,
    /// Copy of the public acceptance score.
    pub overall_acceptance: u8,
    pub top_drivers: Vec<Driver>,
    pub cost_estimate: f64,
    pub gross_volume_m3: f64,
    pub footprint_area_m2: f64,
    pub centroid: GeoPoint,
}

impl ImpactResult {
    pub fn criterion(&self, id: CriterionId) -> Option<&CriterionResult> {
        self.criteria.iter().find(|c| c.id == id)
    }

    pub fn score(&self, id: CriterionId) -> Option<u8> {
        self.criterion(id).map(|c| c.score)
    }

    /// First driver with this key across all criteria.
    pub fn driver(&self, key: &str) -> Option<&Driver> {
        self.criteria
            .iter()
            .flat_map(|c| &c.drivers)
            .find(|d| d.key == key)
    }

    /// The criterion that is furthest from its ideal. Ties keep the earlier
    /// criterion.
    pub fn worst_criterion(&self) -> Option<&CriterionResult> {
        self.criteria
            .iter()
            .fold(None, |worst: Option<&CriterionResult>, c| match worst {
                Some(w) if w.badness() >= c.badness() => Some(w),
                _ => Some(c),
            })
    }
}
