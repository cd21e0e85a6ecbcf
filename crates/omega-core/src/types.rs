//! Core types for Omega

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signal identifier, fresh per submission.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(String);

impl SignalId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Mint a new random (v4) identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SignalId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SignalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Execution urgency class of a signal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Verified pattern, executed without deliberation
    Reflex,
    /// Local coordination by the witness panel
    Tactical,
    /// Full deliberation
    Strategic,
}

impl Tier {
    /// Quorum label attached to decisions of this tier.
    pub fn quorum(self) -> QuorumType {
        match self {
            Tier::Reflex => QuorumType::SingleWitness,
            Tier::Tactical => QuorumType::TriNode,
            Tier::Strategic => QuorumType::CouncilOfMany,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Reflex => "REFLEX",
            Tier::Tactical => "TACTICAL",
            Tier::Strategic => "STRATEGIC",
        };
        f.write_str(s)
    }
}

/// Quorum metadata carried on a decision.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuorumType {
    #[serde(rename = "one_verified")]
    SingleWitness,
    #[serde(rename = "trinity_lock")]
    TriNode,
    #[serde(rename = "multitude")]
    CouncilOfMany,
}

/// Terminal status of a decision cycle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Executed,
    Authorized,
    /// Coherence not reached; escalate to a human. Not an error.
    HeldForArbitration,
}

/// A submitted payload with its routing tier. Lives for one decision cycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub content: serde_json::Value,
    pub tier: Tier,
    pub received_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(content: serde_json::Value, tier: Tier, received_at: DateTime<Utc>) -> Self {
        Self {
            id: SignalId::generate(),
            content,
            tier,
            received_at,
        }
    }
}

/// One witness's verdict on one signal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub witness_id: String,
    pub verdict: bool,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Opaque reasoning tag
    pub reasoning: String,
    /// Rationale, only present on dissenting votes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dissent: Option<String>,
}

impl Vote {
    pub fn affirm(
        witness_id: impl Into<String>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            witness_id: witness_id.into(),
            verdict: true,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            dissent: None,
        }
    }

    pub fn dissent(
        witness_id: impl Into<String>,
        confidence: f64,
        reasoning: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            witness_id: witness_id.into(),
            verdict: false,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            dissent: Some(rationale.into()),
        }
    }
}

/// Archived dissenting opinion. Never mutated after insertion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DissentRecord {
    pub signal_id: SignalId,
    pub witness_id: String,
    pub rationale: String,
    pub archived_at: DateTime<Utc>,
}

pub const DRIFT_MIN: f64 = 0.0;
pub const DRIFT_MAX: f64 = 1.0;
pub const TEMPERATURE_FLOOR: f64 = 1e-6;
pub const TEMPERATURE_MAX: f64 = 1.0;
pub const THRESHOLD_MIN: f64 = 0.5;
pub const THRESHOLD_MAX: f64 = 0.95;

/// Self-tuning parameters derived from observed disagreement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DriftParameters {
    /// In [0, 1]
    pub drift_level: f64,
    /// Damping ("mercy") factor in (0, 1]
    pub temperature: f64,
    /// Acceptance bar in [0.5, 0.95]
    pub validation_threshold: f64,
}

impl DriftParameters {
    /// Build parameters, clamping each field into its documented range.
    pub fn bounded(drift_level: f64, temperature: f64, validation_threshold: f64) -> Self {
        Self {
            drift_level: finite_or(drift_level, DRIFT_MIN).clamp(DRIFT_MIN, DRIFT_MAX),
            temperature: finite_or(temperature, TEMPERATURE_MAX)
                .clamp(TEMPERATURE_FLOOR, TEMPERATURE_MAX),
            validation_threshold: finite_or(validation_threshold, THRESHOLD_MIN)
                .clamp(THRESHOLD_MIN, THRESHOLD_MAX),
        }
    }

    pub fn mode(&self) -> DriftMode {
        DriftMode::from_drift(self.drift_level)
    }
}

impl Default for DriftParameters {
    fn default() -> Self {
        Self {
            drift_level: 0.6,
            temperature: 0.7,
            validation_threshold: 0.6,
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Informational classification of the drift level.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftMode {
    Stable,
    Balanced,
    Critical,
}

impl DriftMode {
    pub fn from_drift(drift_level: f64) -> Self {
        if drift_level > 0.7 {
            DriftMode::Critical
        } else if drift_level > 0.4 {
            DriftMode::Balanced
        } else {
            DriftMode::Stable
        }
    }
}

/// Outcome of one decision cycle, returned to the caller.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub signal_id: SignalId,
    pub tier: Tier,
    pub quorum: QuorumType,
    pub status: DecisionStatus,
    /// Aggregate affirmative power
    pub confidence: f64,
    pub votes: usize,
    pub drift_level: f64,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    /// Reflex fast path: executed without votes.
    pub fn executed(signal: &Signal, drift_level: f64, decided_at: DateTime<Utc>) -> Self {
        Self {
            signal_id: signal.id.clone(),
            tier: signal.tier,
            quorum: QuorumType::SingleWitness,
            status: DecisionStatus::Executed,
            confidence: 1.0,
            votes: 0,
            drift_level,
            decided_at,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(
            self.status,
            DecisionStatus::Executed | DecisionStatus::Authorized
        )
    }
}

/// Read-only snapshot of the gate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateStatus {
    pub drift: DriftParameters,
    pub mode: DriftMode,
    pub dissent_count: usize,
    pub recent_dissent: Vec<DissentRecord>,
}

/// Gateway configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub bind: BindMode,
}

fn default_port() -> u16 {
    18789
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: BindMode::default(),
        }
    }
}

/// Bind mode for the gateway
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    #[default]
    Loopback,
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "lan" | "0.0.0.0" => BindMode::Lan,
            _ => BindMode::Loopback,
        }
    }
}
