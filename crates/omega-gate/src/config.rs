//! Gate configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use omega_core::DriftParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level gate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Tier classification.
    pub router: RouterConfig,
    /// Starting drift parameters and the disagreement epsilon.
    pub drift: DriftConfig,
    /// Witness panel.
    pub panel: PanelConfig,
    /// Coherence rule.
    pub coherence: CoherenceConfig,
    /// Dissent ledger.
    pub ledger: LedgerConfig,
    /// Event broadcast.
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Payloads matching one of these (trimmed, case-insensitive) go Reflex.
    pub verified_patterns: Vec<String>,
    /// Payloads longer than this many characters go Strategic.
    pub strategic_length: usize,
    /// Payloads containing any of these (case-insensitive) go Strategic.
    pub strategic_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub initial_drift: f64,
    pub initial_temperature: f64,
    pub initial_threshold: f64,
    /// Added to affirmative power so an all-affirmative round does not divide by zero.
    pub epsilon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Witness identifiers, polled in this order.
    pub witnesses: Vec<String>,
    /// Seed for the simulated witnesses. Unset = seeded from OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceConfig {
    /// Authorize iff affirmative power > dissenting power * ratio.
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Entries returned in the status snapshot.
    pub recent_limit: usize,
    /// Log a warning each time the ledger grows past a multiple of this.
    /// The ledger is never pruned; 0 disables the warning.
    pub warn_after: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity. Slow subscribers past this lag and drop events.
    pub capacity: usize,
}

// ============================================================
// Defaults
// ============================================================

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            verified_patterns: vec!["chicka chicka orange".into(), "resonance 1.67".into()],
            strategic_length: 100,
            strategic_keywords: vec!["strategic".into(), "analyze".into()],
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        let initial = DriftParameters::default();
        Self {
            initial_drift: initial.drift_level,
            initial_temperature: initial.temperature,
            initial_threshold: initial.validation_threshold,
            epsilon: 0.1,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            witnesses: vec!["claude".into(), "deepseek".into(), "gpt".into()],
            seed: None,
        }
    }
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self { ratio: 1.5 }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            recent_limit: 5,
            warn_after: 10_000,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

// ============================================================
// Loading
// ============================================================

impl GateConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} — using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {} — using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Starting drift parameters, clamped into range.
    pub fn initial_parameters(&self) -> DriftParameters {
        DriftParameters::bounded(
            self.drift.initial_drift,
            self.drift.initial_temperature,
            self.drift.initial_threshold,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: GateConfig = toml::from_str(
            r#"
            [panel]
            seed = 7

            [coherence]
            ratio = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.panel.seed, Some(7));
        assert_eq!(cfg.panel.witnesses.len(), 3);
        assert_eq!(cfg.coherence.ratio, 2.0);
        assert_eq!(cfg.router.strategic_length, 100);
        assert_eq!(cfg.ledger.recent_limit, 5);
    }

    #[test]
    fn default_toml_parses_back() {
        let text = GateConfig::default().to_toml();
        let back: GateConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.router.verified_patterns, RouterConfig::default().verified_patterns);
        assert_eq!(back.drift.epsilon, 0.1);
    }

    #[test]
    fn initial_parameters_are_clamped() {
        let mut cfg = GateConfig::default();
        cfg.drift.initial_drift = 4.0;
        cfg.drift.initial_threshold = 0.2;
        let p = cfg.initial_parameters();
        assert_eq!(p.drift_level, 1.0);
        assert_eq!(p.validation_threshold, 0.5);
    }
}
