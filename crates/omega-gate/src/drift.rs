//! Drift monitor — turns observed disagreement into damping and strictness
//!
//! Each deliberation feeds one disagreement ratio. Drift is the running
//! half-weight average of those ratios, clamped to [0, 1]. High drift cools
//! the temperature and raises the validation threshold; low drift does the
//! opposite, within the bounds carried by [`DriftParameters`].

use omega_core::{
    DriftMode, DriftParameters, DRIFT_MAX, DRIFT_MIN, TEMPERATURE_FLOOR, TEMPERATURE_MAX,
    THRESHOLD_MAX, THRESHOLD_MIN,
};
use tracing::debug;

const HIGH_DRIFT: f64 = 0.5;
const COOLING: f64 = 0.9;
const WARMING: f64 = 1.05;
const TIGHTEN: f64 = 1.1;
const RELAX: f64 = 0.95;

#[derive(Debug, Clone, Default)]
pub struct DriftMonitor {
    params: DriftParameters,
}

impl DriftMonitor {
    pub fn new(initial: DriftParameters) -> Self {
        Self {
            params: DriftParameters::bounded(
                initial.drift_level,
                initial.temperature,
                initial.validation_threshold,
            ),
        }
    }

    pub fn parameters(&self) -> DriftParameters {
        self.params
    }

    pub fn mode(&self) -> DriftMode {
        self.params.mode()
    }

    /// Disagreement of one round: dissenting / (affirmative + epsilon).
    pub fn disagreement_ratio(affirmative: f64, dissenting: f64, epsilon: f64) -> f64 {
        dissenting / (affirmative + epsilon)
    }

    /// Fold one round's disagreement into the parameters.
    pub fn update(&mut self, disagreement_ratio: f64) -> DriftParameters {
        let ratio = if disagreement_ratio.is_finite() {
            disagreement_ratio.max(0.0)
        } else {
            1.0
        };

        let p = &mut self.params;
        p.drift_level = ((p.drift_level + ratio) / 2.0).clamp(DRIFT_MIN, DRIFT_MAX);

        if p.drift_level > HIGH_DRIFT {
            p.temperature = (p.temperature * COOLING).max(TEMPERATURE_FLOOR);
            p.validation_threshold = (p.validation_threshold * TIGHTEN).min(THRESHOLD_MAX);
        } else {
            p.temperature = (p.temperature * WARMING).min(TEMPERATURE_MAX);
            p.validation_threshold = (p.validation_threshold * RELAX).max(THRESHOLD_MIN);
        }

        debug!(
            ratio,
            drift = p.drift_level,
            temperature = p.temperature,
            threshold = p.validation_threshold,
            "drift updated"
        );
        *p
    }
}
