//! Voting aggregator — weighted super-majority over the witness panel
//!
//! Votes are weighted by confidence, not counted. A signal is authorized only
//! when affirmative power exceeds dissenting power times the coherence ratio
//! (1.5 by default), so a couple of confident dissenters can hold a signal
//! that most witnesses approve.

use crate::clock::Clock;
use crate::drift::DriftMonitor;
use crate::witness::WitnessPanel;
use omega_core::{Decision, DecisionStatus, DriftParameters, Signal, Vote};
use std::sync::Arc;
use tracing::debug;

/// Confidence-weighted totals of one round.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub affirmative: f64,
    pub dissenting: f64,
}

impl Tally {
    /// Weights are clamped into [0, 1]; a non-finite confidence weighs nothing.
    pub fn from_votes(votes: &[Vote]) -> Self {
        votes.iter().fold(Self::default(), |mut t, v| {
            let weight = vote_weight(v.confidence);
            if v.verdict {
                t.affirmative += weight;
            } else {
                t.dissenting += weight;
            }
            t
        })
    }

    /// Coherence rule: affirmative > dissenting * ratio.
    pub fn is_coherent(&self, ratio: f64) -> bool {
        self.affirmative > self.dissenting * ratio
    }

    pub fn disagreement_ratio(&self, epsilon: f64) -> f64 {
        DriftMonitor::disagreement_ratio(self.affirmative, self.dissenting, epsilon)
    }
}

fn vote_weight(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// The verdict is authoritative; a rationale on an affirmative vote is dropped.
fn normalize(mut vote: Vote) -> Vote {
    vote.confidence = vote_weight(vote.confidence);
    if vote.verdict {
        vote.dissent = None;
    }
    vote
}

/// Result of one deliberation, before side effects are applied.
#[derive(Debug, Clone)]
pub struct Deliberation {
    pub decision: Decision,
    pub tally: Tally,
    /// Feed for [`DriftMonitor::update`].
    pub disagreement: f64,
    /// Dissenting votes, in panel order, to be archived.
    pub dissent: Vec<Vote>,
}

pub struct VotingAggregator {
    panel: WitnessPanel,
    coherence_ratio: f64,
    epsilon: f64,
    clock: Arc<dyn Clock>,
}

impl VotingAggregator {
    pub const DEFAULT_COHERENCE_RATIO: f64 = 1.5;
    pub const DEFAULT_EPSILON: f64 = 0.1;

    pub fn new(panel: WitnessPanel, clock: Arc<dyn Clock>) -> Self {
        Self {
            panel,
            coherence_ratio: Self::DEFAULT_COHERENCE_RATIO,
            epsilon: Self::DEFAULT_EPSILON,
            clock,
        }
    }

    pub fn with_coherence_ratio(mut self, ratio: f64) -> Self {
        self.coherence_ratio = ratio;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn panel(&self) -> &WitnessPanel {
        &self.panel
    }

    /// Poll every witness with the given drift parameters and decide.
    pub fn deliberate(&mut self, signal: &Signal, params: &DriftParameters) -> Deliberation {
        let votes: Vec<Vote> = self
            .panel
            .poll(signal, params)
            .into_iter()
            .map(normalize)
            .collect();
        for v in &votes {
            debug!(
                signal = %signal.id,
                witness = %v.witness_id,
                verdict = v.verdict,
                confidence = v.confidence,
                reasoning = %v.reasoning,
                "vote cast"
            );
        }

        let tally = Tally::from_votes(&votes);
        let status = if tally.is_coherent(self.coherence_ratio) {
            DecisionStatus::Authorized
        } else {
            DecisionStatus::HeldForArbitration
        };

        let decision = Decision {
            signal_id: signal.id.clone(),
            tier: signal.tier,
            quorum: signal.tier.quorum(),
            status,
            confidence: tally.affirmative,
            votes: votes.len(),
            drift_level: params.drift_level,
            decided_at: self.clock.now(),
        };

        Deliberation {
            decision,
            tally,
            disagreement: tally.disagreement_ratio(self.epsilon),
            dissent: votes.into_iter().filter(|v| !v.verdict).collect(),
        }
    }
}
