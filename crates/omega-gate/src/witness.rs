//! Witnesses — evaluators that cast one vote per signal
//!
//! The default panel is simulated: each witness rolls its verdict against the
//! current drift level from its own seeded generator, so a fixed seed
//! reproduces every decision. Real evaluators plug in through [`Witness`].

use omega_core::{DriftParameters, Signal, Vote};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Witness: Send {
    fn id(&self) -> &str;

    fn evaluate(&mut self, signal: &Signal, params: &DriftParameters) -> Vote;
}

/// Witness whose verdict is a biased coin: affirm iff `uniform[0,1) > drift`.
pub struct SimulatedWitness {
    id: String,
    rng: StdRng,
}

impl SimulatedWitness {
    pub fn new(id: impl Into<String>, rng: StdRng) -> Self {
        Self { id: id.into(), rng }
    }

    pub fn seeded(id: impl Into<String>, seed: u64) -> Self {
        Self::new(id, StdRng::seed_from_u64(seed))
    }
}

impl Witness for SimulatedWitness {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(&mut self, _signal: &Signal, params: &DriftParameters) -> Vote {
        let roll: f64 = self.rng.gen();
        let confidence = self.rng.gen_range(0.5..=1.0);
        let reasoning = format!("{:08x}", self.rng.gen::<u32>());

        if roll > params.drift_level {
            Vote::affirm(&self.id, confidence, reasoning)
        } else {
            Vote::dissent(
                &self.id,
                confidence,
                reasoning,
                format!("Drift detected: {:.2}", params.drift_level),
            )
        }
    }
}

impl std::fmt::Debug for SimulatedWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedWitness").field("id", &self.id).finish()
    }
}

/// Fixed, ordered set of witnesses.
#[derive(Default)]
pub struct WitnessPanel {
    witnesses: Vec<Box<dyn Witness>>,
}

impl WitnessPanel {
    pub fn new(witnesses: Vec<Box<dyn Witness>>) -> Self {
        Self { witnesses }
    }

    /// Simulated panel. Each witness gets its own generator derived from
    /// `seed`, or from OS entropy when no seed is given.
    pub fn simulated<S: AsRef<str>>(ids: &[S], seed: Option<u64>) -> Self {
        let mut master = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let witnesses = ids
            .iter()
            .map(|id| {
                Box::new(SimulatedWitness::seeded(id.as_ref(), master.gen())) as Box<dyn Witness>
            })
            .collect();
        Self { witnesses }
    }

    /// One vote per witness, in panel order.
    pub fn poll(&mut self, signal: &Signal, params: &DriftParameters) -> Vec<Vote> {
        self.witnesses
            .iter_mut()
            .map(|w| w.evaluate(signal, params))
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.witnesses.iter().map(|w| w.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.witnesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.witnesses.is_empty()
    }
}

impl std::fmt::Debug for WitnessPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitnessPanel")
            .field("witnesses", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use omega_core::Tier;

    fn signal() -> Signal {
        Signal::new(serde_json::json!("status report"), Tier::Tactical, Utc::now())
    }

    #[test]
    fn same_seed_same_votes() {
        let params = DriftParameters::default();
        let s = signal();
        let mut a = WitnessPanel::simulated(&["claude", "deepseek", "gpt"], Some(42));
        let mut b = WitnessPanel::simulated(&["claude", "deepseek", "gpt"], Some(42));
        for _ in 0..10 {
            assert_eq!(a.poll(&s, &params), b.poll(&s, &params));
        }
    }

    #[test]
    fn votes_follow_panel_order() {
        let mut panel = WitnessPanel::simulated(&["claude", "deepseek", "gpt"], Some(1));
        let votes = panel.poll(&signal(), &DriftParameters::default());
        let ids: Vec<&str> = votes.iter().map(|v| v.witness_id.as_str()).collect();
        assert_eq!(ids, vec!["claude", "deepseek", "gpt"]);
        assert_eq!(panel.len(), 3);
    }

    #[test]
    fn zero_drift_always_affirms() {
        let params = DriftParameters::bounded(0.0, 0.7, 0.6);
        let mut w = SimulatedWitness::seeded("claude", 9);
        for _ in 0..200 {
            let v = w.evaluate(&signal(), &params);
            assert!(v.verdict);
            assert!(v.dissent.is_none());
            assert!((0.5..=1.0).contains(&v.confidence));
            assert_eq!(v.reasoning.len(), 8);
        }
    }

    #[test]
    fn full_drift_always_dissents() {
        let params = DriftParameters::bounded(1.0, 0.7, 0.6);
        let mut w = SimulatedWitness::seeded("gpt", 3);
        for _ in 0..200 {
            let v = w.evaluate(&signal(), &params);
            assert!(!v.verdict);
            assert_eq!(v.dissent.as_deref(), Some("Drift detected: 1.00"));
        }
    }
}
