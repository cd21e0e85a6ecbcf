//! Consensus gate — the orchestrator
//!
//! Per signal: RECEIVED → CLASSIFIED → REFLEX_EXECUTED, or
//! RECEIVED → CLASSIFIED → DELIBERATING → DECIDED.
//!
//! The drift monitor and the witness panel live behind a single mutex so a
//! whole deliberation (poll → archive → drift update) is one atomic unit.
//! The ledger has its own RwLock for readers, but is only written while the
//! pipeline mutex is held. Events are sent before that mutex is released.

use crate::aggregator::{Deliberation, VotingAggregator};
use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::drift::DriftMonitor;
use crate::ledger::DissentLedger;
use crate::router::SignalRouter;
use crate::witness::WitnessPanel;
use omega_core::{Decision, DissentRecord, DriftParameters, Error, GateStatus, Result, Signal, Tier};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const NO_RATIONALE: &str = "No specific log provided.";

// ---------------------------------------------------------------------------
// Events — side channel for observers, decoupled from the return value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum GateEvent {
    /// A decision was produced for a signal.
    Decided(Decision),
    /// Drift parameters changed after a deliberation.
    DriftUpdated(DriftParameters),
    /// A dissenting vote was archived.
    DissentArchived(DissentRecord),
}

struct Pipeline {
    drift: DriftMonitor,
    aggregator: VotingAggregator,
}

pub struct ConsensusGate {
    router: SignalRouter,
    pipeline: Mutex<Pipeline>,
    ledger: RwLock<DissentLedger>,
    clock: Arc<dyn Clock>,
    recent_limit: usize,
    events: broadcast::Sender<GateEvent>,
}

impl ConsensusGate {
    pub fn builder() -> ConsensusGateBuilder {
        ConsensusGateBuilder::default()
    }

    /// Default composition: simulated panel, system clock.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::builder()
            .router(SignalRouter::from_config(&config.router))
            .drift(DriftMonitor::new(config.initial_parameters()))
            .panel(WitnessPanel::simulated(&config.panel.witnesses, config.panel.seed))
            .coherence_ratio(config.coherence.ratio)
            .epsilon(config.drift.epsilon)
            .recent_limit(config.ledger.recent_limit)
            .warn_after(config.ledger.warn_after)
            .event_capacity(config.events.capacity)
            .build()
    }

    /// Run one payload through the full pipeline and return its decision.
    pub fn submit(&self, content: serde_json::Value) -> Result<Decision> {
        let tier = self.router.classify(&content);
        let signal = Signal::new(content, tier, self.clock.now());
        debug!("Signal {} classified as {}", signal.id, tier);

        if tier == Tier::Reflex {
            return self.execute_reflex(&signal);
        }
        self.deliberate(&signal)
    }

    fn execute_reflex(&self, signal: &Signal) -> Result<Decision> {
        let pipeline = self.lock_pipeline()?;
        let drift = pipeline.drift.parameters().drift_level;
        let decision = Decision::executed(signal, drift, self.clock.now());
        self.emit(GateEvent::Decided(decision.clone()));
        drop(pipeline);

        info!("Reflex action [{}]: executed immediately", signal.id);
        Ok(decision)
    }

    fn deliberate(&self, signal: &Signal) -> Result<Decision> {
        let mut pipeline = self.lock_pipeline()?;
        let params = pipeline.drift.parameters();
        debug!(
            "Deliberation [{}]: {} witnesses at drift {:.2}",
            signal.id,
            pipeline.aggregator.panel().len(),
            params.drift_level
        );

        let Deliberation {
            mut decision,
            tally,
            disagreement,
            dissent,
        } = pipeline.aggregator.deliberate(signal, &params);

        let archived: Vec<DissentRecord> = {
            let mut ledger = self.write_ledger()?;
            dissent
                .into_iter()
                .map(|v| {
                    let rationale = v.dissent.unwrap_or_else(|| NO_RATIONALE.to_string());
                    ledger.archive(&signal.id, v.witness_id, rationale).clone()
                })
                .collect()
        };

        let updated = pipeline.drift.update(disagreement);
        decision.drift_level = updated.drift_level;

        // Emitted under the pipeline lock so event order matches state order
        // across concurrent submits.
        for record in archived {
            self.emit(GateEvent::DissentArchived(record));
        }
        self.emit(GateEvent::DriftUpdated(updated));
        self.emit(GateEvent::Decided(decision.clone()));
        drop(pipeline);

        if decision.is_authorized() {
            info!(
                "Consensus reached [{}]: {} affirmative {:.2} vs dissenting {:.2}",
                signal.id, signal.tier, tally.affirmative, tally.dissenting
            );
        } else {
            warn!(
                "Consensus failed [{}]: {} affirmative {:.2} vs dissenting {:.2}, held",
                signal.id, signal.tier, tally.affirmative, tally.dissenting
            );
        }
        info!(
            "Drift {:.4} ({:?}), temperature {:.4}, threshold {:.4}",
            updated.drift_level,
            updated.mode(),
            updated.temperature,
            updated.validation_threshold
        );

        Ok(decision)
    }

    /// Drift parameters, dissent count and the most recent dissent entries.
    pub fn status(&self) -> Result<GateStatus> {
        let pipeline = self.lock_pipeline()?;
        let drift = pipeline.drift.parameters();
        let ledger = self.read_ledger()?;
        Ok(GateStatus {
            drift,
            mode: drift.mode(),
            dissent_count: ledger.count(),
            recent_dissent: ledger.recent(self.recent_limit).to_vec(),
        })
    }

    /// Full copy of the dissent ledger, in insertion order.
    pub fn dissent_ledger(&self) -> Result<Vec<DissentRecord>> {
        Ok(self.read_ledger()?.all().to_vec())
    }

    pub fn dissent_count(&self) -> Result<usize> {
        Ok(self.read_ledger()?.count())
    }

    pub fn drift_parameters(&self) -> Result<DriftParameters> {
        Ok(self.lock_pipeline()?.drift.parameters())
    }

    pub fn witnesses(&self) -> Result<Vec<String>> {
        Ok(self.lock_pipeline()?.aggregator.panel().ids())
    }

    /// Observe decisions, drift updates and archived dissent.
    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: GateEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn lock_pipeline(&self) -> Result<MutexGuard<'_, Pipeline>> {
        self.pipeline.lock().map_err(|_| {
            error!("Pipeline lock poisoned: a previous deliberation panicked");
            Error::state_poisoned("pipeline")
        })
    }

    fn read_ledger(&self) -> Result<RwLockReadGuard<'_, DissentLedger>> {
        self.ledger.read().map_err(|_| {
            error!("Dissent ledger lock poisoned");
            Error::state_poisoned("dissent ledger")
        })
    }

    fn write_ledger(&self) -> Result<RwLockWriteGuard<'_, DissentLedger>> {
        self.ledger.write().map_err(|_| {
            error!("Dissent ledger lock poisoned");
            Error::state_poisoned("dissent ledger")
        })
    }
}

// ---------------------------------------------------------------------------
// Builder — constructor injection for every collaborator
// ---------------------------------------------------------------------------

pub struct ConsensusGateBuilder {
    router: Option<SignalRouter>,
    drift: Option<DriftMonitor>,
    panel: Option<WitnessPanel>,
    clock: Option<Arc<dyn Clock>>,
    coherence_ratio: f64,
    epsilon: f64,
    recent_limit: usize,
    warn_after: usize,
    event_capacity: usize,
}

impl Default for ConsensusGateBuilder {
    fn default() -> Self {
        Self {
            router: None,
            drift: None,
            panel: None,
            clock: None,
            coherence_ratio: VotingAggregator::DEFAULT_COHERENCE_RATIO,
            epsilon: VotingAggregator::DEFAULT_EPSILON,
            recent_limit: 5,
            warn_after: 0,
            event_capacity: 1024,
        }
    }
}

impl ConsensusGateBuilder {
    pub fn router(mut self, router: SignalRouter) -> Self {
        self.router = Some(router);
        self
    }

    pub fn drift(mut self, drift: DriftMonitor) -> Self {
        self.drift = Some(drift);
        self
    }

    pub fn panel(mut self, panel: WitnessPanel) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn coherence_ratio(mut self, ratio: f64) -> Self {
        self.coherence_ratio = ratio;
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn recent_limit(mut self, n: usize) -> Self {
        self.recent_limit = n;
        self
    }

    pub fn warn_after(mut self, n: usize) -> Self {
        self.warn_after = n;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> ConsensusGate {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let panel = self.panel.unwrap_or_else(|| {
            WitnessPanel::simulated(&crate::config::PanelConfig::default().witnesses, None)
        });
        let aggregator = VotingAggregator::new(panel, clock.clone())
            .with_coherence_ratio(self.coherence_ratio)
            .with_epsilon(self.epsilon);
        let (events, _) = broadcast::channel(self.event_capacity.max(1));

        ConsensusGate {
            router: self.router.unwrap_or_default(),
            pipeline: Mutex::new(Pipeline {
                drift: self.drift.unwrap_or_default(),
                aggregator,
            }),
            ledger: RwLock::new(DissentLedger::with_watermark(clock.clone(), self.warn_after)),
            clock,
            recent_limit: self.recent_limit,
            events,
        }
    }
}
