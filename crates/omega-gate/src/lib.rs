//! Omega Gate - adaptive consensus engine
//!
//! A submitted payload is routed to a tier. Reflex signals execute at once;
//! everything else is put to a witness panel whose weighted votes decide
//! between authorization and arbitration. Dissent is archived forever and
//! the observed disagreement tunes the drift parameters for the next round.

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod drift;
pub mod gate;
pub mod ledger;
pub mod router;
pub mod witness;

pub use aggregator::{Deliberation, Tally, VotingAggregator};
pub use clock::{Clock, SystemClock};
pub use config::GateConfig;
pub use drift::DriftMonitor;
pub use gate::{ConsensusGate, ConsensusGateBuilder, GateEvent};
pub use ledger::DissentLedger;
pub use router::SignalRouter;
pub use witness::{SimulatedWitness, Witness, WitnessPanel};
