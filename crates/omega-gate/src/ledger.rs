//! Dissent ledger — append-only archive of rejected votes
//!
//! Entries are never mutated, reordered, or removed. There is no capacity
//! bound; crossing each `warn_after` multiple is logged so unbounded growth
//! stays visible to operators.

use crate::clock::Clock;
use omega_core::{DissentRecord, SignalId};
use std::sync::Arc;
use tracing::warn;

pub struct DissentLedger {
    records: Vec<DissentRecord>,
    clock: Arc<dyn Clock>,
    warn_after: usize,
}

impl DissentLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_watermark(clock, 0)
    }

    pub fn with_watermark(clock: Arc<dyn Clock>, warn_after: usize) -> Self {
        Self {
            records: Vec::new(),
            clock,
            warn_after,
        }
    }

    /// Append one dissenting opinion, stamped with the current time.
    pub fn archive(
        &mut self,
        signal_id: &SignalId,
        witness_id: impl Into<String>,
        rationale: impl Into<String>,
    ) -> &DissentRecord {
        self.records.push(DissentRecord {
            signal_id: signal_id.clone(),
            witness_id: witness_id.into(),
            rationale: rationale.into(),
            archived_at: self.clock.now(),
        });

        let count = self.records.len();
        if self.warn_after > 0 && count % self.warn_after == 0 {
            warn!(
                "Dissent ledger holds {} entries and is never pruned; configure external retention",
                count
            );
        }

        &self.records[count - 1]
    }

    /// Every record, in insertion order.
    pub fn all(&self) -> &[DissentRecord] {
        &self.records
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> &[DissentRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }
}

impl std::fmt::Debug for DissentLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DissentLedger")
            .field("count", &self.records.len())
            .field("warn_after", &self.warn_after)
            .finish()
    }
}
