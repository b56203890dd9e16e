//! Delayed completion scheduler
//!
//! Reboots and provisions finish after a fixed delay. Pending completions
//! are plain data keyed by server id and fired against the engine's
//! simulated clock, so teardown is a single `cancel_all`.

use std::time::Duration;

/// Kind of delayed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Reboot,
    Provision,
}

impl std::fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionKind::Reboot => write!(f, "reboot"),
            CompletionKind::Provision => write!(f, "provision"),
        }
    }
}

/// A pending one-shot completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Scheduling sequence number, unique per scheduler
    pub seq: u64,
    pub server_id: String,
    pub kind: CompletionKind,
    /// Simulated time at which it fires
    pub due_at: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Completion>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a completion firing at `due_at`
    pub fn schedule(
        &mut self,
        server_id: impl Into<String>,
        kind: CompletionKind,
        due_at: Duration,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let server_id = server_id.into();
        tracing::debug!(server = %server_id, kind = %kind, due_ms = due_at.as_millis() as u64, "Completion scheduled");
        self.pending.push(Completion {
            seq,
            server_id,
            kind,
            due_at,
        });
        seq
    }

    /// Remove and return everything due at or before `now`, oldest first
    pub fn take_due(&mut self, now: Duration) -> Vec<Completion> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|c| c.due_at <= now);
        self.pending = rest;
        due.sort_by_key(|c| (c.due_at, c.seq));
        due
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|c| c.due_at).min()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, server_id: &str) -> Vec<&Completion> {
        self.pending.iter().filter(|c| c.server_id == server_id).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending completion; only used on teardown
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        if count > 0 {
            tracing::info!(cancelled = count, "Pending completions cancelled");
        }
        count
    }
}
