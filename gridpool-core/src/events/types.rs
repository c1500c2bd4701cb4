//! Audit event definitions.
//!
//! Every state change a pool goes through is described by one event kind.
//! Events carry a small JSON payload snapshotting what changed; they are
//! persisted by the audit writer and never read back by the mutation path.

use serde_json::Value;
use uuid::Uuid;

/// The kind of a pool audit event.
///
/// The wire form (and the `events.kind` column) is the snake_case string
/// from [`EventKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PoolCreated,
    PoolUpdated,
    PoolLocked,
    PoolUnlocked,
    PoolRandomized,
    PoolUnrandomized,
    SquaresClaimed,
    SquareUnclaimed,
    ScoreUpdated,
    PoolCompleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PoolCreated => "pool_created",
            EventKind::PoolUpdated => "pool_updated",
            EventKind::PoolLocked => "pool_locked",
            EventKind::PoolUnlocked => "pool_unlocked",
            EventKind::PoolRandomized => "pool_randomized",
            EventKind::PoolUnrandomized => "pool_unrandomized",
            EventKind::SquaresClaimed => "squares_claimed",
            EventKind::SquareUnclaimed => "square_unclaimed",
            EventKind::ScoreUpdated => "score_updated",
            EventKind::PoolCompleted => "pool_completed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit record waiting to be persisted.
///
/// `actor_id` is `None` for changes made by the auto-lock sweeper rather
/// than a signed-in user.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub pool_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub kind: EventKind,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(pool_id: Uuid, actor_id: Option<Uuid>, kind: EventKind, payload: Value) -> Self {
        Self {
            pool_id,
            actor_id,
            kind,
            payload,
        }
    }
}
