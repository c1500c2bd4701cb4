//! Audit event and sweep wire objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One audit record from a pool's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDto {
    pub id: Uuid,
    pub pool_id: Uuid,
    /// Null for system actions such as the auto-lock sweep.
    pub actor_id: Option<Uuid>,
    pub kind: String,
    pub payload: serde_json::Value,
    pub created_at: i64,
}

/// Envelope for the event listing endpoint, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<EventDto>,
}

/// What the sweep did to one overdue pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAction {
    /// Pool was still open: locked, then randomized to numbered.
    LockedAndRandomized,
    /// Pool was already locked: randomized to numbered.
    Randomized,
    /// Pool left the sweepable states before the sweep transaction ran.
    Skipped,
    Failed,
}

/// Per-pool outcome of one sweep pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub pool_id: Uuid,
    pub action: SweepAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope for the manual sweep trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    /// Number of overdue pools examined.
    pub processed: usize,
    pub outcomes: Vec<SweepOutcome>,
}
