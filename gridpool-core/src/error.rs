//! Crate-wide error type for pool operations.

use crate::engine::EngineError;
use crate::entities::PoolStatus;
use gridpool_sdk::objects::board::CellRef;

/// Errors from ledger and lifecycle operations.
///
/// Variants are distinguishable so the HTTP layer can map them to the
/// right status codes; only `Engine` and `Database` indicate a fault in
/// the system rather than in the request.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("pool not found")]
    PoolNotFound,

    #[error("pool is {actual}, operation requires {required}")]
    WrongStatus {
        required: &'static str,
        actual: PoolStatus,
    },

    #[error("not the pool owner")]
    NotOwner,

    #[error("square {cell} is already claimed")]
    AlreadyClaimed { cell: CellRef },

    #[error("claim would exceed the limit of {max} squares per user")]
    CapExceeded { max: u32 },

    #[error("square {cell} is not claimed")]
    NotClaimed { cell: CellRef },

    #[error("square {cell} belongs to another user")]
    NotClaimant { cell: CellRef },

    #[error("invalid invite code")]
    BadInvite,

    #[error("{0}")]
    Validation(String),

    #[error("invite code hashing failed: {0}")]
    InviteHash(String),

    /// Corrupted stored state or an unavailable randomness source.
    #[error("engine invariant violated: {0}")]
    Engine(#[from] EngineError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
