//! Application state shared across all request handlers.

use crate::config::SharedConfig;
use gridpool_core::db::Db;
use gridpool_core::events::AuditEventSender;
use gridpool_core::ledger::ClaimLedger;
use gridpool_core::lifecycle::PoolLifecycle;
use gridpool_sdk::token::SessionKey;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc
/// or is an Arc-backed handle already).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Db,
    /// Verifier for session tokens minted by the identity layer.
    pub session_key: SessionKey,
    /// Reloadable configuration sections (swapped on SIGHUP).
    pub config: SharedConfig,
    /// Sender feeding the audit writer, used by the manual sweep trigger.
    pub audit_tx: AuditEventSender,
    /// Square claim operations.
    pub ledger: ClaimLedger,
    /// Pool lifecycle operations.
    pub lifecycle: PoolLifecycle,
}

impl AppState {
    /// Create a new AppState, wiring the ledger and lifecycle to the
    /// given database handle and audit channel.
    pub fn new(
        db: Db,
        session_key: SessionKey,
        config: SharedConfig,
        audit_tx: AuditEventSender,
    ) -> Self {
        let ledger = ClaimLedger::new(db.clone(), audit_tx.clone());
        let lifecycle = PoolLifecycle::new(db.clone(), audit_tx.clone());
        Self {
            db,
            session_key,
            config,
            audit_tx,
            ledger,
            lifecycle,
        }
    }
}
