//! AuditWriter processor.
//!
//! The AuditWriter is responsible for:
//! - Receiving `AuditEvent` from the queue
//! - Appending each event to the `events` table
//!
//! A failed insert is logged and skipped. The audit trail is advisory, so
//! the writer never blocks or fails the mutation that emitted an event.

use crate::db::Db;
use crate::entities::event::EventRecord;
use crate::events::AuditEventReceiver;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// AuditWriter drains the audit channel into the events table.
pub struct AuditWriter {
    db: Db,
    event_rx: AuditEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl AuditWriter {
    /// Create a new AuditWriter.
    ///
    /// # Arguments
    ///
    /// * `db` - Database handle
    /// * `event_rx` - Receiver for AuditEvent events
    /// * `shutdown_rx` - Receiver for shutdown signal
    pub fn new(db: Db, event_rx: AuditEventReceiver, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            db,
            event_rx,
            shutdown_rx,
        }
    }

    /// Run the AuditWriter until shutdown or until every sender is gone.
    pub async fn run(mut self) {
        info!("AuditWriter started");

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("AuditWriter received shutdown signal");
                        break;
                    }
                }

                // Receive AuditEvent events
                Some(event) = self.event_rx.recv() => {
                    debug!(pool_id = %event.pool_id, kind = %event.kind, "Received audit event");

                    if let Err(e) = EventRecord::insert(&self.db, &event).await {
                        warn!(
                            pool_id = %event.pool_id,
                            kind = %event.kind,
                            error = %e,
                            "Failed to persist audit event"
                        );
                    }
                }

                else => {
                    info!("Audit event channel closed");
                    break;
                }
            }
        }

        info!("AuditWriter shutdown complete");
    }
}
