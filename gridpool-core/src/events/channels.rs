//! Audit event channel factory and send helper.

use super::types::AuditEvent;
use tokio::sync::mpsc;

/// Default buffer size for the audit event channel.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for audit events.
pub type AuditEventSender = mpsc::Sender<AuditEvent>;
/// Receiver handle for audit events.
pub type AuditEventReceiver = mpsc::Receiver<AuditEvent>;

/// Create a new audit event channel.
///
/// Returns a (sender, receiver) pair. Multiple senders can be cloned from
/// the returned sender; the single receiver belongs to the audit writer.
pub fn audit_event_channel() -> (AuditEventSender, AuditEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Hand an event to the audit writer without blocking the caller.
///
/// The audit trail is advisory: if the channel is full or the writer is
/// gone, the event is dropped with a warning and the mutation that emitted
/// it still succeeds.
pub fn send_audit(tx: &AuditEventSender, event: AuditEvent) {
    if let Err(err) = tx.try_send(event) {
        tracing::warn!(error = %err, "audit event dropped");
    }
}
