//! Audit event system.
//!
//! This module provides the event types and channel infrastructure that feed
//! the pool audit trail.
//!
//! # Event Flow
//!
//! 1. A mutation (lifecycle, ledger, or sweeper) commits its transaction.
//! 2. It emits an [`AuditEvent`] through [`send_audit`].
//! 3. The `AuditWriter` processor persists the event to the `events` table.
//!
//! Emission is fire-and-forget: a full channel drops the event with a
//! warning instead of failing or delaying the mutation that produced it.

pub mod channels;
pub mod types;

pub use channels::{
    AuditEventReceiver, AuditEventSender, DEFAULT_CHANNEL_BUFFER, audit_event_channel, send_audit,
};

pub use types::{AuditEvent, EventKind};
