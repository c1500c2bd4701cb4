//! Background processors.
//!
//! This module contains the processors that run alongside the HTTP server:
//!
//! - `AuditWriter`: receives `AuditEvent`, appends to the events table
//! - `AutoLockSweeper`: on a timer, locks and randomizes overdue pools

pub mod audit_writer;
pub mod auto_lock;

pub use audit_writer::AuditWriter;
pub use auto_lock::{AutoLockSweeper, sweep_once};
