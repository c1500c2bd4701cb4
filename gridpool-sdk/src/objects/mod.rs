//! Wire objects for the Gridpool HTTP API.
//!
//! Request types carry [`validator::Validate`] implementations so the
//! server can reject malformed input before touching the store; response
//! types are plain serde data.

pub mod board;
pub mod event;
pub mod pool;
pub mod score;
pub mod winner;
