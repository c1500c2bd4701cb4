//! Gridpool SDK
//!
//! Shared wire objects and the session token scheme for Gridpool, a
//! self-hostable football squares pool server. Everything here is plain
//! serde data: the server depends on this crate for its request/response
//! shapes, and any client can depend on it to talk to a Gridpool server
//! without pulling in the server itself.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod objects;
pub mod token;
