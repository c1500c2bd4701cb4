#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod db;
pub mod engine;
pub mod entities;
pub mod error;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod processors;
