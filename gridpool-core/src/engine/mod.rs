//! Grid mechanics: digit permutations and winner resolution.
//!
//! Everything in this module is pure apart from drawing randomness; it
//! never touches the database. The lifecycle and the winners endpoint
//! feed it entity rows and get values back.

pub mod digits;
pub mod winners;

pub use digits::Digits;
pub use winners::{WinningCell, resolve_winners, winning_cell};

/// Errors from the grid engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The operating system's random source failed.
    #[error("random source failure")]
    RandomSource,
    /// A stored digit list was not a permutation of 0-9.
    #[error("digit list is not a permutation of 0-9")]
    NotAPermutation,
    /// An axis assignment has no position for the requested digit.
    #[error("digit {0} is missing from the axis assignment")]
    DigitMissing(u8),
}

impl From<ring::error::Unspecified> for EngineError {
    fn from(_: ring::error::Unspecified) -> Self {
        EngineError::RandomSource
    }
}
