//! Winner listing wire objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::score::ScoreBucket;

/// The winning square for one scoring period.
///
/// A winner can be an unclaimed square; the claimant fields are null in
/// that case and the prize handling is up to the pool's own rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerDto {
    pub bucket: ScoreBucket,
    pub row: u8,
    pub col: u8,
    pub home_score: u32,
    pub away_score: u32,
    pub claimed_by: Option<Uuid>,
    pub claimed_name: Option<String>,
}

/// Envelope for the winners endpoint, in bucket order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnersResponse {
    pub winners: Vec<WinnerDto>,
}
