//! Board state and square claim wire objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::pool::PoolDto;
use super::score::ScoreDto;

/// Grid coordinates of one square, both in `0..=9`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Validate,
)]
pub struct CellRef {
    #[validate(range(max = 9))]
    pub row: u8,
    #[validate(range(max = 9))]
    pub col: u8,
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Request body for claiming a batch of squares.
///
/// The whole batch succeeds or fails together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClaimSquaresRequest {
    #[validate(length(min = 1, max = 25), nested)]
    pub squares: Vec<CellRef>,
}

/// Response for a successful claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSquaresResponse {
    /// Number of squares stamped by this request.
    pub claimed: usize,
}

/// One square of the board, with its claim if any.
///
/// The four claim fields are always either all present or all absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquareDto {
    pub row: u8,
    pub col: u8,
    pub claimed_by: Option<Uuid>,
    pub claimed_name: Option<String>,
    pub claimed_email: Option<String>,
    pub claimed_at: Option<i64>,
}

/// Randomized axis digits for a numbered pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisDto {
    /// Column digits: away-team score digit per column index.
    pub col_digits: [u8; 10],
    /// Row digits: home-team score digit per row index.
    pub row_digits: [u8; 10],
    pub randomized_at: i64,
}

/// Complete board state for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub pool: PoolDto,
    pub squares: Vec<SquareDto>,
    /// Present once the pool has been randomized.
    pub axis: Option<AxisDto>,
    pub scores: Vec<ScoreDto>,
    /// How many squares the calling user holds; absent when unauthenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_square_count: Option<u32>,
}

/// Envelope for the randomize endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisResponse {
    pub axis: AxisDto,
}

/// Response for an owner clearing the whole board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearBoardResponse {
    /// Number of claims released.
    pub cleared: u64,
}
