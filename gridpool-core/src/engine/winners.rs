//! Winner resolution for recorded scores.
//!
//! The winning cell for a score line is found by taking the last digit of
//! each team's score and looking up the position of that digit on the
//! matching axis: the home digit picks the row, the away digit picks the
//! column.

use std::collections::HashMap;

use gridpool_sdk::objects::winner::WinnerDto;

use crate::entities::axis::AxisAssignment;
use crate::entities::score::Score;
use crate::entities::square::Square;

use super::{Digits, EngineError};

/// The cell a score line lands on, with the digits that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinningCell {
    pub row: u8,
    pub col: u8,
    pub home_digit: u8,
    pub away_digit: u8,
}

/// Locate the cell for one score line on the given axes.
pub fn winning_cell(
    home_score: u32,
    away_score: u32,
    col_digits: &Digits,
    row_digits: &Digits,
) -> Result<WinningCell, EngineError> {
    let home_digit = (home_score % 10) as u8;
    let away_digit = (away_score % 10) as u8;
    Ok(WinningCell {
        row: row_digits.position_of(home_digit)?,
        col: col_digits.position_of(away_digit)?,
        home_digit,
        away_digit,
    })
}

/// Resolve every recorded score line to its winning cell and claimant.
///
/// Score lines keep their input order. A winning cell that is unclaimed,
/// or absent from `squares` entirely, still produces a winner entry; its
/// claimant fields are just `None`.
pub fn resolve_winners(
    scores: &[Score],
    axis: &AxisAssignment,
    squares: &[Square],
) -> Result<Vec<WinnerDto>, EngineError> {
    let by_cell: HashMap<(u8, u8), &Square> = squares
        .iter()
        .map(|square| ((square.row, square.col), square))
        .collect();

    let mut winners = Vec::with_capacity(scores.len());
    for score in scores {
        let cell = winning_cell(
            score.home_score,
            score.away_score,
            &axis.col_digits.0,
            &axis.row_digits.0,
        )?;
        let square = by_cell.get(&(cell.row, cell.col));
        winners.push(WinnerDto {
            bucket: score.bucket.into(),
            row: cell.row,
            col: cell.col,
            home_score: score.home_score,
            away_score: score.away_score,
            claimed_by: square.and_then(|s| s.claimed_by),
            claimed_name: square.and_then(|s| s.claimed_name.clone()),
        });
    }
    Ok(winners)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::ScoreBucket;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn test_axis() -> AxisAssignment {
        AxisAssignment {
            pool_id: Uuid::new_v4(),
            col_digits: Json(Digits::try_from([3, 0, 7, 4, 1, 8, 5, 2, 9, 6]).unwrap()),
            row_digits: Json(Digits::try_from([2, 5, 8, 1, 4, 7, 0, 3, 6, 9]).unwrap()),
            randomized_at: 0,
        }
    }

    fn score(bucket: ScoreBucket, home_score: u32, away_score: u32) -> Score {
        Score {
            pool_id: Uuid::new_v4(),
            bucket,
            home_score,
            away_score,
            updated_at: 0,
        }
    }

    fn claimed_square(row: u8, col: u8, user_id: Uuid, name: &str) -> Square {
        Square {
            pool_id: Uuid::new_v4(),
            row,
            col,
            claimed_by: Some(user_id),
            claimed_name: Some(name.to_owned()),
            claimed_email: Some(format!("{name}@example.com")),
            claimed_at: Some(0),
        }
    }

    #[test]
    fn winning_cell_uses_last_digit_of_each_score() {
        let axis = test_axis();
        let cols = &axis.col_digits.0;
        let rows = &axis.row_digits.0;

        let cell = winning_cell(17, 14, cols, rows).unwrap();
        assert_eq!((cell.row, cell.col), (5, 3));
        assert_eq!((cell.home_digit, cell.away_digit), (7, 4));

        assert_eq!(
            winning_cell(0, 0, cols, rows).map(|c| (c.row, c.col)).unwrap(),
            (6, 1)
        );
        assert_eq!(
            winning_cell(23, 30, cols, rows).map(|c| (c.row, c.col)).unwrap(),
            (7, 1)
        );
        assert_eq!(
            winning_cell(19, 29, cols, rows).map(|c| (c.row, c.col)).unwrap(),
            (9, 8)
        );
    }

    #[test]
    fn resolve_winners_reports_claimants_in_score_order() {
        let axis = test_axis();
        let alice = Uuid::new_v4();
        let squares = vec![
            claimed_square(5, 3, alice, "alice"),
            Square {
                pool_id: Uuid::new_v4(),
                row: 6,
                col: 1,
                claimed_by: None,
                claimed_name: None,
                claimed_email: None,
                claimed_at: None,
            },
        ];
        let scores = vec![
            score(ScoreBucket::Q1, 7, 3),
            score(ScoreBucket::Q2, 17, 14),
            score(ScoreBucket::Final, 0, 0),
        ];

        let winners = resolve_winners(&scores, &axis, &squares).unwrap();
        assert_eq!(winners.len(), 3);

        // Q1 7-3 lands on (5, 0), a cell not even present in `squares`.
        assert_eq!((winners[0].row, winners[0].col), (5, 0));
        assert_eq!(winners[0].claimed_by, None);

        assert_eq!((winners[1].row, winners[1].col), (5, 3));
        assert_eq!(winners[1].claimed_by, Some(alice));
        assert_eq!(winners[1].claimed_name.as_deref(), Some("alice"));
        assert_eq!(winners[1].home_score, 17);
        assert_eq!(winners[1].away_score, 14);

        // FINAL 0-0 lands on an unclaimed cell.
        assert_eq!((winners[2].row, winners[2].col), (6, 1));
        assert_eq!(winners[2].claimed_by, None);
    }
}
