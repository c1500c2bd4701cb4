//! Score entry wire objects.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scoring period of a game.
///
/// Ordered by precedence: quarters first, FINAL last. Winner listings and
/// stored scores both follow this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreBucket {
    Q1,
    Q2,
    Q3,
    Q4,
    Final,
}

impl ScoreBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::Final => "FINAL",
        }
    }
}

impl std::fmt::Display for ScoreBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One score to store for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct ScoreEntry {
    pub bucket: ScoreBucket,
    #[validate(range(max = 999))]
    pub home_score: u32,
    #[validate(range(max = 999))]
    pub away_score: u32,
}

/// Request body for the score update endpoint.
///
/// Buckets named in `set` are upserted, buckets named in `clear` are
/// deleted, and buckets appearing in neither list are left untouched.
/// Sets apply before clears. Clearing a bucket with no stored score is a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScoreUpdateRequest {
    #[serde(default)]
    #[validate(nested)]
    pub set: Vec<ScoreEntry>,
    #[serde(default)]
    pub clear: Vec<ScoreBucket>,
}

/// A stored score as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDto {
    pub bucket: ScoreBucket,
    pub home_score: u32,
    pub away_score: u32,
    pub updated_at: i64,
}

/// Envelope for the score update endpoint: all stored scores after the
/// update, in bucket order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub scores: Vec<ScoreDto>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bucket_wire_names() {
        assert_eq!(serde_json::to_string(&ScoreBucket::Q3).unwrap(), r#""Q3""#);
        assert_eq!(
            serde_json::to_string(&ScoreBucket::Final).unwrap(),
            r#""FINAL""#
        );
        let parsed: ScoreBucket = serde_json::from_str(r#""FINAL""#).unwrap();
        assert_eq!(parsed, ScoreBucket::Final);
    }

    #[test]
    fn bucket_precedence() {
        assert!(ScoreBucket::Q1 < ScoreBucket::Q2);
        assert!(ScoreBucket::Q4 < ScoreBucket::Final);
    }

    #[test]
    fn score_bounds() {
        let ok = ScoreUpdateRequest {
            set: vec![ScoreEntry {
                bucket: ScoreBucket::Q1,
                home_score: 999,
                away_score: 0,
            }],
            clear: vec![],
        };
        assert!(ok.validate().is_ok());

        let too_big = ScoreUpdateRequest {
            set: vec![ScoreEntry {
                bucket: ScoreBucket::Q1,
                home_score: 1000,
                away_score: 0,
            }],
            clear: vec![],
        };
        assert!(too_big.validate().is_err());
    }

    #[test]
    fn missing_lists_default_empty() {
        let req: ScoreUpdateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.set.is_empty());
        assert!(req.clear.is_empty());
    }
}
