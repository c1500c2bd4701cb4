//! Pool lifecycle and settings wire objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Lifecycle status of a pool.
///
/// Transitions move forward through `open → locked → numbered → completed`;
/// `unlock`, `unrandomize`, and clearing the FINAL score walk them back one
/// step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Open,
    Locked,
    Numbered,
    Completed,
}

/// Listing visibility of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// A pool as returned by the API.
///
/// The invite code hash never leaves the server; private pools are entered
/// through the join endpoint instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub game_name: String,
    /// Kickoff time, unix milliseconds.
    pub game_time: i64,
    pub entry_fee_info: Option<String>,
    pub square_price: f64,
    pub max_squares_per_user: u32,
    pub visibility: Visibility,
    pub status: PoolStatus,
    pub rules: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub created_at: i64,
}

/// Minimal pool view returned to users who have not joined a private pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSummary {
    pub id: Uuid,
    pub name: String,
    pub game_name: String,
    pub game_time: i64,
    pub status: PoolStatus,
}

/// Request body for creating a new pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreatePoolRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub game_name: String,
    /// Kickoff time, unix milliseconds.
    #[validate(range(min = 1))]
    pub game_time: i64,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub entry_fee_info: Option<String>,
    #[validate(range(min = 0.0, max = 10000.0))]
    pub square_price: f64,
    #[validate(range(min = 1, max = 100))]
    pub max_squares_per_user: u32,
    pub visibility: Visibility,
    /// Only meaningful for private pools. Generated server-side when
    /// omitted; normalized to uppercase either way.
    #[serde(default)]
    #[validate(length(equal = 8))]
    pub invite_code: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub rules: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub home_team: String,
    #[validate(length(min = 1, max = 50))]
    pub away_team: String,
}

/// Response for pool creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoolResponse {
    pub pool: PoolDto,
    /// Plaintext invite code, returned exactly once at creation. Only the
    /// hash is stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
}

/// One explicitly supplied settings change.
///
/// Partial updates are a list of these rather than a struct of optional
/// fields, so "this field was not supplied" and "this field was set to
/// null" cannot be confused. Nullable fields clear on an explicit `null`
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PoolChange {
    Name(String),
    GameName(String),
    GameTime(i64),
    EntryFeeInfo(Option<String>),
    SquarePrice(f64),
    MaxSquaresPerUser(u32),
    Rules(Option<String>),
    HomeTeam(String),
    AwayTeam(String),
}

impl PoolChange {
    /// Wire name of the changed field.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::GameName(_) => "game_name",
            Self::GameTime(_) => "game_time",
            Self::EntryFeeInfo(_) => "entry_fee_info",
            Self::SquarePrice(_) => "square_price",
            Self::MaxSquaresPerUser(_) => "max_squares_per_user",
            Self::Rules(_) => "rules",
            Self::HomeTeam(_) => "home_team",
            Self::AwayTeam(_) => "away_team",
        }
    }

    fn validate_value(&self) -> Result<(), ValidationError> {
        match self {
            Self::Name(v) | Self::GameName(v) => text_bounds(v, 1, 100),
            Self::HomeTeam(v) | Self::AwayTeam(v) => text_bounds(v, 1, 50),
            Self::EntryFeeInfo(Some(v)) => text_bounds(v, 0, 500),
            Self::Rules(Some(v)) => text_bounds(v, 0, 2000),
            Self::EntryFeeInfo(None) | Self::Rules(None) => Ok(()),
            Self::GameTime(t) => {
                if *t >= 1 {
                    Ok(())
                } else {
                    Err(out_of_range("game time must be a positive timestamp"))
                }
            }
            Self::SquarePrice(p) => {
                if p.is_finite() && (0.0..=10_000.0).contains(p) {
                    Ok(())
                } else {
                    Err(out_of_range("square price must be between 0 and 10000"))
                }
            }
            Self::MaxSquaresPerUser(m) => {
                if (1..=100).contains(m) {
                    Ok(())
                } else {
                    Err(out_of_range("max squares per user must be between 1 and 100"))
                }
            }
        }
    }
}

/// Request body for updating pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePoolRequest {
    pub changes: Vec<PoolChange>,
}

impl Validate for UpdatePoolRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.changes.is_empty() {
            let mut err = ValidationError::new("empty");
            err.message = Some("at least one change is required".into());
            errors.add("changes", err);
        }

        for change in &self.changes {
            if let Err(e) = change.validate_value() {
                errors.add(change.field_name(), e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Request body for joining a private pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct JoinPoolRequest {
    #[validate(length(equal = 8))]
    pub invite_code: String,
}

/// Response for a successful private-pool join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinPoolResponse {
    pub pool: PoolSummary,
}

/// Envelope for endpoints returning a single pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolResponse {
    pub pool: PoolDto,
}

/// Envelope for the pool listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolListResponse {
    pub pools: Vec<PoolDto>,
}

fn text_bounds(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("length must be between {min} and {max} characters").into());
        return Err(err);
    }
    Ok(())
}

fn out_of_range(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    err
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_create() -> CreatePoolRequest {
        CreatePoolRequest {
            name: "Office pool".into(),
            game_name: "Championship".into(),
            game_time: 1_900_000_000_000,
            entry_fee_info: None,
            square_price: 5.0,
            max_squares_per_user: 10,
            visibility: Visibility::Public,
            invite_code: None,
            rules: None,
            home_team: "Home".into(),
            away_team: "Away".into(),
        }
    }

    #[test]
    fn create_request_bounds() {
        assert!(valid_create().validate().is_ok());

        let mut req = valid_create();
        req.name = String::new();
        assert!(req.validate().is_err());

        let mut req = valid_create();
        req.square_price = 10_001.0;
        assert!(req.validate().is_err());

        let mut req = valid_create();
        req.max_squares_per_user = 0;
        assert!(req.validate().is_err());

        let mut req = valid_create();
        req.invite_code = Some("short".into());
        assert!(req.validate().is_err());
        req.invite_code = Some("ABCD1234".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_request_needs_changes() {
        let empty = UpdatePoolRequest { changes: vec![] };
        assert!(empty.validate().is_err());

        let ok = UpdatePoolRequest {
            changes: vec![
                PoolChange::SquarePrice(2.5),
                PoolChange::MaxSquaresPerUser(4),
            ],
        };
        assert!(ok.validate().is_ok());

        let bad = UpdatePoolRequest {
            changes: vec![PoolChange::MaxSquaresPerUser(101)],
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn pool_change_wire_format() {
        let change: PoolChange =
            serde_json::from_str(r#"{"field":"square_price","value":2.5}"#).unwrap();
        assert_eq!(change, PoolChange::SquarePrice(2.5));

        let clear: PoolChange =
            serde_json::from_str(r#"{"field":"rules","value":null}"#).unwrap();
        assert_eq!(clear, PoolChange::Rules(None));
        assert_eq!(clear.field_name(), "rules");
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PoolStatus::Numbered).unwrap(),
            r#""numbered""#
        );
        assert_eq!(
            serde_json::to_string(&Visibility::Private).unwrap(),
            r#""private""#
        );
    }
}
