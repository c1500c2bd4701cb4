//! Database entities and their queries.
//!
//! Timestamps are stored as unix-epoch milliseconds (`i64`) throughout;
//! UUIDs are bound as native blobs.

pub mod axis;
pub mod event;
pub mod pool;
pub mod score;
pub mod square;

use gridpool_sdk::objects::pool::{PoolStatus as SdkPoolStatus, Visibility as SdkVisibility};
use gridpool_sdk::objects::score::ScoreBucket as SdkScoreBucket;

/// Milliseconds since the unix epoch.
pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Pool lifecycle status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `gridpool_sdk::objects::pool::PoolStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum PoolStatus {
    Open,
    Locked,
    Numbered,
    Completed,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Locked => "locked",
            Self::Numbered => "numbered",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PoolStatus> for SdkPoolStatus {
    fn from(value: PoolStatus) -> Self {
        match value {
            PoolStatus::Open => SdkPoolStatus::Open,
            PoolStatus::Locked => SdkPoolStatus::Locked,
            PoolStatus::Numbered => SdkPoolStatus::Numbered,
            PoolStatus::Completed => SdkPoolStatus::Completed,
        }
    }
}

impl From<SdkPoolStatus> for PoolStatus {
    fn from(value: SdkPoolStatus) -> Self {
        match value {
            SdkPoolStatus::Open => PoolStatus::Open,
            SdkPoolStatus::Locked => PoolStatus::Locked,
            SdkPoolStatus::Numbered => PoolStatus::Numbered,
            SdkPoolStatus::Completed => PoolStatus::Completed,
        }
    }
}

/// Pool visibility for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `gridpool_sdk::objects::pool::Visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl From<Visibility> for SdkVisibility {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::Public => SdkVisibility::Public,
            Visibility::Private => SdkVisibility::Private,
        }
    }
}

impl From<SdkVisibility> for Visibility {
    fn from(value: SdkVisibility) -> Self {
        match value {
            SdkVisibility::Public => Visibility::Public,
            SdkVisibility::Private => Visibility::Private,
        }
    }
}

/// Scoring bucket for database operations, ordered by period precedence.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `gridpool_sdk::objects::score::ScoreBucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum ScoreBucket {
    Q1,
    Q2,
    Q3,
    Q4,
    Final,
}

impl From<ScoreBucket> for SdkScoreBucket {
    fn from(value: ScoreBucket) -> Self {
        match value {
            ScoreBucket::Q1 => SdkScoreBucket::Q1,
            ScoreBucket::Q2 => SdkScoreBucket::Q2,
            ScoreBucket::Q3 => SdkScoreBucket::Q3,
            ScoreBucket::Q4 => SdkScoreBucket::Q4,
            ScoreBucket::Final => SdkScoreBucket::Final,
        }
    }
}

impl From<SdkScoreBucket> for ScoreBucket {
    fn from(value: SdkScoreBucket) -> Self {
        match value {
            SdkScoreBucket::Q1 => ScoreBucket::Q1,
            SdkScoreBucket::Q2 => ScoreBucket::Q2,
            SdkScoreBucket::Q3 => ScoreBucket::Q3,
            SdkScoreBucket::Q4 => ScoreBucket::Q4,
            SdkScoreBucket::Final => ScoreBucket::Final,
        }
    }
}
