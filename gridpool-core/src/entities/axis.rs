use gridpool_sdk::objects::board::AxisDto;
use sqlx::types::Json;
use uuid::Uuid;

use crate::engine::Digits;

use super::now_millis;

/// The randomized digit assignment for a pool's two axes.
///
/// `col_digits[i]` is the away-team digit over column `i`; `row_digits[i]`
/// is the home-team digit beside row `i`. Each is a permutation of 0-9,
/// drawn independently of the other.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AxisAssignment {
    pub pool_id: Uuid,
    pub col_digits: Json<Digits>,
    pub row_digits: Json<Digits>,
    pub randomized_at: i64,
}

impl AxisAssignment {
    /// Store a fresh assignment, replacing any previous one for the pool.
    pub async fn upsert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
        col_digits: Digits,
        row_digits: Digits,
    ) -> Result<AxisAssignment, sqlx::Error> {
        sqlx::query_as::<_, AxisAssignment>(
            r#"
            INSERT INTO axis_assignments (pool_id, col_digits, row_digits, randomized_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(pool_id) DO UPDATE SET
                col_digits = excluded.col_digits,
                row_digits = excluded.row_digits,
                randomized_at = excluded.randomized_at
            RETURNING *
            "#,
        )
        .bind(pool_id)
        .bind(Json(col_digits))
        .bind(Json(row_digits))
        .bind(now_millis())
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn get(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
    ) -> Result<Option<AxisAssignment>, sqlx::Error> {
        sqlx::query_as::<_, AxisAssignment>(
            "SELECT * FROM axis_assignments WHERE pool_id = ?1",
        )
        .bind(pool_id)
        .fetch_optional(db)
        .await
    }

    pub async fn delete_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM axis_assignments WHERE pool_id = ?1")
            .bind(pool_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

impl From<AxisAssignment> for AxisDto {
    fn from(axis: AxisAssignment) -> Self {
        AxisDto {
            col_digits: axis.col_digits.0.into_array(),
            row_digits: axis.row_digits.0.into_array(),
            randomized_at: axis.randomized_at,
        }
    }
}
