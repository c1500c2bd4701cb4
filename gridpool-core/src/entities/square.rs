use gridpool_sdk::objects::board::{CellRef, SquareDto};
use uuid::Uuid;

/// One cell of a pool's hundred-square grid.
///
/// The four claim fields are set together by a claim and cleared together
/// by an unclaim; a row with only some of them populated is corrupt.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Square {
    pub pool_id: Uuid,
    pub row: u8,
    pub col: u8,
    pub claimed_by: Option<Uuid>,
    pub claimed_name: Option<String>,
    pub claimed_email: Option<String>,
    pub claimed_at: Option<i64>,
}

impl Square {
    /// Bulk-insert the hundred unclaimed cells for a new pool.
    pub async fn insert_grid_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let mut builder =
            sqlx::QueryBuilder::<sqlx::Sqlite>::new("INSERT INTO squares (pool_id, row, col) ");
        builder.push_values(
            (0u8..10).flat_map(|row| (0u8..10).map(move |col| (row, col))),
            |mut b, (row, col)| {
                b.push_bind(pool_id).push_bind(row).push_bind(col);
            },
        );
        builder.build().execute(&mut **tx).await?;
        Ok(())
    }

    /// All hundred cells of a pool, row-major.
    pub async fn list_for_pool(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
    ) -> Result<Vec<Square>, sqlx::Error> {
        sqlx::query_as::<_, Square>(
            "SELECT * FROM squares WHERE pool_id = ?1 ORDER BY row, col",
        )
        .bind(pool_id)
        .fetch_all(db)
        .await
    }

    pub async fn get_cell(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
        cell: CellRef,
    ) -> Result<Option<Square>, sqlx::Error> {
        sqlx::query_as::<_, Square>(
            "SELECT * FROM squares WHERE pool_id = ?1 AND row = ?2 AND col = ?3",
        )
        .bind(pool_id)
        .bind(cell.row)
        .bind(cell.col)
        .fetch_optional(db)
        .await
    }

    /// How many squares `user_id` currently holds in the pool.
    pub async fn count_claimed_by(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
        user_id: Uuid,
    ) -> Result<u32, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM squares WHERE pool_id = ?1 AND claimed_by = ?2",
        )
        .bind(pool_id)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(count as u32)
    }

    /// Stamp one cell with the claimant's identity.
    pub async fn stamp_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
        cell: CellRef,
        user_id: Uuid,
        name: &str,
        email: &str,
        claimed_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE squares
            SET claimed_by = ?1, claimed_name = ?2, claimed_email = ?3, claimed_at = ?4
            WHERE pool_id = ?5 AND row = ?6 AND col = ?7
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(claimed_at)
        .bind(pool_id)
        .bind(cell.row)
        .bind(cell.col)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Release one cell back to unclaimed.
    pub async fn clear_cell_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
        cell: CellRef,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE squares
            SET claimed_by = NULL, claimed_name = NULL, claimed_email = NULL, claimed_at = NULL
            WHERE pool_id = ?1 AND row = ?2 AND col = ?3
            "#,
        )
        .bind(pool_id)
        .bind(cell.row)
        .bind(cell.col)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Release every claimed cell of the pool. Returns how many were held.
    pub async fn clear_all_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE squares
            SET claimed_by = NULL, claimed_name = NULL, claimed_email = NULL, claimed_at = NULL
            WHERE pool_id = ?1 AND claimed_by IS NOT NULL
            "#,
        )
        .bind(pool_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}

impl From<Square> for SquareDto {
    fn from(square: Square) -> Self {
        SquareDto {
            row: square.row,
            col: square.col,
            claimed_by: square.claimed_by,
            claimed_name: square.claimed_name,
            claimed_email: square.claimed_email,
            claimed_at: square.claimed_at,
        }
    }
}
