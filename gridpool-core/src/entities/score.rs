use gridpool_sdk::objects::score::ScoreDto;
use uuid::Uuid;

use super::{ScoreBucket, now_millis};

/// A recorded score line for one bucket of a pool's game.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Score {
    pub pool_id: Uuid,
    pub bucket: ScoreBucket,
    pub home_score: u32,
    pub away_score: u32,
    pub updated_at: i64,
}

impl Score {
    /// Insert or overwrite the score line for one bucket.
    pub async fn upsert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
        bucket: ScoreBucket,
        home_score: u32,
        away_score: u32,
    ) -> Result<Score, sqlx::Error> {
        sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO scores (pool_id, bucket, home_score, away_score, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(pool_id, bucket) DO UPDATE SET
                home_score = excluded.home_score,
                away_score = excluded.away_score,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(pool_id)
        .bind(bucket)
        .bind(home_score)
        .bind(away_score)
        .bind(now_millis())
        .fetch_one(&mut **tx)
        .await
    }

    /// Remove the score line for one bucket. Returns 0 when none was stored.
    pub async fn delete_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        pool_id: Uuid,
        bucket: ScoreBucket,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scores WHERE pool_id = ?1 AND bucket = ?2")
            .bind(pool_id)
            .bind(bucket)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// All stored score lines for the pool, in bucket order (Q1 first).
    pub async fn list_for_pool(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
    ) -> Result<Vec<Score>, sqlx::Error> {
        let mut scores = sqlx::query_as::<_, Score>("SELECT * FROM scores WHERE pool_id = ?1")
            .bind(pool_id)
            .fetch_all(db)
            .await?;
        scores.sort_by_key(|score| score.bucket);
        Ok(scores)
    }

    /// Whether the pool has a final score on record.
    pub async fn final_exists(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM scores WHERE pool_id = ?1 AND bucket = ?2)",
        )
        .bind(pool_id)
        .bind(ScoreBucket::Final)
        .fetch_one(db)
        .await
    }
}

impl From<Score> for ScoreDto {
    fn from(score: Score) -> Self {
        ScoreDto {
            bucket: score.bucket.into(),
            home_score: score.home_score,
            away_score: score.away_score,
            updated_at: score.updated_at,
        }
    }
}
