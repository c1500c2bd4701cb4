use crate::entities::{PoolStatus, Visibility, now_millis};
use gridpool_sdk::objects::pool::{PoolChange, PoolDto, PoolSummary};
use uuid::Uuid;

/// One betting pool and its settings.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Pool {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub game_name: String,
    /// Kickoff time, unix milliseconds. Pools past this point are picked
    /// up by the auto-lock sweeper.
    pub game_time: i64,
    pub entry_fee_info: Option<String>,
    pub square_price: f64,
    pub max_squares_per_user: u32,
    pub visibility: Visibility,
    /// Argon2 hash of the invite code; the plaintext is never stored.
    pub invite_code_hash: Option<String>,
    pub status: PoolStatus,
    pub rules: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub created_at: i64,
}

/// Fields required to insert a pool. Status always starts at `open`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolInsert {
    pub owner_id: Uuid,
    pub name: String,
    pub game_name: String,
    pub game_time: i64,
    pub entry_fee_info: Option<String>,
    pub square_price: f64,
    pub max_squares_per_user: u32,
    pub visibility: Visibility,
    pub invite_code_hash: Option<String>,
    pub rules: Option<String>,
    pub home_team: String,
    pub away_team: String,
}

impl Pool {
    /// Insert the pool row inside `tx`. The hundred squares are created
    /// separately within the same transaction.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        insert: PoolInsert,
    ) -> Result<Pool, sqlx::Error> {
        sqlx::query_as::<_, Pool>(
            r#"
            INSERT INTO pools (
                id, owner_id, name, game_name, game_time, entry_fee_info,
                square_price, max_squares_per_user, visibility,
                invite_code_hash, status, rules, home_team, away_team, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(insert.owner_id)
        .bind(insert.name)
        .bind(insert.game_name)
        .bind(insert.game_time)
        .bind(insert.entry_fee_info)
        .bind(insert.square_price)
        .bind(insert.max_squares_per_user)
        .bind(insert.visibility)
        .bind(insert.invite_code_hash)
        .bind(PoolStatus::Open)
        .bind(insert.rules)
        .bind(insert.home_team)
        .bind(insert.away_team)
        .bind(now_millis())
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(
        db: impl sqlx::SqliteExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<Pool>, sqlx::Error> {
        sqlx::query_as::<_, Pool>("SELECT * FROM pools WHERE id = ?1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Public listing, newest first.
    pub async fn list_public(
        db: impl sqlx::SqliteExecutor<'_>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Pool>, sqlx::Error> {
        sqlx::query_as::<_, Pool>(
            r#"
            SELECT * FROM pools
            WHERE visibility = ?1
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(Visibility::Public)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Pools owned by `owner_id`, newest first.
    pub async fn list_by_owner(
        db: impl sqlx::SqliteExecutor<'_>,
        owner_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Pool>, sqlx::Error> {
        sqlx::query_as::<_, Pool>(
            r#"
            SELECT * FROM pools
            WHERE owner_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Pools where `user_id` holds at least one square, newest first.
    pub async fn list_by_member(
        db: impl sqlx::SqliteExecutor<'_>,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Pool>, sqlx::Error> {
        sqlx::query_as::<_, Pool>(
            r#"
            SELECT DISTINCT p.* FROM pools p
            JOIN squares s ON s.pool_id = p.id
            WHERE s.claimed_by = ?1
            ORDER BY p.created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Pools the sweeper must process: still open or locked with a game
    /// time at or before `now`.
    pub async fn list_overdue(
        db: impl sqlx::SqliteExecutor<'_>,
        now: i64,
    ) -> Result<Vec<Pool>, sqlx::Error> {
        sqlx::query_as::<_, Pool>(
            r#"
            SELECT * FROM pools
            WHERE status IN (?1, ?2) AND game_time <= ?3
            ORDER BY game_time
            "#,
        )
        .bind(PoolStatus::Open)
        .bind(PoolStatus::Locked)
        .bind(now)
        .fetch_all(db)
        .await
    }

    pub async fn update_status_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: Uuid,
        status: PoolStatus,
    ) -> Result<Pool, sqlx::Error> {
        sqlx::query_as::<_, Pool>("UPDATE pools SET status = ?1 WHERE id = ?2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Apply one settings change. Each change is its own static statement;
    /// atomicity comes from the enclosing transaction.
    pub async fn apply_change_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: Uuid,
        change: &PoolChange,
    ) -> Result<(), sqlx::Error> {
        let query = match change {
            PoolChange::Name(v) => {
                sqlx::query("UPDATE pools SET name = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::GameName(v) => {
                sqlx::query("UPDATE pools SET game_name = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::GameTime(v) => {
                sqlx::query("UPDATE pools SET game_time = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::EntryFeeInfo(v) => {
                sqlx::query("UPDATE pools SET entry_fee_info = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::SquarePrice(v) => {
                sqlx::query("UPDATE pools SET square_price = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::MaxSquaresPerUser(v) => {
                sqlx::query("UPDATE pools SET max_squares_per_user = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::Rules(v) => {
                sqlx::query("UPDATE pools SET rules = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::HomeTeam(v) => {
                sqlx::query("UPDATE pools SET home_team = ?1 WHERE id = ?2").bind(v)
            }
            PoolChange::AwayTeam(v) => {
                sqlx::query("UPDATE pools SET away_team = ?1 WHERE id = ?2").bind(v)
            }
        };
        query.bind(id).execute(&mut **tx).await?;
        Ok(())
    }

    /// Delete the pool; squares, axis, scores, and events cascade.
    pub async fn delete_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM pools WHERE id = ?1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            id: self.id,
            name: self.name.clone(),
            game_name: self.game_name.clone(),
            game_time: self.game_time,
            status: self.status.into(),
        }
    }
}

impl From<Pool> for PoolDto {
    fn from(pool: Pool) -> Self {
        PoolDto {
            id: pool.id,
            owner_id: pool.owner_id,
            name: pool.name,
            game_name: pool.game_name,
            game_time: pool.game_time,
            entry_fee_info: pool.entry_fee_info,
            square_price: pool.square_price,
            max_squares_per_user: pool.max_squares_per_user,
            visibility: pool.visibility.into(),
            status: pool.status.into(),
            rules: pool.rules,
            home_team: pool.home_team,
            away_team: pool.away_team,
            created_at: pool.created_at,
        }
    }
}
