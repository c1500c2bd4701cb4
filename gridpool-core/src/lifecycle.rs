//! Pool lifecycle: creation, settings, status transitions, and scores.
//!
//! Every mutation runs in one transaction and re-reads the pool inside it,
//! so status checks cannot race with concurrent changes. Audit events are
//! emitted only after a successful commit.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use gridpool_sdk::objects::pool::{CreatePoolRequest, PoolChange, PoolSummary};
use gridpool_sdk::objects::score::{ScoreBucket as SdkScoreBucket, ScoreEntry};
use rand::Rng;
use ring::rand::SystemRandom;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::db::Db;
use crate::engine::Digits;
use crate::entities::axis::AxisAssignment;
use crate::entities::pool::{Pool, PoolInsert};
use crate::entities::score::Score;
use crate::entities::square::Square;
use crate::entities::{PoolStatus, Visibility};
use crate::error::PoolError;
use crate::events::{AuditEvent, AuditEventSender, EventKind, send_audit};

const INVITE_CODE_LEN: usize = 8;
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Handle for everything a pool owner does to a pool.
#[derive(Clone)]
pub struct PoolLifecycle {
    db: Db,
    audit_tx: AuditEventSender,
}

impl PoolLifecycle {
    pub fn new(db: Db, audit_tx: AuditEventSender) -> Self {
        Self { db, audit_tx }
    }

    /// Create a pool together with its hundred empty squares.
    ///
    /// For a private pool the invite code is taken from the request or
    /// generated, normalized to uppercase, and returned in plaintext
    /// exactly once; only its argon2 hash is stored.
    pub async fn create(
        &self,
        owner_id: Uuid,
        request: CreatePoolRequest,
    ) -> Result<(Pool, Option<String>), PoolError> {
        let visibility = Visibility::from(request.visibility);
        let invite_code = match visibility {
            Visibility::Private => Some(
                request
                    .invite_code
                    .as_deref()
                    .map(str::to_ascii_uppercase)
                    .unwrap_or_else(generate_invite_code),
            ),
            Visibility::Public => None,
        };
        let invite_code_hash = match &invite_code {
            Some(code) => Some(hash_invite_code(code)?),
            None => None,
        };

        let mut tx = self.db.begin().await?;
        let pool = Pool::insert_tx(
            &mut tx,
            PoolInsert {
                owner_id,
                name: request.name,
                game_name: request.game_name,
                game_time: request.game_time,
                entry_fee_info: request.entry_fee_info,
                square_price: request.square_price,
                max_squares_per_user: request.max_squares_per_user,
                visibility,
                invite_code_hash,
                rules: request.rules,
                home_team: request.home_team,
                away_team: request.away_team,
            },
        )
        .await?;
        Square::insert_grid_tx(&mut tx, pool.id).await?;
        tx.commit().await?;

        info!(pool_id = %pool.id, owner_id = %owner_id, name = %pool.name, "pool created");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool.id,
                Some(owner_id),
                EventKind::PoolCreated,
                json!({ "pool_name": pool.name, "game_name": pool.game_name }),
            ),
        );
        Ok((pool, invite_code))
    }

    /// Apply a batch of settings changes. Owner only, open pools only.
    pub async fn update_settings(
        &self,
        pool_id: Uuid,
        acting_user: Uuid,
        changes: &[PoolChange],
    ) -> Result<Pool, PoolError> {
        if changes.is_empty() {
            return Err(PoolError::Validation("at least one change is required".into()));
        }

        let mut tx = self.db.begin().await?;
        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        ensure_owner(&pool, acting_user)?;
        ensure_status(&pool, PoolStatus::Open)?;

        let mut deltas = serde_json::Map::new();
        for change in changes {
            deltas.insert(change.field_name().to_owned(), change_delta(&pool, change));
            Pool::apply_change_tx(&mut tx, pool_id, change).await?;
        }
        let updated = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        tx.commit().await?;

        info!(pool_id = %pool_id, fields = changes.len(), "pool settings updated");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::PoolUpdated,
                serde_json::Value::Object(deltas),
            ),
        );
        Ok(updated)
    }

    /// Delete a pool and everything attached to it. Owner only.
    pub async fn delete(&self, pool_id: Uuid, acting_user: Uuid) -> Result<(), PoolError> {
        let mut tx = self.db.begin().await?;
        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        ensure_owner(&pool, acting_user)?;
        Pool::delete_tx(&mut tx, pool_id).await?;
        tx.commit().await?;

        info!(pool_id = %pool_id, "pool deleted");
        Ok(())
    }

    /// Check an invite code against a private pool.
    ///
    /// Returns the summary a joining user is allowed to see. Public pools
    /// have no invite codes and reject the attempt outright.
    pub async fn verify_invite(
        &self,
        pool_id: Uuid,
        invite_code: &str,
    ) -> Result<PoolSummary, PoolError> {
        let pool = Pool::find_by_id(&self.db, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        if pool.visibility == Visibility::Public {
            return Err(PoolError::Validation(
                "pool is public and needs no invite code".into(),
            ));
        }
        let hash = pool
            .invite_code_hash
            .as_deref()
            .ok_or_else(|| PoolError::Validation("pool has no invite code".into()))?;

        let parsed =
            PasswordHash::new(hash).map_err(|err| PoolError::InviteHash(err.to_string()))?;
        Argon2::default()
            .verify_password(invite_code.to_ascii_uppercase().as_bytes(), &parsed)
            .map_err(|_| PoolError::BadInvite)?;
        Ok(pool.summary())
    }

    /// Close the board to further claims. Owner only, `open` to `locked`.
    pub async fn lock(&self, pool_id: Uuid, acting_user: Uuid) -> Result<Pool, PoolError> {
        let pool = self
            .transition(pool_id, acting_user, PoolStatus::Open, PoolStatus::Locked)
            .await?;
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::PoolLocked,
                json!({ "pool_name": pool.name }),
            ),
        );
        Ok(pool)
    }

    /// Reopen a locked board. Owner only, `locked` to `open`.
    pub async fn unlock(&self, pool_id: Uuid, acting_user: Uuid) -> Result<Pool, PoolError> {
        let pool = self
            .transition(pool_id, acting_user, PoolStatus::Locked, PoolStatus::Open)
            .await?;
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::PoolUnlocked,
                json!({ "pool_name": pool.name }),
            ),
        );
        Ok(pool)
    }

    /// Draw the axis digits. Owner only, `locked` to `numbered`.
    ///
    /// The two axes are drawn independently of each other.
    pub async fn randomize(
        &self,
        pool_id: Uuid,
        acting_user: Uuid,
    ) -> Result<AxisAssignment, PoolError> {
        let rng = SystemRandom::new();
        let col_digits = Digits::random(&rng).map_err(PoolError::Engine)?;
        let row_digits = Digits::random(&rng).map_err(PoolError::Engine)?;

        let mut tx = self.db.begin().await?;
        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        ensure_owner(&pool, acting_user)?;
        ensure_status(&pool, PoolStatus::Locked)?;

        let axis = AxisAssignment::upsert_tx(&mut tx, pool_id, col_digits, row_digits).await?;
        Pool::update_status_tx(&mut tx, pool_id, PoolStatus::Numbered).await?;
        tx.commit().await?;

        info!(pool_id = %pool_id, "axis digits drawn");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::PoolRandomized,
                json!({
                    "col_digits": col_digits.as_array(),
                    "row_digits": row_digits.as_array(),
                }),
            ),
        );
        Ok(axis)
    }

    /// Discard the axis digits. Owner only, `numbered` back to `locked`.
    ///
    /// Recorded scores survive; a later randomize draws fresh digits and
    /// the winners simply resolve differently.
    pub async fn unrandomize(&self, pool_id: Uuid, acting_user: Uuid) -> Result<Pool, PoolError> {
        let mut tx = self.db.begin().await?;
        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        ensure_owner(&pool, acting_user)?;
        ensure_status(&pool, PoolStatus::Numbered)?;

        AxisAssignment::delete_tx(&mut tx, pool_id).await?;
        let updated = Pool::update_status_tx(&mut tx, pool_id, PoolStatus::Locked).await?;
        tx.commit().await?;

        info!(pool_id = %pool_id, "axis digits discarded");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::PoolUnrandomized,
                json!({ "pool_name": updated.name }),
            ),
        );
        Ok(updated)
    }

    /// Record and remove score lines. Owner only, numbered or completed.
    ///
    /// Sets apply before clears. Recording a FINAL score completes the
    /// pool; clearing it moves a completed pool back to numbered. Returns
    /// every score line still stored, in bucket order.
    pub async fn update_scores(
        &self,
        pool_id: Uuid,
        acting_user: Uuid,
        set: &[ScoreEntry],
        clear: &[SdkScoreBucket],
    ) -> Result<Vec<Score>, PoolError> {
        if set.is_empty() && clear.is_empty() {
            return Err(PoolError::Validation("no score changes requested".into()));
        }

        let mut tx = self.db.begin().await?;
        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        ensure_owner(&pool, acting_user)?;
        if !matches!(pool.status, PoolStatus::Numbered | PoolStatus::Completed) {
            return Err(PoolError::WrongStatus {
                required: "numbered",
                actual: pool.status,
            });
        }

        for entry in set {
            Score::upsert_tx(
                &mut tx,
                pool_id,
                entry.bucket.into(),
                entry.home_score,
                entry.away_score,
            )
            .await?;
        }
        for &bucket in clear {
            Score::delete_tx(&mut tx, pool_id, bucket.into()).await?;
        }

        let has_final = Score::final_exists(&mut *tx, pool_id).await?;
        let completed_now = pool.status == PoolStatus::Numbered && has_final;
        if completed_now {
            Pool::update_status_tx(&mut tx, pool_id, PoolStatus::Completed).await?;
        } else if pool.status == PoolStatus::Completed && !has_final {
            Pool::update_status_tx(&mut tx, pool_id, PoolStatus::Numbered).await?;
        }
        let scores = Score::list_for_pool(&mut *tx, pool_id).await?;
        tx.commit().await?;

        info!(pool_id = %pool_id, set = set.len(), cleared = clear.len(), "scores updated");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::ScoreUpdated,
                json!({ "set": set, "clear": clear }),
            ),
        );
        if completed_now {
            send_audit(
                &self.audit_tx,
                AuditEvent::new(
                    pool_id,
                    Some(acting_user),
                    EventKind::PoolCompleted,
                    json!({ "pool_name": pool.name }),
                ),
            );
        }
        Ok(scores)
    }

    /// Owner-checked single-step status transition.
    async fn transition(
        &self,
        pool_id: Uuid,
        acting_user: Uuid,
        from: PoolStatus,
        to: PoolStatus,
    ) -> Result<Pool, PoolError> {
        let mut tx = self.db.begin().await?;
        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        ensure_owner(&pool, acting_user)?;
        ensure_status(&pool, from)?;
        let updated = Pool::update_status_tx(&mut tx, pool_id, to).await?;
        tx.commit().await?;
        info!(pool_id = %pool_id, from = %from, to = %to, "pool status changed");
        Ok(updated)
    }
}

fn ensure_owner(pool: &Pool, user_id: Uuid) -> Result<(), PoolError> {
    if pool.owner_id != user_id {
        return Err(PoolError::NotOwner);
    }
    Ok(())
}

fn ensure_status(pool: &Pool, required: PoolStatus) -> Result<(), PoolError> {
    if pool.status != required {
        return Err(PoolError::WrongStatus {
            required: required.as_str(),
            actual: pool.status,
        });
    }
    Ok(())
}

fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..INVITE_ALPHABET.len());
            INVITE_ALPHABET[idx] as char
        })
        .collect()
}

fn hash_invite_code(code: &str) -> Result<String, PoolError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PoolError::InviteHash(err.to_string()))
}

/// Old and new value of one changed field, for the audit payload.
fn change_delta(pool: &Pool, change: &PoolChange) -> serde_json::Value {
    match change {
        PoolChange::Name(v) => json!({ "from": pool.name, "to": v }),
        PoolChange::GameName(v) => json!({ "from": pool.game_name, "to": v }),
        PoolChange::GameTime(v) => json!({ "from": pool.game_time, "to": v }),
        PoolChange::EntryFeeInfo(v) => json!({ "from": pool.entry_fee_info, "to": v }),
        PoolChange::SquarePrice(v) => json!({ "from": pool.square_price, "to": v }),
        PoolChange::MaxSquaresPerUser(v) => json!({ "from": pool.max_squares_per_user, "to": v }),
        PoolChange::Rules(v) => json!({ "from": pool.rules, "to": v }),
        PoolChange::HomeTeam(v) => json!({ "from": pool.home_team, "to": v }),
        PoolChange::AwayTeam(v) => json!({ "from": pool.away_team, "to": v }),
    }
}
