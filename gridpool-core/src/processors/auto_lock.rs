//! AutoLockSweeper processor.
//!
//! The AutoLockSweeper is responsible for:
//! - Periodically listing pools whose game time has passed while still
//!   open or locked
//! - Locking and randomizing each one so the board is settled by kickoff
//!
//! Each overdue pool is swept in its own transaction, and the status is
//! re-read inside it: an owner acting between the listing and the sweep
//! makes the pool come out `skipped`, never double-processed. One pool
//! failing never stalls the rest of the pass.

use std::time::Duration;

use gridpool_sdk::objects::event::{SweepAction, SweepOutcome};
use ring::rand::SystemRandom;
use serde_json::json;
use tokio::sync::watch;
use tracing::{error, info};

use crate::db::Db;
use crate::engine::Digits;
use crate::entities::axis::AxisAssignment;
use crate::entities::pool::Pool;
use crate::entities::{PoolStatus, now_millis};
use crate::error::PoolError;
use crate::events::{AuditEvent, AuditEventSender, EventKind, send_audit};

/// AutoLockSweeper settles overdue pools on a timer.
pub struct AutoLockSweeper {
    db: Db,
    interval: Duration,
    audit_tx: AuditEventSender,
    shutdown_rx: watch::Receiver<bool>,
}

impl AutoLockSweeper {
    /// Create a new AutoLockSweeper.
    ///
    /// # Arguments
    ///
    /// * `db` - Database handle
    /// * `interval` - Time between sweep passes
    /// * `audit_tx` - Sender for audit events
    /// * `shutdown_rx` - Receiver for shutdown signal
    pub fn new(
        db: Db,
        interval: Duration,
        audit_tx: AuditEventSender,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            interval,
            audit_tx,
            shutdown_rx,
        }
    }

    /// Run the AutoLockSweeper.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "AutoLockSweeper started");

        loop {
            tokio::select! {
                biased;

                // Check for shutdown
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("AutoLockSweeper received shutdown signal");
                        break;
                    }
                }

                _ = tokio::time::sleep(self.interval) => {
                    match sweep_once(&self.db, &self.audit_tx).await {
                        Ok(outcomes) if !outcomes.is_empty() => {
                            info!(processed = outcomes.len(), "Sweep pass finished");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!(error = %e, "Sweep pass failed");
                        }
                    }
                }
            }
        }

        info!("AutoLockSweeper shutdown complete");
    }
}

/// One sweep pass over every overdue pool.
///
/// The manual sweep endpoint calls this directly, so the schedule and the
/// endpoint share one code path.
pub async fn sweep_once(
    db: &Db,
    audit_tx: &AuditEventSender,
) -> Result<Vec<SweepOutcome>, PoolError> {
    let overdue = Pool::list_overdue(db, now_millis()).await?;
    let mut outcomes = Vec::with_capacity(overdue.len());
    for pool in overdue {
        let outcome = match sweep_pool(db, audit_tx, &pool).await {
            Ok(action) => SweepOutcome {
                pool_id: pool.id,
                action,
                error: None,
            },
            Err(e) => {
                error!(pool_id = %pool.id, error = %e, "Failed to sweep pool");
                SweepOutcome {
                    pool_id: pool.id,
                    action: SweepAction::Failed,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Settle one overdue pool: lock if still open, then draw the axes.
async fn sweep_pool(
    db: &Db,
    audit_tx: &AuditEventSender,
    pool: &Pool,
) -> Result<SweepAction, PoolError> {
    let rng = SystemRandom::new();
    let col_digits = Digits::random(&rng)?;
    let row_digits = Digits::random(&rng)?;

    let mut tx = db.begin().await?;
    // Re-read inside the transaction; the owner may have acted since the
    // overdue listing was taken.
    let Some(current) = Pool::find_by_id(&mut *tx, pool.id).await? else {
        return Ok(SweepAction::Skipped);
    };
    let action = match current.status {
        PoolStatus::Open => SweepAction::LockedAndRandomized,
        PoolStatus::Locked => SweepAction::Randomized,
        PoolStatus::Numbered | PoolStatus::Completed => return Ok(SweepAction::Skipped),
    };

    AxisAssignment::upsert_tx(&mut tx, pool.id, col_digits, row_digits).await?;
    Pool::update_status_tx(&mut tx, pool.id, PoolStatus::Numbered).await?;
    tx.commit().await?;

    info!(pool_id = %pool.id, action = ?action, "Overdue pool settled");
    if action == SweepAction::LockedAndRandomized {
        send_audit(
            audit_tx,
            AuditEvent::new(
                pool.id,
                None,
                EventKind::PoolLocked,
                json!({ "auto_locked": true, "reason": "game time reached" }),
            ),
        );
    }
    send_audit(
        audit_tx,
        AuditEvent::new(
            pool.id,
            None,
            EventKind::PoolRandomized,
            json!({
                "auto_randomized": true,
                "reason": "game time reached",
                "col_digits": col_digits.as_array(),
                "row_digits": row_digits.as_array(),
            }),
        ),
    );
    Ok(action)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db;
    use crate::entities::pool::PoolInsert;
    use crate::entities::Visibility;
    use crate::events::{AuditEventReceiver, audit_event_channel};
    use uuid::Uuid;

    async fn test_db() -> Db {
        let db = db::connect_memory().await.unwrap();
        db::MIGRATOR.run(&db).await.unwrap();
        db
    }

    async fn seed_pool(db: &Db, game_time: i64) -> Pool {
        let mut tx = db.begin().await.unwrap();
        let pool = Pool::insert_tx(
            &mut tx,
            PoolInsert {
                owner_id: Uuid::new_v4(),
                name: "Office pool".into(),
                game_name: "Championship".into(),
                game_time,
                entry_fee_info: None,
                square_price: 0.0,
                max_squares_per_user: 10,
                visibility: Visibility::Public,
                invite_code_hash: None,
                rules: None,
                home_team: "Home".into(),
                away_team: "Away".into(),
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        pool
    }

    async fn set_status(db: &Db, pool_id: Uuid, status: PoolStatus) {
        let mut tx = db.begin().await.unwrap();
        Pool::update_status_tx(&mut tx, pool_id, status).await.unwrap();
        tx.commit().await.unwrap();
    }

    fn audit() -> (AuditEventSender, AuditEventReceiver) {
        audit_event_channel()
    }

    const PAST: i64 = 1_000;
    const FAR_FUTURE: i64 = 4_000_000_000_000;

    #[tokio::test]
    async fn overdue_open_pool_is_locked_and_randomized() {
        let db = test_db().await;
        let (tx, mut rx) = audit();
        let overdue = seed_pool(&db, PAST).await;
        let upcoming = seed_pool(&db, FAR_FUTURE).await;

        let outcomes = sweep_once(&db, &tx).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].pool_id, overdue.id);
        assert_eq!(outcomes[0].action, SweepAction::LockedAndRandomized);
        assert_eq!(outcomes[0].error, None);

        let settled = Pool::find_by_id(&db, overdue.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PoolStatus::Numbered);
        assert!(AxisAssignment::get(&db, overdue.id).await.unwrap().is_some());

        let untouched = Pool::find_by_id(&db, upcoming.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, PoolStatus::Open);

        let locked = rx.try_recv().unwrap();
        assert_eq!(locked.kind, EventKind::PoolLocked);
        assert_eq!(locked.actor_id, None);
        assert_eq!(locked.payload["auto_locked"], true);
        let randomized = rx.try_recv().unwrap();
        assert_eq!(randomized.kind, EventKind::PoolRandomized);
        assert_eq!(randomized.payload["auto_randomized"], true);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn overdue_locked_pool_is_only_randomized() {
        let db = test_db().await;
        let (tx, mut rx) = audit();
        let pool = seed_pool(&db, PAST).await;
        set_status(&db, pool.id, PoolStatus::Locked).await;

        let outcomes = sweep_once(&db, &tx).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].action, SweepAction::Randomized);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::PoolRandomized);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_listing_is_skipped_inside_the_transaction() {
        let db = test_db().await;
        let (tx, mut rx) = audit();
        let pool = seed_pool(&db, PAST).await;

        // The listing saw the pool open, but the status moved on before
        // the per-pool transaction ran.
        set_status(&db, pool.id, PoolStatus::Numbered).await;
        let action = sweep_pool(&db, &tx, &pool).await.unwrap();
        assert_eq!(action, SweepAction::Skipped);
        assert!(rx.try_recv().is_err());
        assert!(AxisAssignment::get(&db, pool.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_axes_are_drawn_independently() {
        let db = test_db().await;
        let (tx, _rx) = audit();
        let first = seed_pool(&db, PAST).await;
        let second = seed_pool(&db, PAST).await;

        sweep_once(&db, &tx).await.unwrap();

        // Two pools both drawing identical column and row digits is a
        // (1/10!)^2 fluke; a single shared draw would match every time.
        let mut saw_distinct_axes = false;
        for pool_id in [first.id, second.id] {
            let axis = AxisAssignment::get(&db, pool_id).await.unwrap().unwrap();
            if axis.col_digits.as_array() != axis.row_digits.as_array() {
                saw_distinct_axes = true;
            }
        }
        assert!(saw_distinct_axes);
    }

    #[tokio::test]
    async fn quiet_pass_returns_no_outcomes() {
        let db = test_db().await;
        let (tx, _rx) = audit();
        seed_pool(&db, FAR_FUTURE).await;

        let outcomes = sweep_once(&db, &tx).await.unwrap();
        assert!(outcomes.is_empty());
    }
}
