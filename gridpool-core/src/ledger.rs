//! Square claiming and releasing.
//!
//! All mutations run inside a single transaction so a claim either lands
//! completely or not at all; the audit event is emitted only after the
//! transaction commits.

use std::collections::HashSet;

use gridpool_sdk::objects::board::CellRef;
use tracing::info;
use uuid::Uuid;

use crate::db::Db;
use crate::entities::pool::Pool;
use crate::entities::square::Square;
use crate::entities::{PoolStatus, now_millis};
use crate::error::PoolError;
use crate::events::{AuditEvent, AuditEventSender, EventKind, send_audit};

/// Identity of the user claiming squares, stamped onto each cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimant {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

/// Handle for claiming and releasing squares on a pool's board.
#[derive(Clone)]
pub struct ClaimLedger {
    db: Db,
    audit_tx: AuditEventSender,
}

impl ClaimLedger {
    pub fn new(db: Db, audit_tx: AuditEventSender) -> Self {
        Self { db, audit_tx }
    }

    /// Claim a batch of squares for one user.
    ///
    /// The batch is atomic: if any cell is already claimed, or the batch
    /// would push the user past the pool's per-user limit, nothing is
    /// claimed. Every stamped cell shares one claim timestamp.
    pub async fn claim(
        &self,
        pool_id: Uuid,
        claimant: &Claimant,
        cells: &[CellRef],
    ) -> Result<usize, PoolError> {
        if cells.is_empty() {
            return Err(PoolError::Validation("no squares requested".into()));
        }
        let mut seen = HashSet::new();
        for cell in cells {
            if !seen.insert((cell.row, cell.col)) {
                return Err(PoolError::Validation(format!(
                    "square {cell} appears twice in the request"
                )));
            }
        }

        let mut tx = self.db.begin().await?;

        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        if pool.status != PoolStatus::Open {
            return Err(PoolError::WrongStatus {
                required: "open",
                actual: pool.status,
            });
        }

        for &cell in cells {
            let square = Square::get_cell(&mut *tx, pool_id, cell)
                .await?
                .ok_or_else(|| {
                    PoolError::Validation(format!("square {cell} does not exist"))
                })?;
            if square.claimed_by.is_some() {
                return Err(PoolError::AlreadyClaimed { cell });
            }
        }

        let held = Square::count_claimed_by(&mut *tx, pool_id, claimant.user_id).await?;
        if held as usize + cells.len() > pool.max_squares_per_user as usize {
            return Err(PoolError::CapExceeded {
                max: pool.max_squares_per_user,
            });
        }

        let claimed_at = now_millis();
        for &cell in cells {
            Square::stamp_tx(
                &mut tx,
                pool_id,
                cell,
                claimant.user_id,
                &claimant.name,
                &claimant.email,
                claimed_at,
            )
            .await?;
        }
        tx.commit().await?;

        info!(
            pool_id = %pool_id,
            user_id = %claimant.user_id,
            count = cells.len(),
            "squares claimed"
        );
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(claimant.user_id),
                EventKind::SquaresClaimed,
                serde_json::json!({ "count": cells.len(), "squares": cells }),
            ),
        );
        Ok(cells.len())
    }

    /// Release one square the user claimed earlier.
    pub async fn unclaim(
        &self,
        pool_id: Uuid,
        user_id: Uuid,
        cell: CellRef,
    ) -> Result<(), PoolError> {
        let mut tx = self.db.begin().await?;

        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        if pool.status != PoolStatus::Open {
            return Err(PoolError::WrongStatus {
                required: "open",
                actual: pool.status,
            });
        }

        let square = Square::get_cell(&mut *tx, pool_id, cell)
            .await?
            .ok_or_else(|| PoolError::Validation(format!("square {cell} does not exist")))?;
        match square.claimed_by {
            None => return Err(PoolError::NotClaimed { cell }),
            Some(holder) if holder != user_id => {
                return Err(PoolError::NotClaimant { cell });
            }
            Some(_) => {}
        }

        Square::clear_cell_tx(&mut tx, pool_id, cell).await?;
        tx.commit().await?;

        info!(pool_id = %pool_id, user_id = %user_id, cell = %cell, "square released");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(user_id),
                EventKind::SquareUnclaimed,
                serde_json::json!({ "row": cell.row, "col": cell.col }),
            ),
        );
        Ok(())
    }

    /// Release every claimed square. Owner only; allowed in any status.
    ///
    /// Returns how many squares were held before the wipe.
    pub async fn clear_board(&self, pool_id: Uuid, acting_user: Uuid) -> Result<u64, PoolError> {
        let mut tx = self.db.begin().await?;

        let pool = Pool::find_by_id(&mut *tx, pool_id)
            .await?
            .ok_or(PoolError::PoolNotFound)?;
        if pool.owner_id != acting_user {
            return Err(PoolError::NotOwner);
        }

        let cleared = Square::clear_all_tx(&mut tx, pool_id).await?;
        tx.commit().await?;

        info!(pool_id = %pool_id, cleared, "board cleared");
        send_audit(
            &self.audit_tx,
            AuditEvent::new(
                pool_id,
                Some(acting_user),
                EventKind::PoolUpdated,
                serde_json::json!({ "action": "board_cleared", "cleared": cleared }),
            ),
        );
        Ok(cleared)
    }

    /// How many squares the user holds in the pool right now.
    pub async fn user_square_count(&self, pool_id: Uuid, user_id: Uuid) -> Result<u32, PoolError> {
        Ok(Square::count_claimed_by(&self.db, pool_id, user_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::pool::PoolInsert;
    use crate::entities::Visibility;
    use crate::events::{AuditEventReceiver, audit_event_channel};

    async fn test_db() -> Db {
        let db = crate::db::connect_memory().await.unwrap();
        crate::db::MIGRATOR.run(&db).await.unwrap();
        db
    }

    async fn seed_pool(db: &Db, owner_id: Uuid, max_squares_per_user: u32) -> Pool {
        let mut tx = db.begin().await.unwrap();
        let pool = Pool::insert_tx(
            &mut tx,
            PoolInsert {
                owner_id,
                name: "Office pool".into(),
                game_name: "Championship".into(),
                game_time: 4_000_000_000_000,
                entry_fee_info: None,
                square_price: 5.0,
                max_squares_per_user,
                visibility: Visibility::Public,
                invite_code_hash: None,
                rules: None,
                home_team: "Home".into(),
                away_team: "Away".into(),
            },
        )
        .await
        .unwrap();
        Square::insert_grid_tx(&mut tx, pool.id).await.unwrap();
        tx.commit().await.unwrap();
        pool
    }

    fn ledger(db: &Db) -> (ClaimLedger, AuditEventReceiver) {
        let (tx, rx) = audit_event_channel();
        (ClaimLedger::new(db.clone(), tx), rx)
    }

    fn claimant(name: &str) -> Claimant {
        Claimant {
            user_id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{name}@example.com"),
        }
    }

    fn cell(row: u8, col: u8) -> CellRef {
        CellRef { row, col }
    }

    #[tokio::test]
    async fn claim_then_unclaim_round_trip() {
        let db = test_db().await;
        let (ledger, mut rx) = ledger(&db);
        let pool = seed_pool(&db, Uuid::new_v4(), 10).await;
        let alice = claimant("alice");

        let claimed = ledger
            .claim(pool.id, &alice, &[cell(0, 0), cell(3, 7)])
            .await
            .unwrap();
        assert_eq!(claimed, 2);
        assert_eq!(
            ledger.user_square_count(pool.id, alice.user_id).await.unwrap(),
            2
        );

        let stamped = Square::get_cell(&db, pool.id, cell(3, 7)).await.unwrap().unwrap();
        assert_eq!(stamped.claimed_by, Some(alice.user_id));
        assert_eq!(stamped.claimed_name.as_deref(), Some("alice"));
        assert_eq!(stamped.claimed_email.as_deref(), Some("alice@example.com"));
        assert!(stamped.claimed_at.is_some());

        ledger.unclaim(pool.id, alice.user_id, cell(0, 0)).await.unwrap();
        assert_eq!(
            ledger.user_square_count(pool.id, alice.user_id).await.unwrap(),
            1
        );
        let released = Square::get_cell(&db, pool.id, cell(0, 0)).await.unwrap().unwrap();
        assert_eq!(released.claimed_by, None);
        assert_eq!(released.claimed_at, None);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::SquaresClaimed);
        assert_eq!(first.payload["count"], 2);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.kind, EventKind::SquareUnclaimed);
        assert_eq!(second.payload["row"], 0);
    }

    #[tokio::test]
    async fn conflicting_claim_leaves_nothing_behind() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);
        let pool = seed_pool(&db, Uuid::new_v4(), 10).await;
        let alice = claimant("alice");
        let bob = claimant("bob");

        ledger.claim(pool.id, &alice, &[cell(0, 0)]).await.unwrap();

        let err = ledger
            .claim(pool.id, &bob, &[cell(1, 1), cell(0, 0)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PoolError::AlreadyClaimed { cell } if cell == CellRef { row: 0, col: 0 }
        ));
        // The available cell in the failed batch must not have been stamped.
        assert_eq!(
            ledger.user_square_count(pool.id, bob.user_id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn cap_is_enforced_for_the_whole_batch() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);
        let pool = seed_pool(&db, Uuid::new_v4(), 3).await;
        let alice = claimant("alice");

        ledger
            .claim(pool.id, &alice, &[cell(0, 0), cell(0, 1)])
            .await
            .unwrap();

        let err = ledger
            .claim(pool.id, &alice, &[cell(0, 2), cell(0, 3)])
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::CapExceeded { max: 3 }));
        assert_eq!(
            ledger.user_square_count(pool.id, alice.user_id).await.unwrap(),
            2
        );

        // Exactly reaching the cap is fine.
        ledger.claim(pool.id, &alice, &[cell(0, 2)]).await.unwrap();
    }

    #[tokio::test]
    async fn claims_require_an_open_pool() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);
        let pool = seed_pool(&db, Uuid::new_v4(), 10).await;

        let mut tx = db.begin().await.unwrap();
        Pool::update_status_tx(&mut tx, pool.id, PoolStatus::Locked).await.unwrap();
        tx.commit().await.unwrap();

        let err = ledger
            .claim(pool.id, &claimant("alice"), &[cell(2, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::WrongStatus { required: "open", .. }));
    }

    #[tokio::test]
    async fn duplicate_cells_in_one_request_are_rejected() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);
        let pool = seed_pool(&db, Uuid::new_v4(), 10).await;
        let alice = claimant("alice");

        let err = ledger
            .claim(pool.id, &alice, &[cell(2, 2), cell(2, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::Validation(_)));
        assert_eq!(
            ledger.user_square_count(pool.id, alice.user_id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unclaim_checks_holder_and_state() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);
        let pool = seed_pool(&db, Uuid::new_v4(), 10).await;
        let alice = claimant("alice");
        let bob = claimant("bob");

        ledger.claim(pool.id, &alice, &[cell(4, 4)]).await.unwrap();

        let err = ledger
            .unclaim(pool.id, bob.user_id, cell(4, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::NotClaimant { .. }));

        let err = ledger
            .unclaim(pool.id, alice.user_id, cell(5, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::NotClaimed { .. }));

        ledger.unclaim(pool.id, alice.user_id, cell(4, 4)).await.unwrap();
    }

    #[tokio::test]
    async fn clear_board_is_owner_only_and_counts_released_squares() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);
        let owner = Uuid::new_v4();
        let pool = seed_pool(&db, owner, 10).await;
        let alice = claimant("alice");

        ledger
            .claim(pool.id, &alice, &[cell(0, 0), cell(1, 1), cell(2, 2)])
            .await
            .unwrap();

        let err = ledger
            .clear_board(pool.id, alice.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::NotOwner));

        // A locked board can still be wiped by the owner.
        let mut tx = db.begin().await.unwrap();
        Pool::update_status_tx(&mut tx, pool.id, PoolStatus::Locked).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(ledger.clear_board(pool.id, owner).await.unwrap(), 3);
        assert_eq!(ledger.clear_board(pool.id, owner).await.unwrap(), 0);
        assert_eq!(
            ledger.user_square_count(pool.id, alice.user_id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_pool_is_reported() {
        let db = test_db().await;
        let (ledger, _rx) = ledger(&db);

        let err = ledger
            .claim(Uuid::new_v4(), &claimant("alice"), &[cell(0, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::PoolNotFound));
    }
}
