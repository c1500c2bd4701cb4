use gridpool_sdk::objects::event::EventDto;
use sqlx::types::Json;
use uuid::Uuid;

use crate::events::AuditEvent;

use super::now_millis;

/// One row of the append-only audit trail.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub kind: String,
    pub payload: Json<serde_json::Value>,
    pub created_at: i64,
}

impl EventRecord {
    pub async fn insert(
        db: impl sqlx::SqliteExecutor<'_>,
        event: &AuditEvent,
    ) -> Result<EventRecord, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(
            r#"
            INSERT INTO events (id, pool_id, actor_id, kind, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.pool_id)
        .bind(event.actor_id)
        .bind(event.kind.as_str())
        .bind(Json(&event.payload))
        .bind(now_millis())
        .fetch_one(db)
        .await
    }

    /// Most recent events for a pool, newest first.
    pub async fn list_for_pool(
        db: impl sqlx::SqliteExecutor<'_>,
        pool_id: Uuid,
        limit: u32,
    ) -> Result<Vec<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(
            r#"
            SELECT * FROM events
            WHERE pool_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(pool_id)
        .bind(limit)
        .fetch_all(db)
        .await
    }
}

impl From<EventRecord> for EventDto {
    fn from(record: EventRecord) -> Self {
        EventDto {
            id: record.id,
            pool_id: record.pool_id,
            actor_id: record.actor_id,
            kind: record.kind,
            payload: record.payload.0,
            created_at: record.created_at,
        }
    }
}
