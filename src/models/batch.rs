//! # Card Batch Model
//!
//! A batch is a named, sequentially-referenced group of card requests
//! processed together. Its lifecycle status is only ever advanced by the
//! workflow through the conditional promotions below; both promotions are
//! single predicate-guarded statements, so repeated or concurrent calls
//! converge instead of racing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::constants::{batch_ref, system};
use crate::state_machine::BatchStatus;

/// Maps to the `card_batches` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CardBatch {
    pub batch_uuid: Uuid,
    /// Human-readable sequential reference (`B-NNNNN`)
    pub batch_ref: String,
    pub name: String,
    pub total_cards: i32,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub sent_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

const BATCH_COLUMNS: &str =
    "batch_uuid, batch_ref, name, total_cards, status, created_by, created_at, sent_at, completed_at";

impl CardBatch {
    /// Parsed lifecycle status
    pub fn batch_status(&self) -> Option<BatchStatus> {
        self.status.parse().ok()
    }

    /// Create a new pending batch with the next sequential reference.
    ///
    /// The reference is computed from the current maximum and committed under
    /// the unique index on `batch_ref`; a concurrent save that lands on the
    /// same reference conflicts and this call retries with a fresh maximum.
    pub async fn create(
        pool: &PgPool,
        total_cards: i32,
        created_by: Option<&str>,
    ) -> Result<CardBatch, sqlx::Error> {
        let mut attempts = 0;
        loop {
            let latest = Self::latest_ref(pool).await?;
            let reference = batch_ref::next_after(latest.as_deref());
            let name = format!("Batch {reference}");

            let result = sqlx::query_as::<_, CardBatch>(&format!(
                r#"
                INSERT INTO card_batches (batch_ref, name, total_cards, status, created_by)
                VALUES ($1, $2, $3, 'pending', $4)
                RETURNING {BATCH_COLUMNS}
                "#,
            ))
            .bind(&reference)
            .bind(&name)
            .bind(total_cards)
            .bind(created_by)
            .fetch_one(pool)
            .await;

            match result {
                Ok(batch) => return Ok(batch),
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation()
                        && attempts < system::BATCH_REF_RETRY_LIMIT =>
                {
                    attempts += 1;
                    continue;
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Latest assigned batch reference.
    ///
    /// Zero padding keeps lexical order aligned with numeric order, so a
    /// plain descending sort yields the maximum.
    pub async fn latest_ref(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT batch_ref
            FROM card_batches
            ORDER BY batch_ref DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await
    }

    /// Find a batch by its primary key
    pub async fn find_by_uuid(pool: &PgPool, batch_uuid: Uuid) -> Result<Option<CardBatch>, sqlx::Error> {
        sqlx::query_as::<_, CardBatch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM card_batches WHERE batch_uuid = $1"
        ))
        .bind(batch_uuid)
        .fetch_optional(pool)
        .await
    }

    /// Find a batch by its human-readable reference
    pub async fn find_by_ref(pool: &PgPool, reference: &str) -> Result<Option<CardBatch>, sqlx::Error> {
        sqlx::query_as::<_, CardBatch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM card_batches WHERE batch_ref = $1"
        ))
        .bind(reference)
        .fetch_optional(pool)
        .await
    }

    /// Most recently created batches for list views
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<CardBatch>, sqlx::Error> {
        sqlx::query_as::<_, CardBatch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM card_batches ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Update the card count on a re-save
    pub async fn update_total_cards<'e, E>(
        executor: E,
        batch_uuid: Uuid,
        total_cards: i32,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query("UPDATE card_batches SET total_cards = $2 WHERE batch_uuid = $1")
            .bind(batch_uuid)
            .bind(total_cards)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Promote the batch to `sent_for_printing` iff no card is still pending.
    ///
    /// Returns whether the promotion happened.
    pub async fn mark_sent_if_fully_dispatched(
        pool: &PgPool,
        batch_uuid: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE card_batches
            SET status = 'sent_for_printing', sent_at = NOW()
            WHERE batch_uuid = $1
              AND status = 'pending'
              AND NOT EXISTS (
                  SELECT 1 FROM id_cards
                  WHERE id_cards.batch_uuid = $1 AND id_cards.status = 'pending'
              )
            "#,
        )
        .bind(batch_uuid)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Promote the batch to `completed` iff every sibling card has converged
    /// to `ready_to_collect`.
    ///
    /// Idempotent: repeat calls with no sibling change affect zero rows.
    pub async fn mark_completed_if_collected(
        pool: &PgPool,
        batch_uuid: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE card_batches
            SET status = 'completed', completed_at = NOW()
            WHERE batch_uuid = $1
              AND status <> 'completed'
              AND NOT EXISTS (
                  SELECT 1 FROM id_cards
                  WHERE id_cards.batch_uuid = $1
                    AND (id_cards.print_status IS NULL
                         OR id_cards.print_status <> 'ready_to_collect')
              )
            "#,
        )
        .bind(batch_uuid)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the batch row itself.
    ///
    /// Returns whether a row was removed; callers treat `false` after a
    /// successful card delete as a policy rejection rather than a missing
    /// batch.
    pub async fn delete(pool: &PgPool, batch_uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM card_batches WHERE batch_uuid = $1")
            .bind(batch_uuid)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
