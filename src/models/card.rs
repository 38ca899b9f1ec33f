//! # ID Card Model
//!
//! One employee's card request within a batch. Cards are bulk-created at
//! batch save (a re-save deletes and fully re-inserts the batch's cards) and
//! afterwards only move forward: the status mutators below are
//! predicate-guarded so a card can never regress.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::state_machine::{display_status_raw, DisplayStatus};

/// Maps to the `id_cards` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct IdCard {
    pub card_uuid: Uuid,
    pub employee_uuid: Uuid,
    pub batch_uuid: Uuid,
    /// Verbatim header-to-value snapshot of the source row, plus the
    /// reserved `zip_url` key
    pub card_data: Value,
    pub photo_url: Option<String>,
    pub zip_url: Option<String>,
    pub status: String,
    pub print_status: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

/// New card for bulk creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIdCard {
    pub employee_uuid: Uuid,
    pub batch_uuid: Uuid,
    pub card_data: Value,
    pub photo_url: Option<String>,
    pub zip_url: Option<String>,
    pub created_by: Option<String>,
}

const CARD_COLUMNS: &str = "card_uuid, employee_uuid, batch_uuid, card_data, photo_url, zip_url, \
                            status, print_status, created_by, created_at";

impl IdCard {
    /// Operator-facing status badge for this card
    pub fn display_status(&self) -> DisplayStatus {
        display_status_raw(self.print_status.as_deref(), self.zip_url.as_deref())
    }

    /// Bulk-insert cards in one multi-row statement.
    ///
    /// All-or-nothing at the storage layer: a single failing row aborts the
    /// whole insert. Returns the created cards in insert order.
    pub async fn bulk_insert<'e, E>(
        executor: E,
        cards: &[NewIdCard],
    ) -> Result<Vec<IdCard>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO id_cards (employee_uuid, batch_uuid, card_data, photo_url, zip_url, status, created_by) ",
        );
        builder.push_values(cards, |mut row, card| {
            row.push_bind(card.employee_uuid)
                .push_bind(card.batch_uuid)
                .push_bind(&card.card_data)
                .push_bind(&card.photo_url)
                .push_bind(&card.zip_url)
                .push_bind("pending")
                .push_bind(&card.created_by);
        });
        builder.push(format!(" RETURNING {CARD_COLUMNS}"));

        builder.build_query_as::<IdCard>().fetch_all(executor).await
    }

    /// Find a card by its primary key
    pub async fn find_by_uuid(pool: &PgPool, card_uuid: Uuid) -> Result<Option<IdCard>, sqlx::Error> {
        sqlx::query_as::<_, IdCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM id_cards WHERE card_uuid = $1"
        ))
        .bind(card_uuid)
        .fetch_optional(pool)
        .await
    }

    /// All cards of a batch, in creation order
    pub async fn find_by_batch(pool: &PgPool, batch_uuid: Uuid) -> Result<Vec<IdCard>, sqlx::Error> {
        sqlx::query_as::<_, IdCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM id_cards WHERE batch_uuid = $1 ORDER BY created_at, card_uuid"
        ))
        .bind(batch_uuid)
        .fetch_all(pool)
        .await
    }

    /// Delete every card of a batch (the re-save full replace, and batch
    /// deletion). Returns the number of removed rows.
    pub async fn delete_for_batch<'e, E>(executor: E, batch_uuid: Uuid) -> Result<u64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM id_cards WHERE batch_uuid = $1")
            .bind(batch_uuid)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Advance `pending → sent_for_printing`. Guarded: any other current
    /// status leaves the row untouched. Returns whether the card moved.
    pub async fn mark_sent_for_printing(pool: &PgPool, card_uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE id_cards
            SET status = 'sent_for_printing'
            WHERE card_uuid = $1 AND status = 'pending'
            "#,
        )
        .bind(card_uuid)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark the card collected: `print_status = ready_to_collect`,
    /// `status = completed`. Repeat calls affect zero rows.
    pub async fn mark_ready_to_collect(pool: &PgPool, card_uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE id_cards
            SET print_status = 'ready_to_collect', status = 'completed'
            WHERE card_uuid = $1
              AND (status <> 'completed'
                   OR print_status IS NULL
                   OR print_status <> 'ready_to_collect')
            "#,
        )
        .bind(card_uuid)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record that the vendor has printed the card
    pub async fn mark_printed(pool: &PgPool, card_uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE id_cards
            SET print_status = 'printed'
            WHERE card_uuid = $1 AND print_status IS NULL
            "#,
        )
        .bind(card_uuid)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::DisplayStatus;

    fn card(print_status: Option<&str>, zip_url: Option<&str>) -> IdCard {
        IdCard {
            card_uuid: Uuid::new_v4(),
            employee_uuid: Uuid::new_v4(),
            batch_uuid: Uuid::new_v4(),
            card_data: serde_json::json!({"Full Name": "John Doe"}),
            photo_url: None,
            zip_url: zip_url.map(String::from),
            status: "pending".to_string(),
            print_status: print_status.map(String::from),
            created_by: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_display_status_from_fields() {
        assert_eq!(card(None, None).display_status(), DisplayStatus::NotSent);
        assert_eq!(
            card(None, Some("https://cdn/x.zip")).display_status(),
            DisplayStatus::SentToPrint
        );
        assert_eq!(
            card(Some("printed"), Some("https://cdn/x.zip")).display_status(),
            DisplayStatus::Printed
        );
        assert_eq!(
            card(Some("ready_to_collect"), None).display_status(),
            DisplayStatus::ReadyToCollect
        );
    }

    #[test]
    fn test_card_serialization() {
        let card = card(Some("printed"), None);
        let serialized = serde_json::to_string(&card).unwrap();
        let deserialized: IdCard = serde_json::from_str(&serialized).unwrap();
        assert_eq!(card, deserialized);
    }
}
