//! # Vendor Request Model
//!
//! A record of cards dispatched to an external print vendor, carrying a
//! snapshot of the employee-facing fields so the vendor view survives later
//! card mutation or deletion. Requests are bulk-created by print dispatch
//! and never deleted by the workflow.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Maps to the `vendor_requests` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VendorRequest {
    pub request_uuid: Uuid,
    pub card_uuid: Option<Uuid>,
    pub vendor_uuid: Uuid,
    pub front_image_url: Option<String>,
    pub back_image_url: Option<String>,
    pub zip_url: Option<String>,
    /// Canonical-employee snapshot, not the raw row
    pub card_details: Value,
    pub status: String,
    pub batch_uuid: Uuid,
    pub sent_at: NaiveDateTime,
}

/// New vendor request for bulk creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVendorRequest {
    pub card_uuid: Option<Uuid>,
    pub vendor_uuid: Uuid,
    pub front_image_url: Option<String>,
    pub back_image_url: Option<String>,
    pub zip_url: Option<String>,
    pub card_details: Value,
    pub batch_uuid: Uuid,
}

const REQUEST_COLUMNS: &str = "request_uuid, card_uuid, vendor_uuid, front_image_url, \
                               back_image_url, zip_url, card_details, status, batch_uuid, sent_at";

impl VendorRequest {
    /// Bulk-insert requests in one multi-row statement (all-or-nothing)
    pub async fn bulk_insert<'e, E>(
        executor: E,
        requests: &[NewVendorRequest],
    ) -> Result<Vec<VendorRequest>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO vendor_requests (card_uuid, vendor_uuid, front_image_url, back_image_url, zip_url, card_details, status, batch_uuid) ",
        );
        builder.push_values(requests, |mut row, request| {
            row.push_bind(request.card_uuid)
                .push_bind(request.vendor_uuid)
                .push_bind(&request.front_image_url)
                .push_bind(&request.back_image_url)
                .push_bind(&request.zip_url)
                .push_bind(&request.card_details)
                .push_bind("sent")
                .push_bind(request.batch_uuid);
        });
        builder.push(format!(" RETURNING {REQUEST_COLUMNS}"));

        builder
            .build_query_as::<VendorRequest>()
            .fetch_all(executor)
            .await
    }

    /// Find a request by its primary key
    pub async fn find_by_uuid(
        pool: &PgPool,
        request_uuid: Uuid,
    ) -> Result<Option<VendorRequest>, sqlx::Error> {
        sqlx::query_as::<_, VendorRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM vendor_requests WHERE request_uuid = $1"
        ))
        .bind(request_uuid)
        .fetch_optional(pool)
        .await
    }

    /// All requests dispatched for a batch, most recent first
    pub async fn find_by_batch(
        pool: &PgPool,
        batch_uuid: Uuid,
    ) -> Result<Vec<VendorRequest>, sqlx::Error> {
        sqlx::query_as::<_, VendorRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM vendor_requests WHERE batch_uuid = $1 ORDER BY sent_at DESC"
        ))
        .bind(batch_uuid)
        .fetch_all(pool)
        .await
    }

    /// Record collection by the vendor: `sent → collected`
    pub async fn mark_collected(pool: &PgPool, request_uuid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE vendor_requests
            SET status = 'collected'
            WHERE request_uuid = $1 AND status = 'sent'
            "#,
        )
        .bind(request_uuid)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
