//! # Vendor Model
//!
//! External print vendors. Referenced by vendor requests; only the read-side
//! finders (and a seed-friendly create) live here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Maps to the `vendors` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vendor {
    pub vendor_uuid: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
}

/// New vendor for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVendor {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl Vendor {
    /// Create a vendor
    pub async fn create(pool: &PgPool, new_vendor: NewVendor) -> Result<Vendor, sqlx::Error> {
        sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, email, address)
            VALUES ($1, $2, $3)
            RETURNING vendor_uuid, name, email, address, created_at
            "#,
        )
        .bind(&new_vendor.name)
        .bind(&new_vendor.email)
        .bind(&new_vendor.address)
        .fetch_one(pool)
        .await
    }

    /// Find a vendor by its primary key
    pub async fn find_by_uuid(pool: &PgPool, vendor_uuid: Uuid) -> Result<Option<Vendor>, sqlx::Error> {
        sqlx::query_as::<_, Vendor>(
            "SELECT vendor_uuid, name, email, address, created_at FROM vendors WHERE vendor_uuid = $1",
        )
        .bind(vendor_uuid)
        .fetch_optional(pool)
        .await
    }

    /// List all vendors ordered by name
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Vendor>, sqlx::Error> {
        sqlx::query_as::<_, Vendor>(
            "SELECT vendor_uuid, name, email, address, created_at FROM vendors ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }
}
