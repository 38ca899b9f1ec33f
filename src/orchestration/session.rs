//! # Batch Session
//!
//! The explicit in-memory aggregate for one batch being worked on: the
//! bound batch identity, the canonical rows, and the dispatch selection.
//! It is loaded once (from an imported sheet or from persisted cards),
//! mutated only through the transitions below, and persisted explicitly by
//! the batch saver. State never leaks into ad hoc side channels.

use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::constants::system;
use crate::ingest::{AssetRef, CanonicalRow, InlineAsset, SheetImport};
use crate::models::{Employee, IdCard};
use serde_json::Value;

/// Identity of a batch the session has been saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundBatch {
    pub batch_uuid: Uuid,
    pub batch_ref: String,
}

/// One card row held by the session
#[derive(Debug, Clone)]
pub struct SessionRow {
    pub canonical: CanonicalRow,
    /// Packaging archive attached to this row, if any
    pub archive: Option<AssetRef>,
    /// Set once the row has been persisted as a card
    pub card_uuid: Option<Uuid>,
    pub employee_uuid: Option<Uuid>,
    pub photo_url: Option<String>,
    pub zip_url: Option<String>,
}

impl SessionRow {
    fn from_canonical(canonical: CanonicalRow) -> Self {
        let photo_url = canonical.photo.as_ref().and_then(|p| p.url()).map(String::from);
        Self {
            canonical,
            archive: None,
            card_uuid: None,
            employee_uuid: None,
            photo_url,
            zip_url: None,
        }
    }

    /// The canonical-employee snapshot dispatched to vendors, with the
    /// durable photo URL when one is known
    pub fn employee_details(&self) -> Value {
        let mut details = self.canonical.employee_details();
        if let (Some(url), Some(object)) = (&self.photo_url, details.as_object_mut()) {
            object.insert("photo".to_string(), Value::String(url.clone()));
        }
        details
    }
}

/// In-memory aggregate for one batch being edited, dispatched, or completed
#[derive(Debug, Clone, Default)]
pub struct BatchSession {
    batch: Option<BoundBatch>,
    rows: Vec<SessionRow>,
    selection: BTreeSet<usize>,
    created_by: Option<String>,
}

impl BatchSession {
    /// Start a session from an imported sheet
    pub fn from_import(import: &SheetImport, created_by: Option<String>) -> Self {
        Self {
            batch: None,
            rows: import
                .canonical_rows()
                .into_iter()
                .map(SessionRow::from_canonical)
                .collect(),
            selection: BTreeSet::new(),
            created_by,
        }
    }

    /// Rebuild a session from a persisted batch.
    ///
    /// Employee identity comes from the employees table; the free-form
    /// snapshot fields are rehydrated from each card's stored `card_data`.
    pub async fn load(pool: &PgPool, batch_uuid: Uuid) -> Result<Self, sqlx::Error> {
        let batch = crate::models::CardBatch::find_by_uuid(pool, batch_uuid)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let cards = IdCard::find_by_batch(pool, batch_uuid).await?;

        let mut rows = Vec::with_capacity(cards.len());
        for card in cards {
            let mut canonical = match card.card_data.as_object() {
                Some(snapshot) => CanonicalRow::from_snapshot(snapshot),
                None => CanonicalRow::default(),
            };

            if let Some(employee) = Employee::find_by_uuid(pool, card.employee_uuid).await? {
                canonical.employee_code = Some(employee.employee_code);
                canonical.full_name = Some(employee.full_name);
                canonical.branch = Some(employee.branch);
                canonical.email = Some(employee.email);
            }
            if let Some(url) = &card.photo_url {
                canonical.photo = Some(AssetRef::Url(url.clone()));
            }

            rows.push(SessionRow {
                canonical,
                archive: card.zip_url.clone().map(AssetRef::Url),
                card_uuid: Some(card.card_uuid),
                employee_uuid: Some(card.employee_uuid),
                photo_url: card.photo_url,
                zip_url: card.zip_url,
            });
        }

        Ok(Self {
            batch: Some(BoundBatch {
                batch_uuid: batch.batch_uuid,
                batch_ref: batch.batch_ref,
            }),
            rows,
            selection: BTreeSet::new(),
            created_by: batch.created_by,
        })
    }

    pub fn batch(&self) -> Option<&BoundBatch> {
        self.batch.as_ref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &SessionRow {
        &self.rows[index]
    }

    /// Bind the session to a persisted batch identity
    pub fn bind(&mut self, batch: BoundBatch) {
        self.batch = Some(batch);
    }

    /// Attach an in-memory packaging archive to a row
    pub fn attach_archive(&mut self, index: usize, asset: InlineAsset) {
        if let Some(row) = self.rows.get_mut(index) {
            row.archive = Some(AssetRef::Inline(asset));
        }
    }

    /// Record the durable URL an inline photo was uploaded to, rewriting the
    /// archival snapshot cell alongside the typed field
    pub fn record_photo_upload(&mut self, index: usize, url: String) {
        if let Some(row) = self.rows.get_mut(index) {
            if let Some(header) = row.canonical.photo_header.clone() {
                row.canonical
                    .snapshot
                    .insert(header, Value::String(url.clone()));
            }
            row.canonical.photo = Some(AssetRef::Url(url.clone()));
            row.photo_url = Some(url);
        }
    }

    /// Record the durable URL an inline packaging archive was uploaded to
    pub fn record_archive_upload(&mut self, index: usize, url: String) {
        if let Some(row) = self.rows.get_mut(index) {
            row.archive = Some(AssetRef::Url(url.clone()));
            row.zip_url = Some(url);
        }
    }

    pub fn bind_employee(&mut self, index: usize, employee_uuid: Uuid) {
        if let Some(row) = self.rows.get_mut(index) {
            row.employee_uuid = Some(employee_uuid);
        }
    }

    pub fn bind_card(&mut self, index: usize, card_uuid: Uuid) {
        if let Some(row) = self.rows.get_mut(index) {
            row.card_uuid = Some(card_uuid);
        }
    }

    /// The card snapshot persisted for a row: the verbatim header map plus
    /// the reserved `zip_url` key (empty when no archive exists)
    pub fn card_snapshot(&self, index: usize) -> Value {
        let row = &self.rows[index];
        let mut snapshot = row.canonical.snapshot.clone();
        snapshot.insert(
            system::ZIP_URL_KEY.to_string(),
            Value::String(row.zip_url.clone().unwrap_or_default()),
        );
        Value::Object(snapshot)
    }

    pub fn select_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.selection.insert(index);
        }
    }

    pub fn deselect_row(&mut self, index: usize) {
        self.selection.remove(&index);
    }

    pub fn select_all(&mut self) {
        self.selection = (0..self.rows.len()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected row indices in ascending order
    pub fn selection(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }
}
