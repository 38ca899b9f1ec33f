//! # Print Dispatcher
//!
//! Routes a selection of saved cards to an external print vendor.
//!
//! ## Overview
//!
//! Each selected row either reuses its durable packaging-archive URL
//! (re-fetched from the card when one is bound, so a concurrent save is
//! observed) or gets a freshly rendered front/back face pair uploaded under
//! deterministic paths; the two uploads run concurrently and the row waits
//! for both. One vendor-request record is queued per row and the card, when
//! bound, is advanced to `sent_for_printing`.
//!
//! ## Failure policy
//!
//! Per-row failures are caught, logged, and reported individually without
//! aborting the remaining rows. The accumulated vendor requests are then
//! bulk-inserted in one all-or-nothing statement; if that insert fails the
//! per-row card status updates remain committed. On success the batch is
//! promoted to `sent_for_printing` by a single conditional update iff no
//! card is still pending.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::constants::events;
use crate::ingest::AssetRef;
use crate::logging::{log_card_operation, log_dispatch_operation, log_error};
use crate::models::{CardBatch, IdCard, NewVendorRequest, VendorRequest};
use crate::orchestration::session::{BatchSession, SessionRow};
use crate::orchestration::types::{DispatchOutcome, RowFailure};
use crate::render::{CardFace, CardRenderer, CardSide};
use crate::storage::{paths, ObjectStorage, StorageError};

/// Errors that abort a dispatch as a whole
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No rows selected for dispatch")]
    EmptySelection,

    #[error("Batch must be saved before dispatch")]
    UnsavedBatch,
}

/// Errors confined to a single row; the dispatch loop continues past them
#[derive(Debug, thiserror::Error)]
enum RowDispatchError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] crate::render::RenderError),
}

/// Dispatches saved cards to print vendors
pub struct PrintDispatcher {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    renderer: Arc<dyn CardRenderer>,
}

impl PrintDispatcher {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ObjectStorage>,
        renderer: Arc<dyn CardRenderer>,
    ) -> Self {
        Self {
            pool,
            storage,
            renderer,
        }
    }

    /// Dispatch the session's selected rows to the given vendor.
    pub async fn dispatch(
        &self,
        session: &BatchSession,
        vendor_uuid: Uuid,
    ) -> Result<DispatchOutcome, DispatchError> {
        let bound = session.batch().cloned().ok_or(DispatchError::UnsavedBatch)?;
        let selection = session.selection();
        if selection.is_empty() {
            return Err(DispatchError::EmptySelection);
        }

        let mut requests: Vec<NewVendorRequest> = Vec::new();
        let mut failures: Vec<RowFailure> = Vec::new();

        for index in selection.iter().copied() {
            let row = session.row(index);
            match self
                .dispatch_row(row, index, &bound.batch_ref, bound.batch_uuid, vendor_uuid)
                .await
            {
                Ok(request) => requests.push(request),
                Err(error) => {
                    log_error(
                        "print_dispatcher",
                        "dispatch_row",
                        &error.to_string(),
                        row.canonical.employee_code.as_deref(),
                    );
                    failures.push(RowFailure {
                        row_index: index,
                        employee_code: row.canonical.employee_code.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        let mut batch_promoted = false;
        let dispatched = if requests.is_empty() {
            0
        } else {
            let inserted = VendorRequest::bulk_insert(&self.pool, &requests).await?;
            batch_promoted =
                CardBatch::mark_sent_if_fully_dispatched(&self.pool, bound.batch_uuid).await?;
            inserted.len()
        };

        if batch_promoted {
            log_dispatch_operation(
                events::BATCH_SENT_FOR_PRINTING,
                Some(&bound.batch_ref),
                Some(&vendor_uuid.to_string()),
                Some(selection.len()),
                "promoted",
                None,
            );
        }
        log_dispatch_operation(
            events::VENDOR_REQUEST_SENT,
            Some(&bound.batch_ref),
            Some(&vendor_uuid.to_string()),
            Some(selection.len()),
            "dispatched",
            Some(&format!("{dispatched} of {} rows", selection.len())),
        );

        Ok(DispatchOutcome {
            batch_uuid: bound.batch_uuid,
            vendor_uuid,
            requested: selection.len(),
            dispatched,
            batch_promoted,
            failures,
        })
    }

    /// Dispatch one row: resolve or synthesize its print assets, queue the
    /// vendor request, and advance the bound card.
    async fn dispatch_row(
        &self,
        row: &SessionRow,
        index: usize,
        batch_ref: &str,
        batch_uuid: Uuid,
        vendor_uuid: Uuid,
    ) -> Result<NewVendorRequest, RowDispatchError> {
        let zip_url = self.fresh_zip_url(row).await?;

        let (front_image_url, back_image_url) = if zip_url.is_some() {
            // The packaging archive already carries the rendered assets
            (None, None)
        } else {
            let photo_bytes = match &row.canonical.photo {
                Some(AssetRef::Inline(asset)) => Some(asset.bytes.as_slice()),
                _ => None,
            };
            let face = CardFace {
                full_name: row.canonical.full_name.as_deref().unwrap_or_default(),
                employee_code: row.canonical.employee_code.as_deref().unwrap_or_default(),
                branch: row.canonical.branch.as_deref().unwrap_or_default(),
                photo: photo_bytes,
            };
            let front = self.renderer.render(&face, CardSide::Front)?;
            let back = self.renderer.render(&face, CardSide::Back)?;

            let front_path = paths::dispatch_image(batch_ref, index, CardSide::Front);
            let back_path = paths::dispatch_image(batch_ref, index, CardSide::Back);
            let (front_url, back_url) = futures::future::try_join(
                self.storage.upload(&front_path, front.bytes, "image/png"),
                self.storage.upload(&back_path, back.bytes, "image/png"),
            )
            .await?;
            (Some(front_url), Some(back_url))
        };

        if let Some(card_uuid) = row.card_uuid {
            let moved = IdCard::mark_sent_for_printing(&self.pool, card_uuid).await?;
            if moved {
                log_card_operation(
                    events::CARD_SENT_FOR_PRINTING,
                    Some(&card_uuid.to_string()),
                    row.canonical.employee_code.as_deref(),
                    "sent_for_printing",
                    None,
                );
            }
        }

        Ok(NewVendorRequest {
            card_uuid: row.card_uuid,
            vendor_uuid,
            front_image_url,
            back_image_url,
            zip_url,
            card_details: row.employee_details(),
            batch_uuid,
        })
    }

    /// The row's packaging-archive URL, re-fetched from the card when one is
    /// bound so a save that landed after session load is observed.
    async fn fresh_zip_url(&self, row: &SessionRow) -> Result<Option<String>, sqlx::Error> {
        let url = match row.card_uuid {
            Some(card_uuid) => IdCard::find_by_uuid(&self.pool, card_uuid)
                .await?
                .and_then(|card| card.zip_url),
            None => row.zip_url.clone(),
        };

        Ok(url.filter(|u| !u.is_empty()))
    }
}
