//! # Completion Rollup
//!
//! Per-card completion, batch promotion, vendor collection, and batch
//! deletion.
//!
//! ## Overview
//!
//! Marking a card done sets `print_status = ready_to_collect` and
//! `status = completed`, then re-checks the batch with a single conditional
//! update that promotes it to `completed` only when every sibling card has
//! converged. Both steps are idempotent; concurrent rollups for different
//! cards of the same batch cannot lose the promotion because the sibling
//! check runs inside the update's own predicate.

use sqlx::PgPool;
use uuid::Uuid;

use crate::constants::events;
use crate::logging::{log_batch_operation, log_card_operation};
use crate::models::{CardBatch, IdCard, VendorRequest};
use crate::orchestration::types::{CollectionOutcome, DeleteOutcome, RollupOutcome};

/// Errors surfaced by rollup operations
#[derive(Debug, thiserror::Error)]
pub enum RollupError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Vendor request not found: {0}")]
    RequestNotFound(Uuid),
}

/// Advances cards and batches to their terminal states
pub struct CompletionRollup {
    pool: PgPool,
}

impl CompletionRollup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mark a card ready to collect and promote its batch when every
    /// sibling has converged.
    pub async fn mark_card_done(&self, card_uuid: Uuid) -> Result<RollupOutcome, RollupError> {
        let card = IdCard::find_by_uuid(&self.pool, card_uuid)
            .await?
            .ok_or(RollupError::CardNotFound(card_uuid))?;

        let card_updated = IdCard::mark_ready_to_collect(&self.pool, card_uuid).await?;
        if card_updated {
            log_card_operation(
                events::CARD_READY_TO_COLLECT,
                Some(&card_uuid.to_string()),
                None,
                "ready_to_collect",
                None,
            );
        }

        let batch_completed =
            CardBatch::mark_completed_if_collected(&self.pool, card.batch_uuid).await?;
        if batch_completed {
            log_batch_operation(events::BATCH_COMPLETED, None, None, "completed", None);
        }

        Ok(RollupOutcome {
            card_uuid,
            batch_uuid: card.batch_uuid,
            card_updated,
            batch_completed,
        })
    }

    /// Record that the vendor has printed a card
    pub async fn mark_card_printed(&self, card_uuid: Uuid) -> Result<bool, RollupError> {
        Ok(IdCard::mark_printed(&self.pool, card_uuid).await?)
    }

    /// Vendor marks a request collected; the linked card (when one is still
    /// bound) rolls forward with it.
    pub async fn mark_request_collected(
        &self,
        request_uuid: Uuid,
    ) -> Result<CollectionOutcome, RollupError> {
        let request = VendorRequest::find_by_uuid(&self.pool, request_uuid)
            .await?
            .ok_or(RollupError::RequestNotFound(request_uuid))?;

        let request_updated = VendorRequest::mark_collected(&self.pool, request_uuid).await?;
        if request_updated {
            log_card_operation(
                events::VENDOR_REQUEST_COLLECTED,
                request.card_uuid.map(|u| u.to_string()).as_deref(),
                None,
                "collected",
                None,
            );
        }

        let rollup = match request.card_uuid {
            Some(card_uuid) => Some(self.mark_card_done(card_uuid).await?),
            None => None,
        };

        Ok(CollectionOutcome {
            request_uuid,
            request_updated,
            rollup,
        })
    }

    /// Delete a batch's cards and then the batch itself.
    ///
    /// A zero-affected delete on the batch after the card delete succeeded
    /// is surfaced as a policy rejection rather than silently swallowed.
    pub async fn delete_batch(&self, batch_uuid: Uuid) -> Result<DeleteOutcome, RollupError> {
        let cards_removed = IdCard::delete_for_batch(&self.pool, batch_uuid).await?;
        let batch_deleted = CardBatch::delete(&self.pool, batch_uuid).await?;

        if batch_deleted {
            log_batch_operation(
                events::BATCH_DELETED,
                None,
                Some(cards_removed as usize),
                "deleted",
                None,
            );
            Ok(DeleteOutcome::Deleted { cards_removed })
        } else {
            log_batch_operation(
                events::BATCH_DELETE_REJECTED,
                None,
                Some(cards_removed as usize),
                "rejected",
                Some("batch delete affected zero rows after cards were removed"),
            );
            Ok(DeleteOutcome::PolicyRejected { cards_removed })
        }
    }
}
