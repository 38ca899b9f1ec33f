//! # Batch Saver
//!
//! Persists a batch session as a batch plus its cards.
//!
//! ## Overview
//!
//! A first save assigns the next sequential batch reference and inserts the
//! batch; a re-save updates the card count and fully replaces the batch's
//! cards. Employee records are resolved through an idempotent upsert keyed
//! by employee code, and inline photo/archive assets are uploaded to object
//! storage with the row rewritten to the resulting public URL.
//!
//! ## Failure policy
//!
//! Row-level employee and upload failures are swallowed: the row is skipped
//! (or keeps its original asset reference) and the save continues. The final
//! bulk card insert is all-or-nothing inside one transaction with the card
//! replace, so a failed save never leaves a half-replaced batch; employee
//! and storage side effects from earlier rows stay committed, and re-running
//! the save converges because every step is idempotent.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CardflowConfig;
use crate::constants::{branches, events};
use crate::ingest::AssetRef;
use crate::logging::{log_batch_operation, log_card_operation, log_error};
use crate::models::{CardBatch, Employee, IdCard, NewEmployee, NewIdCard};
use crate::orchestration::session::{BatchSession, BoundBatch};
use crate::orchestration::types::{SaveOutcome, SkippedRow};
use crate::storage::{paths, ObjectStorage};

/// Errors that abort a batch save
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Batch session has no rows to save")]
    EmptySession,
}

/// Persists batch sessions
pub struct BatchSaver {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    email_domain: String,
}

impl BatchSaver {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, config: &CardflowConfig) -> Self {
        Self {
            pool,
            storage,
            email_domain: config.email_domain.clone(),
        }
    }

    /// Persist the session's rows as a batch (create or full replace).
    pub async fn save(&self, session: &mut BatchSession) -> Result<SaveOutcome, SaveError> {
        if session.row_count() == 0 {
            return Err(SaveError::EmptySession);
        }

        let current_ref = session.batch().map(|b| b.batch_ref.clone());
        log_batch_operation(
            events::BATCH_SAVE_REQUESTED,
            current_ref.as_deref(),
            Some(session.row_count()),
            "started",
            None,
        );

        let is_resave = session.batch().is_some();
        let bound = match session.batch() {
            Some(bound) => bound.clone(),
            None => {
                let batch =
                    CardBatch::create(&self.pool, session.row_count() as i32, session.created_by())
                        .await?;
                let bound = BoundBatch {
                    batch_uuid: batch.batch_uuid,
                    batch_ref: batch.batch_ref,
                };
                session.bind(bound.clone());
                bound
            }
        };

        let mut queued: Vec<NewIdCard> = Vec::new();
        let mut queued_rows: Vec<usize> = Vec::new();
        let mut skipped_rows: Vec<SkippedRow> = Vec::new();
        let mut created_employees = 0usize;

        for index in 0..session.row_count() {
            let Some(code) = session.row(index).canonical.employee_code.clone() else {
                log_card_operation(
                    events::CARD_ROW_SKIPPED,
                    None,
                    None,
                    "skipped",
                    Some("blank employee code"),
                );
                skipped_rows.push(SkippedRow {
                    row_index: index,
                    reason: "blank employee code".to_string(),
                });
                continue;
            };

            let employee = match self.resolve_employee(session, index, &code).await {
                Ok((employee, was_created)) => {
                    if was_created {
                        created_employees += 1;
                    }
                    employee
                }
                Err(error) => {
                    log_error(
                        "batch_saver",
                        "employee_upsert",
                        &error.to_string(),
                        Some(&code),
                    );
                    skipped_rows.push(SkippedRow {
                        row_index: index,
                        reason: format!("employee insert failed: {error}"),
                    });
                    continue;
                }
            };
            session.bind_employee(index, employee.employee_uuid);

            self.upload_row_assets(session, index, &code).await;

            let row = session.row(index);
            queued.push(NewIdCard {
                employee_uuid: employee.employee_uuid,
                batch_uuid: bound.batch_uuid,
                card_data: session.card_snapshot(index),
                photo_url: row.photo_url.clone(),
                zip_url: row.zip_url.clone(),
                created_by: session.created_by().map(String::from),
            });
            queued_rows.push(index);
        }

        // Count update, card replace, and bulk insert commit or fail together.
        let mut tx = self.pool.begin().await?;
        CardBatch::update_total_cards(&mut *tx, bound.batch_uuid, queued.len() as i32).await?;
        if is_resave {
            IdCard::delete_for_batch(&mut *tx, bound.batch_uuid).await?;
        }
        let inserted = IdCard::bulk_insert(&mut *tx, &queued).await?;
        tx.commit().await?;

        for (row_index, card) in queued_rows.iter().zip(&inserted) {
            session.bind_card(*row_index, card.card_uuid);
        }

        log_batch_operation(
            events::BATCH_SAVED,
            Some(&bound.batch_ref),
            Some(inserted.len()),
            "saved",
            None,
        );

        Ok(SaveOutcome {
            batch_uuid: bound.batch_uuid,
            batch_ref: bound.batch_ref,
            total_cards: inserted.len(),
            created_employees,
            skipped_rows,
        })
    }

    /// Idempotent employee resolution for one row
    async fn resolve_employee(
        &self,
        session: &BatchSession,
        index: usize,
        code: &str,
    ) -> Result<(Employee, bool), sqlx::Error> {
        let canonical = &session.row(index).canonical;

        let branch = branches::normalize(canonical.branch.as_deref().unwrap_or_default());
        let email = canonical
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@{}", code.to_lowercase(), self.email_domain));
        let full_name = canonical.full_name.clone().unwrap_or_else(|| code.to_string());

        Employee::find_or_create(
            &self.pool,
            NewEmployee {
                employee_code: code.to_string(),
                full_name,
                branch: branch.to_string(),
                email,
                photo_url: canonical.photo.as_ref().and_then(|p| p.url()).map(String::from),
            },
        )
        .await
    }

    /// Upload inline photo/archive assets for one row, rewriting the row to
    /// the resulting public URLs. Failures keep the original reference.
    async fn upload_row_assets(&self, session: &mut BatchSession, index: usize, code: &str) {
        if let Some(AssetRef::Inline(asset)) = session.row(index).canonical.photo.clone() {
            let path = paths::photo(code, &asset.content_type);
            match self
                .storage
                .upload(&path, asset.bytes, &asset.content_type)
                .await
            {
                Ok(url) => session.record_photo_upload(index, url),
                Err(error) => {
                    log_error("batch_saver", "photo_upload", &error.to_string(), Some(code));
                }
            }
        }

        if let Some(AssetRef::Inline(asset)) = session.row(index).archive.clone() {
            let path = paths::archive(code);
            match self
                .storage
                .upload(&path, asset.bytes, &asset.content_type)
                .await
            {
                Ok(url) => session.record_archive_upload(index, url),
                Err(error) => {
                    log_error("batch_saver", "archive_upload", &error.to_string(), Some(code));
                }
            }
        }
    }
}
