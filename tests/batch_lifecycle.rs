//! End-to-end lifecycle tests against a live database.
//!
//! These tests are ignored by default; provision a PostgreSQL instance,
//! export `DATABASE_URL`, and run `cargo test -- --ignored` to exercise
//! them. Object storage and rendering use the in-process implementations.

mod common;

use std::sync::Arc;

use cardflow_core::config::CardflowConfig;
use cardflow_core::constants::batch_ref;
use cardflow_core::ingest::{CellValue, InlineAsset, SheetImport};
use cardflow_core::models::{CardBatch, Employee, IdCard, NewVendor, Vendor, VendorRequest};
use cardflow_core::orchestration::{
    BatchSaver, BatchSession, CompletionRollup, DeleteOutcome, PrintDispatcher,
};
use cardflow_core::render::RasterRenderer;
use cardflow_core::storage::MemoryObjectStore;

fn sheet_for(rows: &[(&str, &str, &str)]) -> SheetImport {
    SheetImport::new(
        vec!["Full Name".into(), "Employee ID".into(), "Branch".into()],
        rows.iter()
            .map(|(name, code, branch)| {
                vec![
                    CellValue::Text(name.to_string()),
                    CellValue::Text(code.to_string()),
                    CellValue::Text(branch.to_string()),
                ]
            })
            .collect(),
    )
}

fn saver_with(pool: sqlx::PgPool, storage: Arc<MemoryObjectStore>) -> BatchSaver {
    BatchSaver::new(pool, storage, &CardflowConfig::default())
}

async fn seed_vendor(pool: &sqlx::PgPool) -> Vendor {
    Vendor::create(
        pool,
        NewVendor {
            name: "Prints R Us".to_string(),
            email: Some("orders@prints.example.com".to_string()),
            address: None,
        },
    )
    .await
    .expect("Failed to create vendor")
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn first_save_creates_batch_employee_and_card() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);

    let code = common::unique_code("E1");
    let sheet = sheet_for(&[("John Doe", &code, "HYD")]);
    let mut session = BatchSession::from_import(&sheet, Some("admin".into()));

    let outcome = saver.save(&mut session).await.expect("save failed");

    // Reference follows the B-NNNNN format and is bound to the session
    assert!(batch_ref::parse(&outcome.batch_ref).is_some());
    assert_eq!(session.batch().unwrap().batch_ref, outcome.batch_ref);
    assert_eq!(outcome.total_cards, 1);
    assert_eq!(outcome.created_employees, 1);
    assert!(outcome.skipped_rows.is_empty());

    let employee = Employee::find_by_code(&pool, &code)
        .await
        .unwrap()
        .expect("employee was not created");
    assert_eq!(employee.branch, "HYD");
    assert_eq!(employee.email, format!("{}@example.com", code.to_lowercase()));

    let cards = IdCard::find_by_batch(&pool, outcome.batch_uuid).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].status, "pending");
    assert_eq!(cards[0].card_data["Employee ID"], code.as_str());
    assert_eq!(cards[0].card_data["zip_url"], "");

    let batch = CardBatch::find_by_uuid(&pool, outcome.batch_uuid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(batch.total_cards, 1);
    assert_eq!(batch.status, "pending");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn batch_refs_increase_sequentially() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);

    let first_code = common::unique_code("E2");
    let mut first = BatchSession::from_import(&sheet_for(&[("A", &first_code, "HYD")]), None);
    let first_outcome = saver.save(&mut first).await.unwrap();

    let second_code = common::unique_code("E2");
    let mut second = BatchSession::from_import(&sheet_for(&[("B", &second_code, "HYD")]), None);
    let second_outcome = saver.save(&mut second).await.unwrap();

    let first_counter = batch_ref::parse(&first_outcome.batch_ref).unwrap();
    let second_counter = batch_ref::parse(&second_outcome.batch_ref).unwrap();
    assert!(second_counter > first_counter);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn invalid_branch_coerces_to_default() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);

    let code = common::unique_code("E3");
    let mut session = BatchSession::from_import(&sheet_for(&[("X Y", &code, "xyz")]), None);
    saver.save(&mut session).await.unwrap();

    let employee = Employee::find_by_code(&pool, &code).await.unwrap().unwrap();
    assert_eq!(employee.branch, "HYD");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn existing_employee_is_reused_unchanged() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);

    let code = common::unique_code("E4");
    let mut first = BatchSession::from_import(&sheet_for(&[("Original Name", &code, "BLR")]), None);
    saver.save(&mut first).await.unwrap();

    // A later batch with the same code but different details reuses the record
    let mut second = BatchSession::from_import(&sheet_for(&[("Changed Name", &code, "DEL")]), None);
    let outcome = saver.save(&mut second).await.unwrap();
    assert_eq!(outcome.created_employees, 0);

    let employee = Employee::find_by_code(&pool, &code).await.unwrap().unwrap();
    assert_eq!(employee.full_name, "Original Name");
    assert_eq!(employee.branch, "BLR");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn resave_fully_replaces_cards() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);

    let code_a = common::unique_code("E5");
    let code_b = common::unique_code("E5");
    let mut session =
        BatchSession::from_import(&sheet_for(&[("A", &code_a, "HYD"), ("B", &code_b, "HYD")]), None);
    let first = saver.save(&mut session).await.unwrap();
    assert_eq!(first.total_cards, 2);

    let old_cards = IdCard::find_by_batch(&pool, first.batch_uuid).await.unwrap();

    // Re-save the bound session: same batch, cards replaced wholesale
    let second = saver.save(&mut session).await.unwrap();
    assert_eq!(second.batch_uuid, first.batch_uuid);
    assert_eq!(second.batch_ref, first.batch_ref);
    assert_eq!(second.total_cards, 2);

    let new_cards = IdCard::find_by_batch(&pool, first.batch_uuid).await.unwrap();
    assert_eq!(new_cards.len(), 2);
    for old in &old_cards {
        assert!(new_cards.iter().all(|new| new.card_uuid != old.card_uuid));
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn inline_photo_uploads_and_rewrites() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage.clone());

    let code = common::unique_code("E6");
    let sheet = SheetImport::new(
        vec!["Employee ID".into(), "Photo".into()],
        vec![vec![
            CellValue::Text(code.clone()),
            CellValue::Asset(InlineAsset {
                bytes: vec![1, 2, 3, 4],
                content_type: "image/png".into(),
                file_name: Some("face.png".into()),
            }),
        ]],
    );
    let mut session = BatchSession::from_import(&sheet, None);
    let outcome = saver.save(&mut session).await.unwrap();

    let photo_path = format!("photos/{code}.png");
    assert!(storage.contains(&photo_path));

    let cards = IdCard::find_by_batch(&pool, outcome.batch_uuid).await.unwrap();
    let expected_url = format!("memory://cards/{photo_path}");
    assert_eq!(cards[0].photo_url.as_deref(), Some(expected_url.as_str()));
    assert_eq!(cards[0].card_data["Photo"], expected_url.as_str());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn dispatch_renders_uploads_and_promotes() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage.clone());
    let dispatcher = PrintDispatcher::new(
        pool.clone(),
        storage.clone(),
        Arc::new(RasterRenderer::new(3)),
    );
    let vendor = seed_vendor(&pool).await;

    let code = common::unique_code("E7");
    let mut session = BatchSession::from_import(&sheet_for(&[("John Doe", &code, "HYD")]), None);
    let saved = saver.save(&mut session).await.unwrap();

    session.select_all();
    let outcome = dispatcher.dispatch(&session, vendor.vendor_uuid).await.unwrap();

    assert_eq!(outcome.requested, 1);
    assert_eq!(outcome.dispatched, 1);
    assert!(outcome.failures.is_empty());
    assert!(outcome.batch_promoted);

    let front_path = format!("public/bulk-{}-0-front.png", saved.batch_ref);
    let back_path = format!("public/bulk-{}-0-back.png", saved.batch_ref);
    assert!(storage.contains(&front_path));
    assert!(storage.contains(&back_path));

    let requests = VendorRequest::find_by_batch(&pool, saved.batch_uuid).await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].status, "sent");
    assert_eq!(requests[0].card_details["employeeId"], code.as_str());
    assert!(requests[0].front_image_url.is_some());
    assert!(requests[0].zip_url.is_none());

    let cards = IdCard::find_by_batch(&pool, saved.batch_uuid).await.unwrap();
    assert_eq!(cards[0].status, "sent_for_printing");

    let batch = CardBatch::find_by_uuid(&pool, saved.batch_uuid).await.unwrap().unwrap();
    assert_eq!(batch.status, "sent_for_printing");
    assert!(batch.sent_at.is_some());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn dispatch_reuses_packaging_archive() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage.clone());
    let dispatcher = PrintDispatcher::new(
        pool.clone(),
        storage.clone(),
        Arc::new(RasterRenderer::new(3)),
    );
    let vendor = seed_vendor(&pool).await;

    let code = common::unique_code("E8");
    let mut session = BatchSession::from_import(&sheet_for(&[("Jane Roe", &code, "MUM")]), None);
    session.attach_archive(
        0,
        InlineAsset {
            bytes: vec![0x50, 0x4b, 0x03, 0x04],
            content_type: "application/zip".into(),
            file_name: Some("bundle.zip".into()),
        },
    );
    let saved = saver.save(&mut session).await.unwrap();

    let archive_url = format!("memory://cards/archives/{code}.zip");
    let cards = IdCard::find_by_batch(&pool, saved.batch_uuid).await.unwrap();
    assert_eq!(cards[0].zip_url.as_deref(), Some(archive_url.as_str()));
    assert_eq!(cards[0].card_data["zip_url"], archive_url.as_str());

    session.select_all();
    let outcome = dispatcher.dispatch(&session, vendor.vendor_uuid).await.unwrap();
    assert_eq!(outcome.dispatched, 1);

    // Archive reuse: no face images are rendered or uploaded
    let requests = VendorRequest::find_by_batch(&pool, saved.batch_uuid).await.unwrap();
    assert_eq!(requests[0].zip_url.as_deref(), Some(archive_url.as_str()));
    assert!(requests[0].front_image_url.is_none());
    assert!(requests[0].back_image_url.is_none());
    assert!(!storage.contains(&format!("public/bulk-{}-0-front.png", saved.batch_ref)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn rollup_completes_batch_only_when_all_collected() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);
    let rollup = CompletionRollup::new(pool.clone());

    let code_a = common::unique_code("E9");
    let code_b = common::unique_code("E9");
    let mut session =
        BatchSession::from_import(&sheet_for(&[("A", &code_a, "HYD"), ("B", &code_b, "HYD")]), None);
    let saved = saver.save(&mut session).await.unwrap();

    let first_card = session.row(0).card_uuid.unwrap();
    let second_card = session.row(1).card_uuid.unwrap();

    let partial = rollup.mark_card_done(first_card).await.unwrap();
    assert!(partial.card_updated);
    assert!(!partial.batch_completed);

    let batch = CardBatch::find_by_uuid(&pool, saved.batch_uuid).await.unwrap().unwrap();
    assert_eq!(batch.status, "pending");

    let full = rollup.mark_card_done(second_card).await.unwrap();
    assert!(full.batch_completed);

    let batch = CardBatch::find_by_uuid(&pool, saved.batch_uuid).await.unwrap().unwrap();
    assert_eq!(batch.status, "completed");
    assert!(batch.completed_at.is_some());

    // Repeat invocation is a no-op on both card and batch
    let repeat = rollup.mark_card_done(second_card).await.unwrap();
    assert!(!repeat.card_updated);
    assert!(!repeat.batch_completed);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn delete_batch_distinguishes_policy_rejection() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);
    let rollup = CompletionRollup::new(pool.clone());

    let code = common::unique_code("EA");
    let mut session = BatchSession::from_import(&sheet_for(&[("A", &code, "HYD")]), None);
    let saved = saver.save(&mut session).await.unwrap();

    match rollup.delete_batch(saved.batch_uuid).await.unwrap() {
        DeleteOutcome::Deleted { cards_removed } => assert_eq!(cards_removed, 1),
        other => panic!("expected Deleted, got {other:?}"),
    }
    assert!(CardBatch::find_by_uuid(&pool, saved.batch_uuid).await.unwrap().is_none());

    // The batch row is already gone: zero-affected delete surfaces distinctly
    match rollup.delete_batch(saved.batch_uuid).await.unwrap() {
        DeleteOutcome::PolicyRejected { cards_removed } => assert_eq!(cards_removed, 0),
        other => panic!("expected PolicyRejected, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a provisioned test database"]
async fn session_loads_persisted_batch() {
    let pool = common::test_pool().await;
    let storage = Arc::new(MemoryObjectStore::new());
    let saver = saver_with(pool.clone(), storage);

    let code = common::unique_code("EB");
    let mut session = BatchSession::from_import(&sheet_for(&[("John Doe", &code, "VIZAG")]), None);
    let saved = saver.save(&mut session).await.unwrap();

    let loaded = BatchSession::load(&pool, saved.batch_uuid).await.unwrap();
    assert_eq!(loaded.batch().unwrap().batch_ref, saved.batch_ref);
    assert_eq!(loaded.row_count(), 1);
    assert_eq!(loaded.row(0).canonical.employee_code.as_deref(), Some(code.as_str()));
    assert_eq!(loaded.row(0).canonical.branch.as_deref(), Some("VIZAG"));
    assert!(loaded.row(0).card_uuid.is_some());
}
