//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and
//! files for tracing batch saves, vendor dispatches, and storage uploads.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let log_dir = PathBuf::from("log");
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir).expect("Failed to create log directory");
        }

        // Log file name carries environment, PID, and timestamp
        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");
        let log_path = log_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(EnvFilter::new(log_level.clone())),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(EnvFilter::new(log_level)),
            );

        // A global subscriber may already be set by the embedding process
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            log_file = %log_path.display(),
            "🔧 STRUCTURED LOGGING: Initialized with file output"
        );

        // The guard must outlive the process for the file layer to flush
        std::mem::forget(guard);
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("CARDFLOW_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for batch operations
pub fn log_batch_operation(
    operation: &str,
    batch_ref: Option<&str>,
    total_cards: Option<usize>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        batch_ref = batch_ref,
        total_cards = total_cards,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🗂️ BATCH_OPERATION"
    );
}

/// Log structured data for card operations
pub fn log_card_operation(
    operation: &str,
    card_uuid: Option<&str>,
    employee_code: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        card_uuid = card_uuid,
        employee_code = employee_code,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🪪 CARD_OPERATION"
    );
}

/// Log structured data for object storage operations
pub fn log_storage_operation(
    operation: &str,
    path: &str,
    status: &str,
    bytes: Option<usize>,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        path = %path,
        status = %status,
        bytes = bytes,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📦 STORAGE_OPERATION"
    );
}

/// Log structured data for vendor dispatch operations
pub fn log_dispatch_operation(
    operation: &str,
    batch_ref: Option<&str>,
    vendor_uuid: Option<&str>,
    requested: Option<usize>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        batch_ref = batch_ref,
        vendor_uuid = vendor_uuid,
        requested = requested,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🖨️ DISPATCH_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
