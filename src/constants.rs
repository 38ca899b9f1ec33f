//! # System Constants
//!
//! Core constants, enums, and groupings that define the operational
//! boundaries of the card fulfillment workflow.

// Re-export state types for convenience
pub use crate::state_machine::{BatchStatus, CardStatus, PrintStatus};

/// Lifecycle events emitted through the structured logging layer
pub mod events {
    // Batch lifecycle events
    pub const BATCH_SAVE_REQUESTED: &str = "batch.save_requested";
    pub const BATCH_SAVED: &str = "batch.saved";
    pub const BATCH_SENT_FOR_PRINTING: &str = "batch.sent_for_printing";
    pub const BATCH_COMPLETED: &str = "batch.completed";
    pub const BATCH_DELETED: &str = "batch.deleted";
    pub const BATCH_DELETE_REJECTED: &str = "batch.delete_rejected";

    // Card lifecycle events
    pub const CARD_SENT_FOR_PRINTING: &str = "card.sent_for_printing";
    pub const CARD_READY_TO_COLLECT: &str = "card.ready_to_collect";
    pub const CARD_ROW_SKIPPED: &str = "card.row_skipped";

    // Vendor dispatch events
    pub const VENDOR_REQUEST_SENT: &str = "vendor_request.sent";
    pub const VENDOR_REQUEST_COLLECTED: &str = "vendor_request.collected";
}

/// Branch whitelist for employee records
pub mod branches {
    /// Branches accepted at employee creation
    pub const ALLOWED: &[&str] = &["HYD", "VIZAG", "BLR", "MUM", "DEL"];

    /// Fallback branch for values outside the whitelist
    pub const DEFAULT: &str = "HYD";

    /// Coerce a raw branch value onto the whitelist.
    ///
    /// Matching is case-insensitive on input; the stored value is always the
    /// canonical uppercase form. Anything outside the whitelist silently
    /// becomes [`DEFAULT`].
    pub fn normalize(raw: &str) -> &'static str {
        let trimmed = raw.trim();
        ALLOWED
            .iter()
            .find(|b| b.eq_ignore_ascii_case(trimmed))
            .copied()
            .unwrap_or(DEFAULT)
    }
}

/// Human-readable batch reference format (`B-NNNNN`)
pub mod batch_ref {
    pub const PREFIX: &str = "B-";
    pub const PAD_WIDTH: usize = 5;

    /// Format a counter value as a batch reference
    pub fn format(counter: u32) -> String {
        format!("{}{:0width$}", PREFIX, counter, width = PAD_WIDTH)
    }

    /// Parse the numeric suffix out of a batch reference.
    ///
    /// Returns `None` when the value does not match `B-<digits>`.
    pub fn parse(reference: &str) -> Option<u32> {
        let digits = reference.strip_prefix(PREFIX)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Compute the reference that follows the given latest one.
    ///
    /// `None` or an unparseable latest reference restarts the counter at 1.
    /// Zero padding keeps lexical order aligned with numeric order.
    pub fn next_after(latest: Option<&str>) -> String {
        let counter = latest.and_then(parse).unwrap_or(0) + 1;
        format(counter)
    }
}

/// System-wide constants
pub mod system {
    /// Reserved key injected into every card snapshot for the packaging archive
    pub const ZIP_URL_KEY: &str = "zip_url";

    /// Bounded retries for batch-reference conflicts under concurrent saves
    pub const BATCH_REF_RETRY_LIMIT: u32 = 3;

    /// Version compatibility marker
    pub const CARDFLOW_CORE_VERSION: &str = "0.1.0";
}

/// Status groupings for validation and logic
pub mod status_groups {
    use super::{BatchStatus, CardStatus};

    /// Card statuses counted as already dispatched to a vendor
    pub const DISPATCHED_CARD_STATES: &[CardStatus] =
        &[CardStatus::SentForPrinting, CardStatus::Completed];

    /// Batch statuses that indicate no further mutation is expected
    pub const BATCH_FINAL_STATES: &[BatchStatus] = &[BatchStatus::Completed];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_normalization() {
        assert_eq!(branches::normalize("HYD"), "HYD");
        assert_eq!(branches::normalize("vizag"), "VIZAG");
        assert_eq!(branches::normalize(" blr "), "BLR");
        assert_eq!(branches::normalize("xyz"), "HYD");
        assert_eq!(branches::normalize(""), "HYD");
    }

    #[test]
    fn test_batch_ref_format() {
        assert_eq!(batch_ref::format(1), "B-00001");
        assert_eq!(batch_ref::format(42), "B-00042");
        assert_eq!(batch_ref::format(123456), "B-123456");
    }

    #[test]
    fn test_batch_ref_parse() {
        assert_eq!(batch_ref::parse("B-00042"), Some(42));
        assert_eq!(batch_ref::parse("B-1"), Some(1));
        assert_eq!(batch_ref::parse("B-"), None);
        assert_eq!(batch_ref::parse("B-12x"), None);
        assert_eq!(batch_ref::parse("batch-7"), None);
    }

    #[test]
    fn test_next_after() {
        assert_eq!(batch_ref::next_after(None), "B-00001");
        assert_eq!(batch_ref::next_after(Some("B-00042")), "B-00043");
        assert_eq!(batch_ref::next_after(Some("garbage")), "B-00001");
    }
}
