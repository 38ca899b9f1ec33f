//! Shared result types for the workflow services.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of persisting a batch session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub batch_uuid: Uuid,
    /// Human-readable reference for the operator-facing success notice
    pub batch_ref: String,
    /// Cards actually persisted (rows minus skips)
    pub total_cards: usize,
    /// Employees created on first sight of their code
    pub created_employees: usize,
    pub skipped_rows: Vec<SkippedRow>,
}

/// A row the save skipped without aborting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_index: usize,
    pub reason: String,
}

/// Result of a vendor dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub batch_uuid: Uuid,
    pub vendor_uuid: Uuid,
    /// Rows selected for dispatch
    pub requested: usize,
    /// Vendor requests actually recorded
    pub dispatched: usize,
    /// Whether the batch itself was promoted to `sent_for_printing`
    pub batch_promoted: bool,
    pub failures: Vec<RowFailure>,
}

/// A selected row whose dispatch failed; the remaining rows proceed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_index: usize,
    pub employee_code: Option<String>,
    pub error: String,
}

/// Result of marking a card done and re-checking its batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupOutcome {
    pub card_uuid: Uuid,
    pub batch_uuid: Uuid,
    /// Whether this call moved the card (repeat calls no-op)
    pub card_updated: bool,
    /// Whether the batch was promoted to `completed`
    pub batch_completed: bool,
}

/// Result of a vendor marking a request collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionOutcome {
    pub request_uuid: Uuid,
    pub request_updated: bool,
    /// Rollup of the linked card, when the request still references one
    pub rollup: Option<RollupOutcome>,
}

/// Result of a batch deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeleteOutcome {
    /// Cards and batch row removed
    Deleted { cards_removed: u64 },
    /// Cards were removed but the batch delete affected zero rows: a
    /// likely authorization-policy rejection, surfaced distinctly
    PolicyRejected { cards_removed: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_outcome_serialization() {
        let outcome = DeleteOutcome::PolicyRejected { cards_removed: 4 };
        let serialized = serde_json::to_string(&outcome).unwrap();
        assert_eq!(serialized, r#"{"PolicyRejected":{"cards_removed":4}}"#);
    }
}
