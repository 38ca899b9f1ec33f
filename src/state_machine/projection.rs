//! # Display Status Projection
//!
//! Read-side derivation of the operator-facing status badge from the
//! persisted `print_status` and packaging-archive URL. List views and detail
//! views share this ladder, in this exact precedence order, because the
//! underlying fields are independently settable and can co-occur.

use crate::state_machine::PrintStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator-facing status derived for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    ReadyToCollect,
    Printed,
    SentToPrint,
    NotSent,
}

impl DisplayStatus {
    /// Badge label shown to operators
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadyToCollect => "Ready to Collect",
            Self::Printed => "Printed",
            Self::SentToPrint => "Sent to Print",
            Self::NotSent => "Not Sent",
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the display status for a card.
///
/// Precedence: `ready_to_collect` > `printed` > non-empty archive URL > none.
pub fn display_status(print_status: Option<PrintStatus>, zip_url: Option<&str>) -> DisplayStatus {
    match print_status {
        Some(PrintStatus::ReadyToCollect) => DisplayStatus::ReadyToCollect,
        Some(PrintStatus::Printed) => DisplayStatus::Printed,
        None => {
            if zip_url.is_some_and(|u| !u.is_empty()) {
                DisplayStatus::SentToPrint
            } else {
                DisplayStatus::NotSent
            }
        }
    }
}

/// Derive the display status from raw persisted fields.
///
/// An unrecognized `print_status` value falls through to the archive check,
/// the same way an unset one does.
pub fn display_status_raw(print_status: Option<&str>, zip_url: Option<&str>) -> DisplayStatus {
    display_status(print_status.and_then(|s| s.parse().ok()), zip_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_precedence() {
        // printed wins over a present archive URL
        assert_eq!(
            display_status(Some(PrintStatus::Printed), Some("https://cdn/x.zip")),
            DisplayStatus::Printed
        );
        // ready_to_collect wins over everything
        assert_eq!(
            display_status(Some(PrintStatus::ReadyToCollect), Some("https://cdn/x.zip")),
            DisplayStatus::ReadyToCollect
        );
    }

    #[test]
    fn test_archive_presence() {
        assert_eq!(
            display_status(None, Some("https://cdn/x.zip")),
            DisplayStatus::SentToPrint
        );
        assert_eq!(display_status(None, Some("")), DisplayStatus::NotSent);
        assert_eq!(display_status(None, None), DisplayStatus::NotSent);
    }

    #[test]
    fn test_raw_fields() {
        assert_eq!(
            display_status_raw(Some("ready_to_collect"), None),
            DisplayStatus::ReadyToCollect
        );
        assert_eq!(
            display_status_raw(Some("printed"), Some("https://cdn/x.zip")),
            DisplayStatus::Printed
        );
        // unknown value degrades to the archive check
        assert_eq!(
            display_status_raw(Some("bogus"), Some("https://cdn/x.zip")),
            DisplayStatus::SentToPrint
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(DisplayStatus::ReadyToCollect.label(), "Ready to Collect");
        assert_eq!(DisplayStatus::Printed.label(), "Printed");
        assert_eq!(DisplayStatus::SentToPrint.label(), "Sent to Print");
        assert_eq!(DisplayStatus::NotSent.label(), "Not Sent");
    }
}
