use serde::{Deserialize, Serialize};
use std::fmt;

/// Batch lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Initial state when the batch is saved
    Pending,
    /// Every card in the batch has been dispatched to a vendor
    SentForPrinting,
    /// Every card in the batch has been collected
    Completed,
}

impl BatchStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SentForPrinting => "sent_for_printing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent_for_printing" => Ok(Self::SentForPrinting),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid batch status: {s}")),
        }
    }
}

/// Card lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// Initial state when the card row is materialized
    Pending,
    /// Card has been dispatched to a print vendor
    SentForPrinting,
    /// Card has been collected by its employee
    Completed,
}

impl CardStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if this card still needs vendor dispatch
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SentForPrinting => "sent_for_printing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent_for_printing" => Ok(Self::SentForPrinting),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid card status: {s}")),
        }
    }
}

/// Print progress states, advanced independently of [`CardStatus`].
///
/// The unset state is represented as `NULL` in the database and `None` in
/// model structs; only the two set values round-trip through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintStatus {
    /// Vendor has printed the card
    Printed,
    /// Printed card is ready for the employee to collect
    ReadyToCollect,
}

impl PrintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Printed => "printed",
            Self::ReadyToCollect => "ready_to_collect",
        }
    }
}

impl fmt::Display for PrintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "printed" => Ok(Self::Printed),
            "ready_to_collect" => Ok(Self::ReadyToCollect),
            _ => Err(format!("Invalid print status: {s}")),
        }
    }
}

/// Default state for new batches
impl Default for BatchStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Default state for new cards
impl Default for CardStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_checks() {
        assert!(BatchStatus::Completed.is_terminal());
        assert!(!BatchStatus::Pending.is_terminal());
        assert!(!BatchStatus::SentForPrinting.is_terminal());

        assert!(CardStatus::Completed.is_terminal());
        assert!(CardStatus::Pending.is_dispatchable());
        assert!(!CardStatus::SentForPrinting.is_dispatchable());
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(BatchStatus::SentForPrinting.to_string(), "sent_for_printing");
        assert_eq!(
            "completed".parse::<BatchStatus>().unwrap(),
            BatchStatus::Completed
        );

        assert_eq!(CardStatus::Pending.to_string(), "pending");
        assert_eq!(
            "sent_for_printing".parse::<CardStatus>().unwrap(),
            CardStatus::SentForPrinting
        );

        assert_eq!(PrintStatus::ReadyToCollect.to_string(), "ready_to_collect");
        assert!("unset".parse::<PrintStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let status = CardStatus::SentForPrinting;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"sent_for_printing\"");

        let parsed: CardStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }
}
