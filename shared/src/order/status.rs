//! Order status state machine
//!
//! Statuses move strictly forward; no status is ever revisited. The
//! transition table below is the single authority — callers must go
//! through [`OrderStatus::can_transition_to`] and fail on a rejected edge
//! instead of clamping.
//!
//! ```text
//! PENDING ──► ACCEPTED ──► OUT_FOR_DELIVERY ──► COMPLETED
//!    │            │               │
//!    ├──► DECLINED└───────────────┴──────────► CANCELLED
//! ```
//!
//! `DECLINED`, `COMPLETED` and `CANCELLED` are terminal; `CANCELLED` is
//! reachable from every non-terminal status.

use serde::{Deserialize, Serialize};

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Declined,
    OutForDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether the edge `self -> target` exists in the transition table.
    ///
    /// Self-transitions are rejected like any other missing edge.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted)
                | (Pending, Declined)
                | (Pending, Cancelled)
                | (Accepted, OutForDelivery)
                | (Accepted, Cancelled)
                | (OutForDelivery, Completed)
                | (OutForDelivery, Cancelled)
        )
    }

    /// Terminal statuses permit no further transition. Orders may only be
    /// deleted from a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Declined | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }

    /// Wire/display name (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Declined => "DECLINED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    const ALL: [OrderStatus; 6] = [Pending, Accepted, Declined, OutForDelivery, Completed, Cancelled];

    #[test]
    fn test_happy_path_edges() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(OutForDelivery));
        assert!(OutForDelivery.can_transition_to(Completed));
    }

    #[test]
    fn test_decline_and_cancel_edges() {
        assert!(Pending.can_transition_to(Declined));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(Cancelled));
        assert!(OutForDelivery.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_statuses_reject_everything() {
        for terminal in [Declined, Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for target in ALL {
                assert!(
                    !terminal.can_transition_to(target),
                    "{terminal} -> {target} must be rejected"
                );
            }
        }
    }

    #[test]
    fn test_skipping_acceptance_is_rejected() {
        assert!(!Pending.can_transition_to(OutForDelivery));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Completed));
    }

    #[test]
    fn test_no_backward_or_self_edges() {
        for status in ALL {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
            assert!(!status.can_transition_to(Pending), "{status} -> PENDING");
        }
        assert!(!OutForDelivery.can_transition_to(Accepted));
        assert!(!Completed.can_transition_to(OutForDelivery));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(OutForDelivery.to_string(), "OUT_FOR_DELIVERY");
        assert_eq!(Pending.as_str(), "PENDING");
        assert_eq!(Cancelled.as_str(), "CANCELLED");
    }
}
