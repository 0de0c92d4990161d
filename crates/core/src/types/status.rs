//! Order status state machine and list filters.
//!
//! The backend stores statuses as PascalCase strings (`"AwaitingPickup"`),
//! which is what `Display`/`FromStr` speak. The employee fulfillment view
//! historically used its own three-stage vocabulary ("In Progress", "Ready
//! for Pickup", "Completed"); that is a presentation concern only, covered by
//! [`OrderStatus::display_label`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a submitted order.
///
/// ```text
/// Pending ─┬─> Processing ─┬─> AwaitingPickup ─┬─> Ready ──> Completed
///          │               │                   │
///          │               └───────────────────┴───────────> Completed
///          └─> (any non-terminal) ──> Cancelled | Failed | Refunded
/// ```
///
/// `Completed`, `Cancelled`, `Failed`, and `Refunded` are terminal: no
/// transition leaves them. `Completed` is not directly reachable from
/// `Pending` - an order must pass through at least one fulfillment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Submitted, not yet picked up by fulfillment staff.
    #[default]
    Pending,
    /// A staff member is assembling the order.
    Processing,
    /// Assembled and staged, customer not yet notified.
    AwaitingPickup,
    /// Staged and the customer has been notified.
    Ready,
    /// Picked up and handed over.
    Completed,
    /// Cancelled before handover.
    Cancelled,
    /// Could not be fulfilled.
    Failed,
    /// Payment returned after a cancellation or failure.
    Refunded,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Pending,
        Self::Processing,
        Self::AwaitingPickup,
        Self::Ready,
        Self::Completed,
        Self::Cancelled,
        Self::Failed,
        Self::Refunded,
    ];

    /// Whether no further transition is permitted from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Failed | Self::Refunded
        )
    }

    /// Whether this status counts as an active (in-flight) order.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Fulfillment stages only move forward; the abort statuses
    /// (`Cancelled`, `Failed`, `Refunded`) are reachable from any
    /// non-terminal status; terminal statuses permit nothing.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Processing
                    | Self::AwaitingPickup
                    | Self::Ready
                    | Self::Cancelled
                    | Self::Failed
                    | Self::Refunded
            ),
            Self::Processing => matches!(
                next,
                Self::AwaitingPickup
                    | Self::Ready
                    | Self::Completed
                    | Self::Cancelled
                    | Self::Failed
                    | Self::Refunded
            ),
            Self::AwaitingPickup => matches!(
                next,
                Self::Ready | Self::Completed | Self::Cancelled | Self::Failed | Self::Refunded
            ),
            Self::Ready => matches!(
                next,
                Self::Completed | Self::Cancelled | Self::Failed | Self::Refunded
            ),
            Self::Completed | Self::Cancelled | Self::Failed | Self::Refunded => false,
        }
    }

    /// Human-readable label for display.
    ///
    /// Carries the employee fulfillment view's vocabulary where it differs
    /// from the canonical name.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "In Progress",
            Self::AwaitingPickup => "Awaiting Pickup",
            Self::Ready => "Ready for Pickup",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }

    /// Canonical backend spelling of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::AwaitingPickup => "AwaitingPickup",
            Self::Ready => "Ready",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a stored status string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "AwaitingPickup" => Ok(Self::AwaitingPickup),
            "Ready" => Ok(Self::Ready),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Filter for order-history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderFilter {
    /// Every order regardless of status.
    #[default]
    All,
    /// Orders still moving through fulfillment.
    Active,
    /// Orders in a terminal status.
    Past,
}

impl OrderFilter {
    /// Whether an order with `status` passes this filter.
    #[must_use]
    pub const fn matches(self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status.is_active(),
            Self::Past => status.is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ALL: [OrderStatus; 8] = OrderStatus::ALL;

    const TERMINAL: [OrderStatus; 4] = [
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Failed,
        OrderStatus::Refunded,
    ];

    #[test]
    fn terminal_statuses_permit_no_transition() {
        for from in TERMINAL {
            for to in ALL {
                assert!(
                    !from.can_transition_to(to),
                    "{from} -> {to} should be rejected"
                );
            }
        }
    }

    #[test]
    fn pending_cannot_jump_straight_to_completed() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn employee_fulfillment_path_is_permitted() {
        // In Progress -> Ready for Pickup -> Completed
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn fulfillment_stages_do_not_move_backwards() {
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::AwaitingPickup.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn aborts_are_reachable_from_every_non_terminal() {
        for from in ALL.into_iter().filter(|s| s.is_active()) {
            assert!(from.can_transition_to(OrderStatus::Cancelled));
            assert!(from.can_transition_to(OrderStatus::Failed));
            assert!(from.can_transition_to(OrderStatus::Refunded));
        }
    }

    #[test]
    fn status_roundtrips_through_strings() {
        for status in ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(OrderStatus::from_str("Delivered").is_err());
    }

    #[test]
    fn display_labels_use_the_fulfillment_vocabulary() {
        assert_eq!(OrderStatus::Processing.display_label(), "In Progress");
        assert_eq!(OrderStatus::Ready.display_label(), "Ready for Pickup");
        assert_eq!(OrderStatus::Completed.display_label(), "Completed");
    }

    #[test]
    fn filters_partition_the_statuses() {
        for status in ALL {
            assert!(OrderFilter::All.matches(status));
            assert_ne!(
                OrderFilter::Active.matches(status),
                OrderFilter::Past.matches(status)
            );
        }
        assert!(OrderFilter::Active.matches(OrderStatus::Pending));
        assert!(OrderFilter::Past.matches(OrderStatus::Refunded));
    }
}
