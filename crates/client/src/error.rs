//! Unified error handling for the ordering library.
//!
//! Every operation returns `Result<T, OrderingError>`. Store failures are
//! converted at the service boundary - the UI shell never sees a raw
//! transport or database error - and each kind maps to exactly one
//! human-readable message via [`OrderingError::user_message`].

use thiserror::Error;

use green_basket_core::{OrderId, OrderStatus};

use crate::store::StoreError;

/// Error type exposed to the presentation layer.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// Local input validation failed (e.g. checkout on an empty cart).
    /// Detected before any remote call; zero side effects.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No authenticated user context is available.
    #[error("not signed in")]
    Auth,

    /// No pickup location has been selected.
    #[error("no pickup location selected")]
    LocationRequired,

    /// The order header was written but its line items were not, and the
    /// compensating delete also failed. The header is orphaned until an
    /// operator reconciles it; the id is always logged.
    #[error("order {order_id} persisted without line items")]
    PartialOrder {
        /// The orphaned order header's id.
        order_id: OrderId,
    },

    /// The requested status change is not permitted by the state machine.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the order held when it was read.
        from: OrderStatus,
        /// Status the caller asked for.
        to: OrderStatus,
    },

    /// Another client updated the order between our read and our write.
    /// Re-read the order before retrying.
    #[error("order status changed concurrently")]
    StaleStatus,

    /// No order exists with the given id or barcode.
    #[error("order not found")]
    UnknownOrder,

    /// The remote data service could not be reached or failed the call.
    /// Timeouts land here too - remote calls fail closed.
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),
}

impl OrderingError {
    /// The single user-facing message for this error kind.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Your cart is empty.",
            Self::Auth => "You must be logged in to place an order.",
            Self::LocationRequired => "Please select a location before placing an order.",
            Self::PartialOrder { .. } => {
                "Something went wrong placing your order. Please contact support."
            }
            Self::InvalidTransition { .. } => "That status change isn't allowed.",
            Self::StaleStatus => "This order was just updated by someone else. Refresh and retry.",
            Self::UnknownOrder => "We couldn't find that order.",
            Self::RemoteUnavailable(_) => "Service is temporarily unavailable. Try again.",
        }
    }
}

impl From<StoreError> for OrderingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::UnknownOrder,
            StoreError::Conflict(_) => Self::StaleStatus,
            StoreError::Unavailable(msg) => Self::RemoteUnavailable(msg),
            StoreError::DataCorruption(msg) => {
                Self::RemoteUnavailable(format!("corrupt record: {msg}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_transition() {
        let err = OrderingError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        };
        assert_eq!(
            err.to_string(),
            "invalid status transition: Completed -> Pending"
        );
    }

    #[test]
    fn partial_order_carries_the_orphaned_id() {
        let err = OrderingError::PartialOrder {
            order_id: OrderId::new(17),
        };
        assert_eq!(err.to_string(), "order 17 persisted without line items");
    }

    #[test]
    fn store_errors_never_leak_raw() {
        let err = OrderingError::from(StoreError::Unavailable("connection reset".to_owned()));
        assert!(matches!(err, OrderingError::RemoteUnavailable(_)));

        let err = OrderingError::from(StoreError::Conflict("status mismatch".to_owned()));
        assert!(matches!(err, OrderingError::StaleStatus));

        let err = OrderingError::from(StoreError::NotFound);
        assert!(matches!(err, OrderingError::UnknownOrder));
    }

    #[test]
    fn every_kind_has_a_user_message() {
        let kinds = [
            OrderingError::Validation("empty".to_owned()),
            OrderingError::Auth,
            OrderingError::LocationRequired,
            OrderingError::PartialOrder {
                order_id: OrderId::new(1),
            },
            OrderingError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Completed,
            },
            OrderingError::StaleStatus,
            OrderingError::UnknownOrder,
            OrderingError::RemoteUnavailable("down".to_owned()),
        ];
        for kind in kinds {
            assert!(!kind.user_message().is_empty());
        }
    }
}
