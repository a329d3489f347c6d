//! Domain types shared across service boundaries (spec.md §3).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    StockVerified,
    InKitchen,
    Ready,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Ready | OrderStatus::Failed)
    }

    /// Next state on the automatic happy-path chain, or `None` if this state
    /// has no automatic successor (spec.md §4.G).
    pub fn next_forward(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::StockVerified),
            OrderStatus::StockVerified => Some(OrderStatus::InKitchen),
            OrderStatus::InKitchen => Some(OrderStatus::Ready),
            OrderStatus::Ready | OrderStatus::Failed => None,
        }
    }

    /// Manual-override successor along the linear chain only — never into
    /// or out of `Failed` (spec.md §4.G manual-override interface).
    pub fn manual_advance(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::StockVerified),
            OrderStatus::StockVerified => Some(OrderStatus::InKitchen),
            OrderStatus::InKitchen => Some(OrderStatus::Ready),
            OrderStatus::Ready | OrderStatus::Failed => None,
        }
    }

    pub fn manual_revert(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Ready => Some(OrderStatus::InKitchen),
            OrderStatus::InKitchen => Some(OrderStatus::StockVerified),
            OrderStatus::StockVerified => Some(OrderStatus::Pending),
            OrderStatus::Pending | OrderStatus::Failed => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::StockVerified => "STOCK_VERIFIED",
            OrderStatus::InKitchen => "IN_KITCHEN",
            OrderStatus::Ready => "READY",
            OrderStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "STOCK_VERIFIED" => Ok(OrderStatus::StockVerified),
            "IN_KITCHEN" => Ok(OrderStatus::InKitchen),
            "READY" => Ok(OrderStatus::Ready),
            "FAILED" => Ok(OrderStatus::Failed),
            other => anyhow::bail!("unknown order status {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: String,
    pub quantity: u32,
}

/// Payload published on `order:{order_id}` and consumed by notify-service's
/// SSE stream (spec.md §3 "Pub/sub channel").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusEvent {
    pub order_id: String,
    pub status: OrderStatus,
    pub principal_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_chain_is_linear() {
        assert_eq!(
            OrderStatus::Pending.next_forward(),
            Some(OrderStatus::StockVerified)
        );
        assert_eq!(
            OrderStatus::StockVerified.next_forward(),
            Some(OrderStatus::InKitchen)
        );
        assert_eq!(OrderStatus::InKitchen.next_forward(), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::Ready.next_forward(), None);
    }

    #[test]
    fn terminal_states_are_ready_and_failed() {
        assert!(OrderStatus::Ready.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::InKitchen.is_terminal());
    }

    #[test]
    fn manual_override_never_touches_failed() {
        assert_eq!(OrderStatus::Failed.manual_advance(), None);
        assert_eq!(OrderStatus::Failed.manual_revert(), None);
        assert_eq!(OrderStatus::Pending.manual_revert(), None);
        assert_eq!(OrderStatus::Ready.manual_advance(), None);
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::StockVerified).unwrap();
        assert_eq!(json, "\"STOCK_VERIFIED\"");
    }
}
