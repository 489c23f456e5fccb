use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ModelId = i64;

/// Lifecycle state of an order. No transition graph is enforced: any
/// of the five values may follow any other, matching the store's
/// behavior. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// One row of the order list view: the order joined with the
/// ordering user's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: ModelId,
    pub user_id: ModelId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

/// Single-order composite: the order joined with the user, plus all
/// line items joined with their product's name and description. This
/// is also the exact shape cached under `order:{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: ModelId,
    pub user_id: ModelId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub id: ModelId,
    pub product_id: ModelId,
    pub quantity: i32,
    /// Price snapshot taken at order time, independent of later
    /// product price changes.
    pub price: Decimal,
    pub product_name: String,
    pub product_description: Option<String>,
}

/// Client request to create an order. Prices are deliberately absent:
/// they are read from the products table at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<ModelId>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ModelId,
    pub quantity: i32,
}

/// Validated creation input handed to the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: ModelId,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<String>,
}

/// What a successful creation reports back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderReceipt {
    pub order_id: ModelId,
    pub total_amount: Decimal,
}
