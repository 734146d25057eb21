use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Where a product comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ProductSource {
    /// Produced in-house
    Own,
    /// Bought in for resale
    Wholesale,
}

/// Product entity - a catalog record with live stock (stored in `products`)
///
/// Stock is only ever decremented by the checkout commit; catalog editing
/// (create/update/delete) happens outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub source: ProductSource,
    /// Unit retail price
    pub price: f64,
    /// Unit cost price
    pub cost_price: f64,
    /// On-hand quantity, never negative once committed
    pub stock: i32,
    /// Unit label, e.g. "kg" or "pack"
    #[serde(default)]
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How the customer receives the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum OrderKind {
    #[serde(rename = "Store Pickup")]
    #[strum(serialize = "Store Pickup")]
    StorePickup,
    Delivery,
}

/// Sale status lifecycle
///
/// `Completed` is terminal and set only at creation for pickup sales.
/// `Pending -> Delivered` is the only allowed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum SaleStatus {
    Completed,
    Pending,
    Delivered,
}

/// Line-item snapshot frozen into a sale at commit time
///
/// Carries copies of the product's name and prices so that later catalog
/// edits never alter historical sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: Uuid,
    pub name: String,
    /// Unit retail price at sale time
    pub price: f64,
    /// Unit cost price at sale time
    pub cost_price: f64,
    pub qty: i32,
}

/// Sale entity - a committed transaction (stored in `sales`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Business timestamp: the caller-selected calendar date combined with
    /// the wall-clock time-of-day at commit
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub total_price: f64,
    /// Empty for store pickup
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    pub status: SaleStatus,
    pub items: Vec<SaleItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO consumed by [`crate::repository::SaleRepository::commit`]
#[derive(Debug, Clone)]
pub struct CreateSale {
    pub date: DateTime<Utc>,
    pub kind: OrderKind,
    pub status: SaleStatus,
    pub total_price: f64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Create a new sale from a CreateSale DTO
    pub fn new(input: CreateSale) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            date: input.date,
            kind: input.kind,
            total_price: input.total_price,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_address: input.customer_address,
            status: input.status,
            items: input.items,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Contact details required for delivery orders
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeliveryDetails {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub address: String,
}

/// Order metadata supplied by the operator at checkout
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub kind: OrderKind,
    /// Calendar date for the transaction; time-of-day is taken from the
    /// moment of commit
    pub sale_date: NaiveDate,
    /// Required when `kind` is `Delivery`
    pub delivery: Option<DeliveryDetails>,
}

/// Query filters for listing catalog products
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFilter {
    /// Filter by source
    pub source: Option<ProductSource>,
    /// Case-insensitive match against the product name
    pub search: Option<String>,
    /// Maximum number of results (0 = unlimited)
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            source: None,
            search: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}
