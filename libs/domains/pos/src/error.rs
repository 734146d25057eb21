use thiserror::Error;
use uuid::Uuid;

use crate::models::SaleStatus;

/// Error taxonomy for the checkout core
///
/// Every variant is locally recoverable: the failing operation leaves prior
/// state unchanged and the caller decides how to surface it.
#[derive(Debug, Error)]
pub enum PosError {
    /// Product has no stock left (cart add)
    #[error("Product {0} is out of stock")]
    OutOfStock(Uuid),

    /// Cart already holds the product's full stock (cart add)
    #[error("Maximum stock reached for product {0}")]
    MaxStockReached(Uuid),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Delivery orders require customer name, phone, and address")]
    MissingDeliveryDetails,

    /// Live stock dropped below the requested quantity (commit-time re-check)
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(Uuid),

    /// Sale is not in a state that allows the requested status change
    #[error("Sale {id} is {status}, only Pending sales can be marked Delivered")]
    InvalidTransition { id: Uuid, status: SaleStatus },

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Sale not found: {0}")]
    SaleNotFound(Uuid),

    /// Storage-layer failure; no partial write is ever visible
    #[error("Database error: {0}")]
    Database(String),
}

pub type PosResult<T> = Result<T, PosError>;

impl From<mongodb::error::Error> for PosError {
    fn from(err: mongodb::error::Error) -> Self {
        PosError::Database(err.to_string())
    }
}

impl From<database::DatabaseError> for PosError {
    fn from(err: database::DatabaseError) -> Self {
        PosError::Database(err.to_string())
    }
}
