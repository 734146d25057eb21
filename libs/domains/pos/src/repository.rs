use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PosResult;
use crate::models::{CreateSale, Product, ProductFilter, Sale};

/// Read/decrement contract for the product catalog
///
/// Catalog mutation (create/edit/delete) lives outside this crate; the core
/// only reads products and decrements stock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid) -> PosResult<Option<Product>>;

    /// List products with optional filters
    async fn list(&self, filter: ProductFilter) -> PosResult<Vec<Product>>;

    /// Atomically decrement stock, only if `stock >= qty`
    ///
    /// Fails with `InsufficientStock` when the condition does not hold;
    /// stock is left untouched in that case.
    async fn decrement_stock(&self, id: Uuid, qty: i32) -> PosResult<()>;
}

/// Persistence contract for sales
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Persist a sale and decrement stock for every line as one atomic unit
    ///
    /// Live stock is re-checked per line inside the same atomic boundary;
    /// any line whose stock dropped below the requested quantity fails the
    /// whole operation with `InsufficientStock` and nothing becomes visible
    /// to other readers.
    async fn commit(&self, input: CreateSale) -> PosResult<Sale>;

    /// Get a sale by ID
    async fn get_by_id(&self, id: Uuid) -> PosResult<Option<Sale>>;

    /// All sales with status `Pending`, most-recently-created first
    async fn list_pending(&self) -> PosResult<Vec<Sale>>;

    /// Count of sales with status `Pending`
    async fn count_pending(&self) -> PosResult<u64>;

    /// Transition a sale `Pending -> Delivered`
    ///
    /// Any other current status fails with `InvalidTransition`; an unknown
    /// id fails with `SaleNotFound`.
    async fn mark_delivered(&self, id: Uuid) -> PosResult<Sale>;
}
