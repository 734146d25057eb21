//! Business logic layer: catalog reads, checkout, delivery tracking

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::cart::Cart;
use crate::error::{PosError, PosResult};
use crate::models::{
    CheckoutRequest, CreateSale, OrderKind, Product, ProductFilter, Sale, SaleStatus,
};
use crate::repository::{ProductCatalog, SaleRepository};

/// Read surface over the product catalog
///
/// Used by the presentation layer to populate the selectable product grid.
pub struct CatalogService<R: ProductCatalog> {
    repository: Arc<R>,
}

impl<R: ProductCatalog> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Build from an already shared repository
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> PosResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(PosError::ProductNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> PosResult<Vec<Product>> {
        self.repository.list(filter).await
    }
}

impl<R: ProductCatalog> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Turns a cart snapshot into a committed sale with consistent stock
pub struct CheckoutService<R: SaleRepository> {
    repository: Arc<R>,
}

impl<R: SaleRepository> CheckoutService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Build from an already shared repository
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate the cart and order metadata, then commit atomically
    ///
    /// On success the created sale is returned and the caller clears the
    /// cart. On any failure nothing is persisted and the cart is left
    /// intact for correction and retry.
    #[instrument(skip(self, cart, request), fields(kind = %request.kind, lines = cart.len()))]
    pub async fn checkout(&self, cart: &Cart, request: CheckoutRequest) -> PosResult<Sale> {
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }

        let delivery = match request.kind {
            OrderKind::Delivery => {
                let details = request
                    .delivery
                    .as_ref()
                    .ok_or(PosError::MissingDeliveryDetails)?;
                details
                    .validate()
                    .map_err(|_| PosError::MissingDeliveryDetails)?;
                Some(details.clone())
            }
            OrderKind::StorePickup => None,
        };

        // Caller-selected calendar date, time-of-day from the commit moment
        let date = request.sale_date.and_time(Utc::now().time()).and_utc();

        let status = match request.kind {
            OrderKind::Delivery => SaleStatus::Pending,
            OrderKind::StorePickup => SaleStatus::Completed,
        };

        let (customer_name, customer_phone, customer_address) = match delivery {
            Some(d) => (d.name, d.phone, d.address),
            None => Default::default(),
        };

        let input = CreateSale {
            date,
            kind: request.kind,
            status,
            total_price: cart.total(),
            customer_name,
            customer_phone,
            customer_address,
            items: cart.lines().iter().map(|line| line.to_sale_item()).collect(),
        };

        let sale = self.repository.commit(input).await?;

        tracing::info!(sale_id = %sale.id, total = sale.total_price, "Sale committed");
        Ok(sale)
    }
}

impl<R: SaleRepository> Clone for CheckoutService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Surfaces and resolves sales awaiting delivery
pub struct DeliveryService<R: SaleRepository> {
    repository: Arc<R>,
}

impl<R: SaleRepository> DeliveryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Build from an already shared repository
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Sales awaiting delivery, most-recently-created first
    #[instrument(skip(self))]
    pub async fn list_pending(&self) -> PosResult<Vec<Sale>> {
        self.repository.list_pending().await
    }

    /// Count of pending deliveries (the sidebar badge query)
    #[instrument(skip(self))]
    pub async fn pending_count(&self) -> PosResult<u64> {
        self.repository.count_pending().await
    }

    /// Resolve a pending delivery
    #[instrument(skip(self))]
    pub async fn mark_delivered(&self, id: Uuid) -> PosResult<Sale> {
        let sale = self.repository.mark_delivered(id).await?;
        tracing::info!(sale_id = %sale.id, "Delivery resolved");
        Ok(sale)
    }
}

impl<R: SaleRepository> Clone for DeliveryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
