//! In-memory implementation of the POS repositories
//!
//! A drop-in stand-in for [`crate::mongodb::MongoPosRepository`] used in
//! tests and local development. A single lock around the whole store gives
//! the commit the same all-or-nothing guarantee as the MongoDB transaction:
//! every line is validated against live stock before any mutation is
//! applied.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{PosError, PosResult};
use crate::models::{CreateSale, Product, ProductFilter, Sale, SaleStatus};
use crate::repository::{ProductCatalog, SaleRepository};

#[derive(Debug, Default)]
struct Store {
    products: HashMap<Uuid, Product>,
    sales: Vec<Sale>,
}

/// In-memory implementation of [`ProductCatalog`] and [`SaleRepository`]
#[derive(Debug, Default)]
pub struct InMemoryPosRepository {
    store: Mutex<Store>,
}

impl InMemoryPosRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product (test seeding; catalog editing is
    /// external to the core)
    pub async fn upsert_product(&self, product: Product) {
        self.store.lock().await.products.insert(product.id, product);
    }

    /// Number of persisted sales, regardless of status
    pub async fn sale_count(&self) -> usize {
        self.store.lock().await.sales.len()
    }

    /// Current state of a product, bypassing the trait (avoids the
    /// `get_by_id` name collision between the two repository traits)
    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.store.lock().await.products.get(&id).cloned()
    }

    /// Current state of a sale, bypassing the trait
    pub async fn sale(&self, id: Uuid) -> Option<Sale> {
        self.store
            .lock()
            .await
            .sales
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryPosRepository {
    async fn get_by_id(&self, id: Uuid) -> PosResult<Option<Product>> {
        Ok(self.store.lock().await.products.get(&id).cloned())
    }

    async fn list(&self, filter: ProductFilter) -> PosResult<Vec<Product>> {
        let store = self.store.lock().await;

        let mut products: Vec<Product> = store
            .products
            .values()
            .filter(|p| filter.source.is_none_or(|source| p.source == source))
            .filter(|p| {
                filter
                    .search
                    .as_ref()
                    .is_none_or(|search| p.name.to_lowercase().contains(&search.to_lowercase()))
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));

        let products = products.into_iter().skip(filter.offset as usize);
        Ok(if filter.limit > 0 {
            products.take(filter.limit as usize).collect()
        } else {
            products.collect()
        })
    }

    async fn decrement_stock(&self, id: Uuid, qty: i32) -> PosResult<()> {
        let mut store = self.store.lock().await;

        let product = store
            .products
            .get_mut(&id)
            .ok_or(PosError::ProductNotFound(id))?;
        if product.stock < qty {
            return Err(PosError::InsufficientStock(id));
        }

        product.stock -= qty;
        product.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl SaleRepository for InMemoryPosRepository {
    async fn commit(&self, input: CreateSale) -> PosResult<Sale> {
        let mut store = self.store.lock().await;

        // Validate every line before touching anything, so a late failure
        // cannot leave earlier decrements behind.
        for item in &input.items {
            let live = store
                .products
                .get(&item.product_id)
                .map(|p| p.stock)
                .unwrap_or(0);
            if live < item.qty {
                return Err(PosError::InsufficientStock(item.product_id));
            }
        }

        for item in &input.items {
            if let Some(product) = store.products.get_mut(&item.product_id) {
                product.stock -= item.qty;
                product.updated_at = Utc::now();
            }
        }

        let sale = Sale::new(input);
        store.sales.push(sale.clone());
        Ok(sale)
    }

    async fn get_by_id(&self, id: Uuid) -> PosResult<Option<Sale>> {
        Ok(self
            .store
            .lock()
            .await
            .sales
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn list_pending(&self) -> PosResult<Vec<Sale>> {
        let store = self.store.lock().await;

        let mut pending: Vec<Sale> = store
            .sales
            .iter()
            .filter(|s| s.status == SaleStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(pending)
    }

    async fn count_pending(&self) -> PosResult<u64> {
        let store = self.store.lock().await;
        Ok(store
            .sales
            .iter()
            .filter(|s| s.status == SaleStatus::Pending)
            .count() as u64)
    }

    async fn mark_delivered(&self, id: Uuid) -> PosResult<Sale> {
        let mut store = self.store.lock().await;

        let sale = store
            .sales
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(PosError::SaleNotFound(id))?;

        if sale.status != SaleStatus::Pending {
            return Err(PosError::InvalidTransition {
                id,
                status: sale.status,
            });
        }

        sale.status = SaleStatus::Delivered;
        sale.updated_at = Utc::now();
        Ok(sale.clone())
    }
}
