//! MongoDB implementation of the POS repositories
//!
//! One repository type backs both traits: products and sales live in the
//! same database and the checkout commit has to touch both inside a single
//! transaction.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, doc, to_bson},
    options::{FindOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{PosError, PosResult};
use crate::models::{CreateSale, Product, ProductFilter, Sale, SaleStatus};
use crate::repository::{ProductCatalog, SaleRepository};

/// MongoDB-backed implementation of [`ProductCatalog`] and [`SaleRepository`]
pub struct MongoPosRepository {
    client: Client,
    products: Collection<Product>,
    sales: Collection<Sale>,
}

impl MongoPosRepository {
    /// Create a repository over the `products` and `sales` collections
    pub fn new(db: Database) -> Self {
        let client = db.client().clone();
        let products = db.collection::<Product>("products");
        let sales = db.collection::<Sale>("sales");
        Self {
            client,
            products,
            sales,
        }
    }

    /// Connect using the store configuration and return a ready repository
    pub async fn connect(config: &database::MongoConfig) -> PosResult<Self> {
        let client = database::mongo::connect_from_config(config).await?;
        Ok(Self::new(client.database(config.database())))
    }

    fn id_bson(id: &Uuid) -> Bson {
        to_bson(id).unwrap_or(Bson::Null)
    }

    fn now_bson() -> Bson {
        to_bson(&Utc::now()).unwrap_or(Bson::Null)
    }

    /// Build a MongoDB filter document from ProductFilter
    fn build_product_filter(filter: &ProductFilter) -> mongodb::bson::Document {
        let mut doc = doc! {};

        if let Some(ref source) = filter.source {
            doc.insert("source", source.to_string());
        }

        if let Some(ref search) = filter.search {
            doc.insert("name", doc! { "$regex": search, "$options": "i" });
        }

        doc
    }
}

#[async_trait]
impl ProductCatalog for MongoPosRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> PosResult<Option<Product>> {
        let product = self
            .products
            .find_one(doc! { "_id": Self::id_bson(&id) })
            .await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> PosResult<Vec<Product>> {
        use futures_util::TryStreamExt;

        let mongo_filter = Self::build_product_filter(&filter);

        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "name": 1 })
            .build();

        let cursor = self
            .products
            .find(mongo_filter)
            .with_options(options)
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn decrement_stock(&self, id: Uuid, qty: i32) -> PosResult<()> {
        let filter = doc! { "_id": Self::id_bson(&id), "stock": { "$gte": qty } };
        let update = doc! {
            "$inc": { "stock": -qty },
            "$set": { "updated_at": Self::now_bson() },
        };

        let result = self.products.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return match ProductCatalog::get_by_id(self, id).await? {
                Some(_) => Err(PosError::InsufficientStock(id)),
                None => Err(PosError::ProductNotFound(id)),
            };
        }
        Ok(())
    }
}

#[async_trait]
impl SaleRepository for MongoPosRepository {
    #[instrument(skip(self, input), fields(kind = %input.kind, lines = input.items.len()))]
    async fn commit(&self, input: CreateSale) -> PosResult<Sale> {
        let sale = Sale::new(input);

        // Sale insert and every stock decrement become visible as one unit.
        // The conditional filter re-checks live stock inside the transaction,
        // so two concurrent checkouts can never jointly oversell.
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        self.sales
            .insert_one(&sale)
            .session(&mut session)
            .await?;

        for item in &sale.items {
            let filter = doc! {
                "_id": Self::id_bson(&item.product_id),
                "stock": { "$gte": item.qty },
            };
            let update = doc! {
                "$inc": { "stock": -item.qty },
                "$set": { "updated_at": Self::now_bson() },
            };

            let result = self
                .products
                .update_one(filter, update)
                .session(&mut session)
                .await?;

            if result.matched_count == 0 {
                session.abort_transaction().await?;
                tracing::warn!(
                    product_id = %item.product_id,
                    qty = item.qty,
                    "Live stock below requested quantity, sale aborted"
                );
                return Err(PosError::InsufficientStock(item.product_id));
            }
        }

        session.commit_transaction().await?;

        tracing::info!(sale_id = %sale.id, total = sale.total_price, "Sale persisted");
        Ok(sale)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> PosResult<Option<Sale>> {
        let sale = self
            .sales
            .find_one(doc! { "_id": Self::id_bson(&id) })
            .await?;
        Ok(sale)
    }

    #[instrument(skip(self))]
    async fn list_pending(&self) -> PosResult<Vec<Sale>> {
        use futures_util::TryStreamExt;

        let filter = doc! { "status": SaleStatus::Pending.to_string() };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();

        let cursor = self.sales.find(filter).with_options(options).await?;
        let sales: Vec<Sale> = cursor.try_collect().await?;

        Ok(sales)
    }

    #[instrument(skip(self))]
    async fn count_pending(&self) -> PosResult<u64> {
        let filter = doc! { "status": SaleStatus::Pending.to_string() };
        let count = self.sales.count_documents(filter).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn mark_delivered(&self, id: Uuid) -> PosResult<Sale> {
        let filter = doc! {
            "_id": Self::id_bson(&id),
            "status": SaleStatus::Pending.to_string(),
        };
        let update = doc! {
            "$set": {
                "status": SaleStatus::Delivered.to_string(),
                "updated_at": Self::now_bson(),
            },
        };

        let updated = self
            .sales
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(sale) => {
                tracing::info!(sale_id = %id, "Sale marked delivered");
                Ok(sale)
            }
            // The conditional update missed: distinguish a wrong status
            // from a missing sale.
            None => match SaleRepository::get_by_id(self, id).await? {
                Some(sale) => Err(PosError::InvalidTransition {
                    id,
                    status: sale.status,
                }),
                None => Err(PosError::SaleNotFound(id)),
            },
        }
    }
}
