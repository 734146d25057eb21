//! POS Domain
//!
//! The transactional sale-checkout core of the point-of-sale system:
//! cart assembly and validation, atomic commit of a sale together with the
//! matching stock decrements, and the delivery-status lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          Services            │  ← CatalogService, CheckoutService,
//! └──────────────┬───────────────┘    DeliveryService (business rules)
//!                │
//! ┌──────────────▼───────────────┐
//! │         Repositories         │  ← ProductCatalog + SaleRepository
//! └──────────────┬───────────────┘    (traits; MongoDB and in-memory impls)
//!                │
//! ┌──────────────▼───────────────┐
//! │         Models / Cart        │  ← Entities, DTOs, in-memory cart
//! └──────────────────────────────┘
//! ```
//!
//! The cart lives entirely in memory for one checkout session. The only
//! write path into storage is [`SaleRepository::commit`], which persists the
//! sale and decrements stock for every line as a single atomic unit; a
//! conditional per-line re-check inside that boundary guarantees stock never
//! goes negative even under concurrent checkouts.
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::mongo::{self, MongoConfig};
//! use domain_pos::{Cart, CheckoutRequest, CheckoutService, MongoPosRepository, OrderKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MongoConfig::from_env()?;
//! let client = mongo::connect_from_config(&config).await?;
//! let repository = MongoPosRepository::new(client.database(config.database()));
//! let checkout = CheckoutService::new(repository);
//!
//! let mut cart = Cart::new();
//! // cart.add_item(&product)?; ...
//! let sale = checkout
//!     .checkout(
//!         &cart,
//!         CheckoutRequest {
//!             kind: OrderKind::StorePickup,
//!             sale_date: chrono::Utc::now().date_naive(),
//!             delivery: None,
//!         },
//!     )
//!     .await?;
//! cart.clear();
//! # Ok(())
//! # }
//! ```

pub mod cart;
pub mod error;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use cart::{Cart, CartLine};
pub use error::{PosError, PosResult};
pub use memory::InMemoryPosRepository;
pub use models::{
    CheckoutRequest, CreateSale, DeliveryDetails, OrderKind, Product, ProductFilter,
    ProductSource, Sale, SaleItem, SaleStatus,
};
pub use mongodb::MongoPosRepository;
pub use repository::{ProductCatalog, SaleRepository};
pub use service::{CatalogService, CheckoutService, DeliveryService};
