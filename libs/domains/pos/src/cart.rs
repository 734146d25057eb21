//! In-memory cart for one checkout session
//!
//! The cart never touches persisted stock; it validates quantities against
//! the stock ceiling observed when a product was last added. The commit-time
//! re-check in the repository is the authoritative guard.

use uuid::Uuid;

use crate::error::{PosError, PosResult};
use crate::models::{Product, SaleItem};

/// One selected product with quantity and captured prices
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    /// Unit retail price captured at add-time
    pub price: f64,
    /// Unit cost price captured at add-time
    pub cost_price: f64,
    pub qty: i32,
    /// Stock ceiling observed at the last successful add
    pub stock: i32,
}

impl CartLine {
    /// Freeze this line into a sale item snapshot
    pub fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            product_id: self.product_id,
            name: self.name.clone(),
            price: self.price,
            cost_price: self.cost_price,
            qty: self.qty,
        }
    }
}

/// Mutable selection for a single checkout session
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product
    ///
    /// Inserts a new line with quantity 1, capturing the product's current
    /// price and cost. If the product is already in the cart the quantity is
    /// incremented instead, keeping the originally captured prices but
    /// refreshing the stock ceiling.
    pub fn add_item(&mut self, product: &Product) -> PosResult<()> {
        if product.stock <= 0 {
            return Err(PosError::OutOfStock(product.id));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            if line.qty >= product.stock {
                return Err(PosError::MaxStockReached(product.id));
            }
            line.qty += 1;
            line.stock = product.stock;
            return Ok(());
        }

        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            cost_price: product.cost_price,
            qty: 1,
            stock: product.stock,
        });
        Ok(())
    }

    /// Adjust a line's quantity by `delta`
    ///
    /// A resulting quantity of zero or less removes the line. A quantity
    /// above the line's stock ceiling is a silent no-op, as is an unknown
    /// product id.
    pub fn update_quantity(&mut self, product_id: Uuid, delta: i32) {
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return;
        };

        let line = &mut self.lines[index];
        let new_qty = line.qty + delta;
        if new_qty <= 0 {
            self.lines.remove(index);
            return;
        }
        if new_qty > line.stock {
            return;
        }
        line.qty = new_qty;
    }

    /// Remove all lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price x quantity over all lines
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| line.price * f64::from(line.qty))
            .sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}
