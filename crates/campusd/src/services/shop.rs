//! Campus shop stock and orders.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use super::{ServiceError, lock};

const SERVICE: &str = "store";

/// A product on sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Stock-keeping unit, unique within the store.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Unit price in cents.
    pub price_cents: u64,
    /// Units in stock.
    pub stock: u32,
}

impl Product {
    /// Creates a product.
    #[must_use]
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price_cents: u64, stock: u32) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price_cents,
            stock,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Sequential order number.
    pub number: u64,
    /// Customer identity.
    pub customer: String,
    /// Ordered product.
    pub sku: String,
    /// Units ordered.
    pub quantity: u32,
    /// Total price in cents.
    pub total_cents: u64,
}

#[derive(Debug, Default)]
struct Shelves {
    products: BTreeMap<String, Product>,
    orders: Vec<Order>,
    last_order: u64,
}

/// Products and orders.
#[derive(Debug, Default)]
pub struct Store {
    shelves: Mutex<Shelves>,
}

impl Store {
    /// Store stocking `products`; a repeated sku keeps the last entry.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.sku.clone(), product))
            .collect();
        Self {
            shelves: Mutex::new(Shelves {
                products,
                orders: Vec::new(),
                last_order: 0,
            }),
        }
    }

    /// All products ordered by sku.
    ///
    /// # Errors
    ///
    /// Fails when the store state is unavailable.
    pub fn products(&self) -> Result<Vec<Product>, ServiceError> {
        let shelves = lock(&self.shelves, SERVICE)?;
        Ok(shelves.products.values().cloned().collect())
    }

    /// Adds a product.
    ///
    /// # Errors
    ///
    /// Fails with a conflict when the sku already exists.
    pub fn add_product(&self, product: Product) -> Result<Product, ServiceError> {
        let mut shelves = lock(&self.shelves, SERVICE)?;
        if shelves.products.contains_key(&product.sku) {
            return Err(ServiceError::conflict(format!(
                "product already exists: {}",
                product.sku
            )));
        }
        shelves
            .products
            .insert(product.sku.clone(), product.clone());
        Ok(product)
    }

    /// Places an order for `quantity` units of `sku`, taking them from stock.
    ///
    /// # Errors
    ///
    /// Fails when the sku is unknown, the quantity is zero, or stock is short.
    pub fn place_order(
        &self,
        customer: &str,
        sku: &str,
        quantity: u32,
    ) -> Result<Order, ServiceError> {
        if quantity == 0 {
            return Err(ServiceError::conflict("quantity must be at least 1"));
        }
        let mut shelves = lock(&self.shelves, SERVICE)?;
        let product = shelves
            .products
            .get_mut(sku)
            .ok_or_else(|| ServiceError::not_found("product", sku))?;
        if product.stock < quantity {
            return Err(ServiceError::conflict(format!(
                "only {} of {sku} in stock",
                product.stock
            )));
        }
        product.stock -= quantity;
        let total_cents = product.price_cents.saturating_mul(u64::from(quantity));

        shelves.last_order += 1;
        let order = Order {
            number: shelves.last_order,
            customer: customer.to_owned(),
            sku: sku.to_owned(),
            quantity,
            total_cents,
        };
        shelves.orders.push(order.clone());
        Ok(order)
    }
}
