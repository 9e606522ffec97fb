//! Campus shop routes.

use std::sync::Arc;

use campus_router::{Controller, HandlerError, HandlerResult, Reply, Request, RouteDescriptor};

use super::{caller, done, parsed, parsed_or, settle};
use crate::services::{Product, Store};

/// Serves the `shop/*` routes.
#[derive(Debug)]
pub struct ShopController {
    store: Arc<Store>,
}

impl ShopController {
    /// Creates the controller over `store`.
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Bare catalogue value; the dispatcher wraps it as a plain `SUCCESS`.
    fn list(&self, _request: &Request) -> HandlerResult {
        settle(|| {
            let products = serde_json::to_value(self.store.products()?).map_err(|error| {
                HandlerError::from_source("failed to serialise products", error)
            })?;
            Ok(Reply::Value(products))
        })
    }

    fn place_order(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let customer = caller(request)?;
            let sku = request.require_param("sku")?;
            let quantity = parsed_or(request, "quantity", 1)?;
            let order = self.store.place_order(customer, sku, quantity)?;
            done("order placed", &order)
        })
    }

    fn add_product(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let product = Product::new(
                request.require_param("sku")?,
                request.require_param("name")?,
                parsed(request, "price_cents")?,
                parsed_or(request, "stock", 0)?,
            );
            done("product added", &self.store.add_product(product)?)
        })
    }
}

impl Controller for ShopController {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new(
                "shop/product/list",
                "anonymous",
                "list products and stock",
                Self::list,
            ),
            RouteDescriptor::new(
                "shop/order/place",
                "student,teacher",
                "order a product (sku, quantity)",
                Self::place_order,
            ),
            RouteDescriptor::new(
                "shop/admin/product/add",
                "admin",
                "add a product (sku, name, price_cents, stock)",
                Self::add_product,
            ),
        ]
    }

    fn name() -> &'static str {
        "shop"
    }
}
