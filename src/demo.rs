//! Food-delivery demo API served by `dishpatch serve`.
//!
//! State is in memory and lost on restart. Routes, relative to the `/api/v1`
//! mount point:
//!
//! | Method | Path | Notes |
//! |---|---|---|
//! | GET | `/products` | optional `?category=` filter |
//! | GET | `/products/:id` | |
//! | POST | `/orders` | requires `Authorization` |
//! | GET | `/orders/:id` | |
//! | PATCH | `/orders/:id/status` | body `{"status": "..."}` |
//! | GET | `/users/:id` | |
//!
//! `GET /health` and `GET /metrics` sit at the root.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::dispatcher::{Flow, HandlerChain, HandlerResult, RequestContext, ResponseWriter};
use crate::handlers;
use crate::middleware::MetricsMiddleware;
use crate::router::Router;

pub const API_PREFIX: &str = "/api/v1";

pub const ORDER_STATUSES: [&str; 5] = [
    "pending",
    "preparing",
    "out_for_delivery",
    "delivered",
    "cancelled",
];

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_cents: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    pub customer: String,
    pub items: Vec<OrderLine>,
    pub address: Option<String>,
    pub total_cents: u64,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: String,
}

/// In-memory catalog, users and orders.
pub struct DemoState {
    products: Vec<Product>,
    users: Vec<User>,
    orders: RwLock<HashMap<String, Order>>,
    next_order: AtomicU64,
}

impl Default for DemoState {
    fn default() -> Self {
        let product = |id: &str, name: &str, category: &str, price_cents| Product {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price_cents,
        };
        Self {
            products: vec![
                product("p1", "Margherita", "pizza", 1_050),
                product("p2", "Diavola", "pizza", 1_250),
                product("p3", "Pad Thai", "noodles", 1_100),
                product("p4", "Tiramisu", "dessert", 650),
            ],
            users: vec![User {
                id: "u1".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            }],
            orders: RwLock::new(HashMap::new()),
            next_order: AtomicU64::new(1),
        }
    }
}

impl DemoState {
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn place(&self, customer: String, new_order: NewOrder) -> Result<Order, String> {
        if new_order.items.is_empty() {
            return Err("Order has no items".into());
        }
        let mut total_cents = 0u64;
        for line in &new_order.items {
            if line.quantity == 0 {
                return Err(format!("Quantity for {} must be positive", line.product_id));
            }
            let product = self
                .product(&line.product_id)
                .ok_or_else(|| format!("Unknown product {}", line.product_id))?;
            total_cents = product
                .price_cents
                .checked_mul(u64::from(line.quantity))
                .and_then(|line_total| total_cents.checked_add(line_total))
                .ok_or_else(|| "Order total too large".to_string())?;
        }
        let n = self.next_order.fetch_add(1, Ordering::Relaxed);
        Ok(Order {
            id: format!("ORDER{n}"),
            customer,
            items: new_order.items,
            address: new_order.address,
            total_cents,
            status: ORDER_STATUSES[0].to_string(),
        })
    }
}

/// Rejects requests without an `Authorization` header and records the
/// credential as the `customer` local for later handlers.
///
/// # Errors
///
/// Only on serialization failure of the error body.
pub fn require_auth(req: &mut RequestContext, res: &mut ResponseWriter) -> HandlerResult {
    let Some(credential) = req.header("authorization").map(str::to_string) else {
        res.json_with_status(401, &json!({ "error": "Unauthorized" }))?;
        return Ok(Flow::Stop);
    };
    let customer = credential
        .strip_prefix("Bearer ")
        .unwrap_or(&credential)
        .to_string();
    req.set_local("customer", json!(customer));
    Ok(Flow::Continue)
}

/// Routes relative to [`API_PREFIX`].
pub fn api_router(state: &Arc<DemoState>) -> Router {
    let mut api = Router::new();

    let s = Arc::clone(state);
    api.get("/products", move |req, res| {
        let category = req.query_param("category");
        let products: Vec<&Product> = s
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect();
        res.json(&products)?;
        Ok(Flow::Continue)
    });

    let s = Arc::clone(state);
    api.get("/products/:id", move |req, res| {
        match req.param("id").and_then(|id| s.product(id)) {
            Some(product) => res.json(product)?,
            None => res.json_with_status(404, &json!({ "error": "Product not found" }))?,
        }
        Ok(Flow::Continue)
    });

    let s = Arc::clone(state);
    api.route(
        Method::POST,
        "/orders",
        HandlerChain::new(require_auth).then(move |req, res| {
            let new_order: NewOrder = match req.body_as() {
                Ok(order) => order,
                Err(e) => {
                    res.json_with_status(400, &json!({ "error": format!("Invalid order: {e}") }))?;
                    return Ok(Flow::Continue);
                }
            };
            let customer = req
                .local("customer")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            match s.place(customer, new_order) {
                Ok(order) => {
                    info!(order_id = %order.id, total_cents = order.total_cents, "Order placed");
                    s.orders
                        .write()
                        .map_err(|_| anyhow!("order store lock poisoned"))?
                        .insert(order.id.clone(), order.clone());
                    res.json_with_status(201, &order)?;
                }
                Err(message) => res.json_with_status(400, &json!({ "error": message }))?,
            }
            Ok(Flow::Continue)
        }),
    );

    let s = Arc::clone(state);
    api.get("/orders/:id", move |req, res| {
        let orders = s
            .orders
            .read()
            .map_err(|_| anyhow!("order store lock poisoned"))?;
        match req.param("id").and_then(|id| orders.get(id)) {
            Some(order) => res.json(order)?,
            None => res.json_with_status(404, &json!({ "error": "Order not found" }))?,
        }
        Ok(Flow::Continue)
    });

    let s = Arc::clone(state);
    api.patch("/orders/:id/status", move |req, res| {
        let update: StatusUpdate = match req.body_as() {
            Ok(update) => update,
            Err(_) => {
                res.json_with_status(400, &json!({ "error": "Missing status" }))?;
                return Ok(Flow::Continue);
            }
        };
        if !ORDER_STATUSES.contains(&update.status.as_str()) {
            res.json_with_status(400, &json!({ "error": format!("Unknown status {}", update.status) }))?;
            return Ok(Flow::Continue);
        }
        let mut orders = s
            .orders
            .write()
            .map_err(|_| anyhow!("order store lock poisoned"))?;
        match req.param("id").and_then(|id| orders.get_mut(id)) {
            Some(order) => {
                order.status = update.status;
                res.json(order)?;
            }
            None => res.json_with_status(404, &json!({ "error": "Order not found" }))?,
        }
        Ok(Flow::Continue)
    });

    let s = Arc::clone(state);
    api.get("/users/:id", move |req, res| {
        match req
            .param("id")
            .and_then(|id| s.users.iter().find(|u| u.id == id))
        {
            Some(user) => res.json(user)?,
            None => res.json_with_status(404, &json!({ "error": "User not found" }))?,
        }
        Ok(Flow::Continue)
    });

    api
}

/// Full application table: infrastructure routes plus the mounted API.
pub fn app_router(state: &Arc<DemoState>, metrics: Arc<MetricsMiddleware>) -> Router {
    let mut app = Router::new();
    app.get("/health", handlers::health);
    app.get("/metrics", handlers::metrics_endpoint(metrics));
    app.mount(API_PREFIX, &api_router(state));
    app
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_price(price_cents: u64) -> DemoState {
        DemoState {
            products: vec![Product {
                id: "p9".into(),
                name: "Truffle Feast".into(),
                category: "pizza".into(),
                price_cents,
            }],
            ..DemoState::default()
        }
    }

    fn order_of(lines: &[(&str, u32)]) -> NewOrder {
        NewOrder {
            items: lines
                .iter()
                .map(|(id, quantity)| OrderLine {
                    product_id: (*id).to_string(),
                    quantity: *quantity,
                })
                .collect(),
            address: None,
        }
    }

    #[test]
    fn test_place_sums_lines() {
        let state = DemoState::default();
        let order = state
            .place("ada".into(), order_of(&[("p1", 2), ("p4", 1)]))
            .unwrap();
        assert_eq!(order.total_cents, 2 * 1_050 + 650);
        assert_eq!(order.status, "pending");
    }

    #[test]
    fn test_place_rejects_line_overflow() {
        let state = state_with_price(u64::MAX / 2);
        let err = state
            .place("ada".into(), order_of(&[("p9", 3)]))
            .unwrap_err();
        assert_eq!(err, "Order total too large");
    }

    #[test]
    fn test_place_rejects_total_overflow() {
        let state = state_with_price(u64::MAX / 2 + 1);
        let err = state
            .place("ada".into(), order_of(&[("p9", 1), ("p9", 1)]))
            .unwrap_err();
        assert_eq!(err, "Order total too large");
        assert_eq!(state.next_order.load(Ordering::Relaxed), 1);
    }
}
