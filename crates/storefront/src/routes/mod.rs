//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Catalog (public)
//! GET  /api/products                    - Product listing
//! GET  /api/products/{slug}             - Product detail
//! GET  /api/categories                  - Category listing
//! GET  /api/categories/{slug}           - Category detail
//! GET  /api/categories/{slug}/products  - Products in a category
//!
//! # Session
//! POST   /api/session                   - Sign in with a provider token
//! DELETE /api/session                   - Sign out
//!
//! # Cart (requires auth)
//! GET    /api/cart                      - Reconciled cart snapshot
//! POST   /api/cart/items                - Add an item
//! PUT    /api/cart/items/quantity       - Set an item's quantity
//! DELETE /api/cart/items                - Remove an item
//!
//! # Checkout (requires auth)
//! GET  /api/checkout                    - Current delivery form
//! PUT  /api/checkout/field              - Save one form field
//! POST /api/checkout/confirm            - Place the order
//!
//! # Orders (requires auth)
//! GET  /api/orders                      - Own order history
//! GET  /api/orders/{id}                 - One order (owner or staff)
//!
//! # Misc
//! GET  /api/shipping-cost?d_pin=XXXXXX  - Delivery fee quote
//! POST /api/request-product             - Product request submission
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod requests;
pub mod shipping;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/categories/{slug}", get(categories::show))
        .route("/categories/{slug}/products", get(categories::products))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::add).delete(cart::remove))
        .route("/cart/items/quantity", put(cart::update))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show))
        .route("/checkout/field", put(checkout::save_field))
        .route("/checkout/confirm", post(checkout::confirm))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(checkout_routes())
        .route("/session", post(auth::sign_in).delete(auth::sign_out))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/shipping-cost", get(shipping::quote))
        .route("/request-product", post(requests::create));

    Router::new().nest("/api", api)
}
