//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Session
//! POST   /api/session                   - Staff sign-in with a provider token
//! DELETE /api/session                   - Sign out
//!
//! # Catalog management (admin)
//! GET    /api/products                  - Product listing
//! POST   /api/products                  - Create a product
//! GET    /api/products/{id}             - Product detail
//! PUT    /api/products/{id}             - Edit a product
//! DELETE /api/products/{id}             - Delete a product
//! GET    /api/categories                - Category listing
//! POST   /api/categories                - Create a category
//! PUT    /api/categories/{slug}         - Edit a category (slug immutable)
//! DELETE /api/categories/{slug}         - Delete a category
//!
//! # Inventory (admin; legacy wire shapes preserved)
//! POST /api/updateProductStock          - Set one variant's availability
//! POST /api/updateBulkProductStock      - Batch stock decrements
//!
//! # Orders (admin or moderator)
//! GET  /api/orders                      - All orders, ?status= filter
//! GET  /api/orders/{id}                 - One order
//! PUT  /api/orders/{id}/status          - Set any status
//! PUT  /api/orders/{id}/tracking        - Set the tracking code
//! POST /api/orders/{id}/complete        - Shortcut to `delivered`
//! POST /api/orders/{id}/uncomplete      - Shortcut to `shipped`
//! POST /api/orders/{id}/cancel          - Shortcut to `cancelled`
//!
//! # Users and roles (admin; legacy wire shapes preserved)
//! GET  /api/getUsersWithRoles           - Provider accounts with role flags
//! POST /api/setUserRole                 - Set a user's role by email
//!
//! # Misc (admin)
//! POST /api/uploadImage                 - Image upload proxy
//! GET  /api/reports?window=30           - Sales report (7/30/90 days)
//! GET  /api/product-requests            - Shopper restock requests
//! ```

pub mod auth;
pub mod categories;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod reports;
pub mod requests;
pub mod uploads;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the catalog management routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{slug}",
            put(categories::update).delete(categories::delete),
        )
}

/// Create the order management routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", put(orders::set_status))
        .route("/orders/{id}/tracking", put(orders::set_tracking))
        .route("/orders/{id}/complete", post(orders::complete))
        .route("/orders/{id}/uncomplete", post(orders::uncomplete))
        .route("/orders/{id}/cancel", post(orders::cancel))
}

/// Create all routes for the back office.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(order_routes())
        .route("/session", post(auth::sign_in).delete(auth::sign_out))
        .route("/updateProductStock", post(inventory::update_stock))
        .route("/updateBulkProductStock", post(inventory::bulk_update))
        .route("/getUsersWithRoles", get(users::index))
        .route("/setUserRole", post(users::set_role))
        .route("/uploadImage", post(uploads::upload_image))
        .route("/reports", get(reports::show))
        .route("/product-requests", get(requests::index));

    Router::new().nest("/api", api)
}
