//! Route definitions for the Cannabis Wholesale Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - role catalog
        .nest("/roles", role_routes())
        // Protected routes - product templates and rollups
        .nest("/products", product_routes())
        // Protected routes - batch editing
        .nest("/batches", batch_routes())
        // Protected routes - dispensary management
        .nest("/dispensaries", dispensary_routes())
        // Protected routes - wholesale orders
        .nest("/orders", order_routes())
        // Protected routes - reporting
        .nest("/reports", reporting_routes())
        // Protected routes - sales insights
        .nest("/insights", insights_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Role catalog routes (protected)
fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_roles))
        .route("/permissions", get(handlers::list_permissions))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product template routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route("/rollups", get(handlers::list_templates_with_rollups))
        .route(
            "/:template_id",
            get(handlers::get_template)
                .put(handlers::update_template)
                .delete(handlers::delete_template),
        )
        .route("/:template_id/rollup", get(handlers::get_template_rollup))
        .route(
            "/:template_id/batches",
            get(handlers::list_batches).post(handlers::create_batch),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Batch routes (protected)
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:batch_id",
            get(handlers::get_batch).put(handlers::update_batch),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dispensary routes (protected)
fn dispensary_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_dispensaries).post(handlers::create_dispensary),
        )
        .route(
            "/:dispensary_id",
            get(handlers::get_dispensary)
                .put(handlers::update_dispensary)
                .delete(handlers::delete_dispensary),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Wholesale order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route(
            "/:order_id/payment-status",
            put(handlers::update_payment_status),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard_metrics))
        .route("/sales-by-month", get(handlers::get_sales_by_month))
        .route("/top-dispensaries", get(handlers::get_top_dispensaries))
        .route("/category-breakdown", get(handlers::get_category_breakdown))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales insights routes (protected)
fn insights_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(handlers::generate_sales_insights))
        .route("/business", post(handlers::generate_business_analysis))
        .route_layer(middleware::from_fn(auth_middleware))
}
