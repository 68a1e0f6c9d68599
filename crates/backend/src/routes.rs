use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 Packing template handlers
        // ========================================
        .route(
            "/api/packing_template",
            get(handlers::a001_packing_template::list_all)
                .post(handlers::a001_packing_template::upsert),
        )
        .route(
            "/api/packing_template/:id",
            get(handlers::a001_packing_template::get_by_id)
                .delete(handlers::a001_packing_template::delete),
        )
        // ========================================
        // A002 Packing rule handlers
        // ========================================
        .route(
            "/api/packing_rule",
            get(handlers::a002_packing_rule::list_all).post(handlers::a002_packing_rule::upsert),
        )
        .route(
            "/api/packing_rule/:id",
            get(handlers::a002_packing_rule::get_by_id).delete(handlers::a002_packing_rule::delete),
        )
        // Подбор упаковки
        .route("/api/packaging/resolve", get(handlers::packaging::resolve))
        // ========================================
        // A003 Return request handlers
        // ========================================
        .route(
            "/api/return_request",
            get(handlers::a003_return_request::list_requests)
                .post(handlers::a003_return_request::submit),
        )
        .route(
            "/api/return_request/unfulfilled",
            get(handlers::a003_return_request::list_unfulfilled),
        )
        .route(
            "/api/return_request/:id",
            get(handlers::a003_return_request::get_by_id),
        )
        .route(
            "/api/return_request/:id/approve",
            post(handlers::a003_return_request::approve),
        )
        .route(
            "/api/return_request/:id/reject",
            post(handlers::a003_return_request::reject),
        )
        .route(
            "/api/return_request/:id/retry_shipment",
            post(handlers::a003_return_request::retry_shipment),
        )
        .route(
            "/api/return_request/:id/tracking",
            get(handlers::a003_return_request::tracking),
        )
}
