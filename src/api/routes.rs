use crate::api::handlers;
use crate::service::ReceivingService;
use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// 构建路由
pub fn build_router(service: Arc<ReceivingService>) -> Router {
    let receipt_routes = Router::new()
        .route("/api/items/:item_code/:shipment_ref", get(handlers::lookup_item))
        .route(
            "/api/receipts",
            get(handlers::list_receipts).post(handlers::create_receipt),
        )
        .route("/api/receipts/:id", put(handlers::edit_receipt))
        .route("/api/reports/detail", get(handlers::export_detail_report))
        .route("/api/reports/summary", get(handlers::export_summary_report))
        .with_state(service);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(receipt_routes)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
