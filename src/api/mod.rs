pub mod handlers;

pub use handlers::*;

use crate::service::BillDesk;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn router(desk: Arc<BillDesk>) -> Router {
    let bill_routes = Router::new()
        .route("/api/bills", get(list_bills).post(create_bill))
        .route("/api/bills/new", get(new_bill))
        .route("/api/bills/export.csv", get(export_csv))
        .route(
            "/api/bills/:id",
            get(open_bill).put(update_bill).delete(delete_bill),
        )
        .route("/api/bills/:id/print", get(print_bill))
        .with_state(desk);

    Router::new()
        .route("/health", get(health_check))
        .merge(bill_routes)
        .layer(ServiceBuilder::new())
}
