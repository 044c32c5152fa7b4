// ============================================================================
// HTTP Transport - actix-web surface over the order service
// ============================================================================
//
// Routes:
//   GET   /orders             orders visible to the caller
//   POST  /orders             place an order
//   GET   /orders/{order_id}  one order
//   PATCH /orders/{order_id}  partial update (shipping details and/or statuses)
//   GET   /health
//   GET   /metrics            Prometheus text format
//
// The caller's identity comes from headers set by the authentication gateway.
//
// ============================================================================

mod error;
mod handlers;
mod identity;

use actix_web::error::JsonPayloadError;
use actix_web::http::Method;
use actix_web::{web, App, HttpRequest, HttpServer};
use std::sync::Arc;
use std::time::Instant;

use crate::domain::order::{OrderError, OrderService};
use crate::metrics::Metrics;
use error::ApiError;

/// Shared state handed to every handler
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(orders: Arc<OrderService>, metrics: Arc<Metrics>) -> Self {
        Self { orders, metrics }
    }

    fn record<T>(&self, operation: &str, result: &Result<T, OrderError>, started: Instant) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        self.metrics
            .record_operation(operation, outcome, started.elapsed().as_secs_f64());
    }
}

/// Bodies that fail to parse are invalid requests, reported like any other
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let operation = if req.method() == Method::PATCH {
        "set_order"
    } else {
        "add_order"
    };
    let error = OrderError::InvalidRequest(err.to_string());

    if let Some(state) = req.app_data::<web::Data<AppState>>() {
        state.metrics.record_operation(operation, error.kind(), 0.0);
    }

    ApiError::from(error).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/orders", web::get().to(handlers::list_orders))
        .route("/orders", web::post().to(handlers::add_order))
        .route("/orders/{order_id}", web::get().to(handlers::get_order))
        .route("/orders/{order_id}", web::patch().to(handlers::set_order))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(handlers::metrics));
}

/// Run the HTTP server until it is stopped
pub async fn serve(state: web::Data<AppState>, bind: (String, u16)) -> std::io::Result<()> {
    tracing::info!("Starting order API on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(bind)?
        .run()
        .await
}
