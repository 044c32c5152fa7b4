use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use crate::domain::order::{Identity, NewOrder, Order, OrderItem, OrderUpdate};
use crate::status::StatusDirectory;

/// Order as returned to clients, with status names resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name_to: String,
    pub phone_number_to: String,
    pub address_to: String,
    pub message_to: String,
    pub products: Vec<OrderItem>,
    pub order_status: Option<String>,
    pub order_status_id: i32,
    pub cs_status: Option<String>,
    pub cs_status_id: i32,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    pub fn new(order: &Order, statuses: &StatusDirectory) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id.0,
            full_name_to: order.shipping.full_name.clone(),
            phone_number_to: order.shipping.phone_number.clone(),
            address_to: order.shipping.address.clone(),
            message_to: order.shipping.message.clone(),
            products: order.products.clone(),
            order_status: statuses
                .fulfillment_status_name(order.fulfillment_status)
                .map(str::to_string),
            order_status_id: order.fulfillment_status.0,
            cs_status: statuses.cs_status_name(order.cs_status).map(str::to_string),
            cs_status_id: order.cs_status.0,
            created_at: order.created_at,
        }
    }
}

pub(super) async fn list_orders(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let result = state.orders.list_orders(&identity).await;
    state.record("list_orders", &result, started);

    let statuses = state.orders.statuses();
    let views: Vec<OrderView> = result?
        .iter()
        .map(|order| OrderView::new(order, statuses))
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

pub(super) async fn get_order(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let result = state.orders.get_order(&identity, path.into_inner()).await;
    state.record("get_order", &result, started);

    let order = result?;
    Ok(HttpResponse::Ok().json(OrderView::new(&order, state.orders.statuses())))
}

pub(super) async fn add_order(
    state: web::Data<AppState>,
    identity: Identity,
    payload: web::Json<NewOrder>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let result = state.orders.add_order(&identity, payload.into_inner()).await;
    state.record("add_order", &result, started);

    let order = result?;
    state.metrics.record_order_created();
    Ok(HttpResponse::Created().json(OrderView::new(&order, state.orders.statuses())))
}

pub(super) async fn set_order(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    payload: web::Json<OrderUpdate>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let result = state
        .orders
        .set_order(&identity, path.into_inner(), payload.into_inner())
        .await;
    state.record("set_order", &result, started);

    let order = result?;
    Ok(HttpResponse::Ok().json(OrderView::new(&order, state.orders.statuses())))
}

pub(super) async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "storefront-orders"
    }))
}

pub(super) async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderMutationPolicy, OrderPatch, OrderService};
    use crate::http::configure;
    use crate::http::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
    use crate::metrics::Metrics;
    use crate::status::test_directory;
    use crate::store::{InMemoryOrderStore, InMemoryProductCatalog, OrderStore};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;
    use std::sync::Arc;

    struct Harness {
        state: web::Data<AppState>,
        store: Arc<InMemoryOrderStore>,
        product: Uuid,
    }

    fn harness() -> Harness {
        let statuses = Arc::new(test_directory());
        let store = Arc::new(InMemoryOrderStore::new(statuses.clone()));
        let product = Uuid::new_v4();

        let service = OrderService::new(
            store.clone(),
            Arc::new(InMemoryProductCatalog::new([product])),
            statuses,
            OrderMutationPolicy::default(),
        );
        let state = web::Data::new(AppState::new(
            Arc::new(service),
            Arc::new(Metrics::new().unwrap()),
        ));

        Harness { state, store, product }
    }

    fn as_user(req: test::TestRequest, user_id: Uuid, role: &str) -> test::TestRequest {
        req.insert_header((USER_ID_HEADER, user_id.to_string()))
            .insert_header((USER_ROLE_HEADER, role.to_string()))
    }

    fn purchase(product: Uuid) -> Value {
        json!({
            "fullNameTo": "Jung Hayoon",
            "phoneNumberTo": "010-1111-2222",
            "addressTo": "Old St 9",
            "messageTo": "",
            "products": [{ "productId": product, "quantity": 1 }]
        })
    }

    #[actix_web::test]
    async fn test_create_then_fetch() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;
        let owner = Uuid::new_v4();

        let req = as_user(test::TestRequest::post().uri("/orders"), owner, "basic-user")
            .set_json(purchase(h.product))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: OrderView = test::read_body_json(resp).await;
        assert_eq!(created.user_id, owner);
        assert_eq!(created.order_status.as_deref(), Some("order received"));
        assert_eq!(created.cs_status.as_deref(), Some("none"));

        let req = as_user(
            test::TestRequest::get().uri(&format!("/orders/{}", created.id)),
            owner,
            "basic-user",
        )
        .to_request();
        let fetched: OrderView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        assert_eq!(h.state.metrics.orders_created.get(), 1);
    }

    #[actix_web::test]
    async fn test_missing_identity_is_unauthorized() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/orders").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_invalid_purchase_is_bad_request() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;

        let req = as_user(test::TestRequest::post().uri("/orders"), Uuid::new_v4(), "basic-user")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_request");
    }

    #[actix_web::test]
    async fn test_unparsable_bodies_use_error_envelope() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;
        let user = Uuid::new_v4();

        let mut wrong_type = purchase(h.product);
        wrong_type["addressTo"] = json!(5);
        let mut bad_product = purchase(h.product);
        bad_product["products"][0]["productId"] = json!("not-a-uuid");

        for body in [wrong_type, bad_product] {
            let req = as_user(test::TestRequest::post().uri("/orders"), user, "basic-user")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "invalid_request");
            assert!(body["message"].is_string());
        }

        let req = as_user(test::TestRequest::post().uri("/orders"), user, "basic-user")
            .insert_header(("content-type", "application/json"))
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_request");

        let uri = format!("/orders/{}", Uuid::new_v4());
        let req = as_user(test::TestRequest::patch().uri(&uri), user, "admin")
            .set_json(json!({ "orderStatus": 3 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_request");

        let counter = &h.state.metrics.order_operations;
        assert_eq!(counter.with_label_values(&["add_order", "invalid_request"]).get(), 3);
        assert_eq!(counter.with_label_values(&["set_order", "invalid_request"]).get(), 1);
        assert!(h.store.find_all().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_list_is_scoped() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for user in [alice, alice, bob] {
            let req = as_user(test::TestRequest::post().uri("/orders"), user, "basic-user")
                .set_json(purchase(h.product))
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = as_user(test::TestRequest::get().uri("/orders"), alice, "basic-user").to_request();
        let mine: Vec<OrderView> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == alice));

        let req = as_user(test::TestRequest::get().uri("/orders"), Uuid::new_v4(), "admin").to_request();
        let all: Vec<OrderView> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.len(), 3);
    }

    #[actix_web::test]
    async fn test_patch_outcomes() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;
        let owner = Uuid::new_v4();

        let req = as_user(test::TestRequest::post().uri("/orders"), owner, "basic-user")
            .set_json(purchase(h.product))
            .to_request();
        let created: OrderView = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/orders/{}", created.id);

        // Still "order received": shipping-only edits are blocked
        let req = as_user(test::TestRequest::patch().uri(&uri), owner, "basic-user")
            .set_json(json!({ "addressTo": "New St 1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // Another user may not touch it
        let req = as_user(test::TestRequest::patch().uri(&uri), Uuid::new_v4(), "basic-user")
            .set_json(json!({ "orderStatus": "shipped" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        // Unknown status name
        let req = as_user(test::TestRequest::patch().uri(&uri), Uuid::new_v4(), "admin")
            .set_json(json!({ "orderStatus": "lost" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        // Admin moves it to "payment completed"
        let req = as_user(test::TestRequest::patch().uri(&uri), Uuid::new_v4(), "admin")
            .set_json(json!({ "orderStatus": "payment completed" }))
            .to_request();
        let paid: OrderView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(paid.order_status.as_deref(), Some("payment completed"));

        // Now the owner can change the address
        let req = as_user(test::TestRequest::patch().uri(&uri), owner, "basic-user")
            .set_json(json!({ "addressTo": "New St 1" }))
            .to_request();
        let edited: OrderView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(edited.address_to, "New St 1");
        assert_eq!(edited.full_name_to, created.full_name_to);
        assert_eq!(edited.order_status.as_deref(), Some("payment completed"));

        let stored = h.store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.shipping.address, "New St 1");
    }

    #[actix_web::test]
    async fn test_admin_advances_shipped_order_with_address() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;
        let owner = Uuid::new_v4();

        let req = as_user(test::TestRequest::post().uri("/orders"), owner, "basic-user")
            .set_json(purchase(h.product))
            .to_request();
        let created: OrderView = test::call_and_read_body_json(&app, req).await;

        let shipped = h.state.orders.statuses().resolve_fulfillment_status_id("shipped").unwrap();
        h.store
            .apply_partial_update(
                created.id,
                OrderPatch {
                    fulfillment_status: Some(shipped),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let req = as_user(
            test::TestRequest::patch().uri(&format!("/orders/{}", created.id)),
            Uuid::new_v4(),
            "admin",
        )
        .set_json(json!({ "orderStatus": "delivered", "addressTo": "New St 1" }))
        .to_request();
        let updated: OrderView = test::call_and_read_body_json(&app, req).await;

        assert_eq!(updated.order_status.as_deref(), Some("delivered"));
        assert_eq!(updated.address_to, "New St 1");
    }

    #[actix_web::test]
    async fn test_unknown_order_is_not_found() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;

        let req = as_user(
            test::TestRequest::get().uri(&format!("/orders/{}", Uuid::new_v4())),
            Uuid::new_v4(),
            "admin",
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let h = harness();
        let app = test::init_service(App::new().app_data(h.state.clone()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = as_user(test::TestRequest::get().uri("/orders"), Uuid::new_v4(), "admin").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("order_operations_total"));
    }
}
