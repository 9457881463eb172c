use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use qikspare_client::{ClientConfig, GatewayError, HttpInvoiceGateway, InvoiceGateway};
use qikspare_core::{InvoiceId, Money};
use qikspare_invoicing::{InvoiceRecord, LineItem, PartyInfo, PartyRole};
use rust_decimal::Decimal;
use serde_json::{Value, json};

#[derive(Default)]
struct Seen {
    auth: Vec<Option<String>>,
    bodies: Vec<Value>,
    deleted: Vec<String>,
}

type Shared = Arc<Mutex<Seen>>;

fn record_auth(seen: &Shared, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().auth.push(auth);
}

async fn users(State(seen): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record_auth(&seen, &headers);
    Json(json!({"users": [
        {"_id": "g1", "role": "garage", "full_name": "Sai Motors", "phone": "98765",
         "location": {"addressLine": "12 MG Road", "city": "Pune", "pincode": 411001}},
        {"_id": "v1", "role": "vendor", "username": "partshub", "gstin": "27AAAAA0000A1Z5"},
        {"_id": "x1", "role": "auditor", "full_name": "Nobody"}
    ]}))
}

async fn list(State(seen): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record_auth(&seen, &headers);
    Json(json!([
        {"_id": "inv-1", "invoiceNumber": "INV-1", "buyer": {"name": "Sai Motors"},
         "items": [{"partName": "Brake Pad", "unitPrice": 450, "quantity": 2.0, "gst": 18}],
         "computedTotals": {"subtotal": 1, "totalGst": 1, "grandTotal": 1}},
        {"_id": "inv-2", "items": null, "deliveryCharge": null}
    ]))
}

async fn fetch(State(seen): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    record_auth(&seen, &headers);
    if id == "inv-1" {
        Ok(Json(json!({"_id": "inv-1", "invoiceNumber": "INV-1", "paymentMode": "Cash"})))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn create(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record_auth(&seen, &headers);
    seen.lock().unwrap().bodies.push(body.clone());
    let mut stored = body;
    stored["_id"] = json!("inv-new");
    Json(json!({"message": "Invoice created", "invoice": stored}))
}

async fn update(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    record_auth(&seen, &headers);
    if id != "inv-1" {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "stale invoice".to_string()));
    }
    seen.lock().unwrap().bodies.push(body);
    Ok(Json(json!({"message": "Invoice updated"})))
}

async fn remove(State(seen): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> StatusCode {
    record_auth(&seen, &headers);
    if id == "inv-1" {
        seen.lock().unwrap().deleted.push(id);
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

struct StubBackend {
    base_url: String,
    seen: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl StubBackend {
    async fn spawn() -> Self {
        let seen = Shared::default();
        let app = Router::new()
            .route("/api/admin/users", get(users))
            .route("/api/invoices/api/invoices/list", get(list))
            .route("/api/invoices/api/invoices/create", post(create))
            .route("/api/invoices/api/invoices/update/:id", patch(update))
            .route("/api/invoices/api/invoices/delete/:id", delete(remove))
            .route("/api/invoices/api/invoices/:id", get(fetch))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
            handle,
        }
    }

    fn gateway(&self) -> HttpInvoiceGateway {
        HttpInvoiceGateway::new(ClientConfig::new(&self.base_url).with_token("secret-token"))
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn named(name: &str) -> PartyInfo {
    PartyInfo {
        name: name.to_string(),
        ..PartyInfo::default()
    }
}

fn valid_invoice() -> InvoiceRecord {
    InvoiceRecord {
        buyer: named("Sai Motors"),
        seller: named("PartsHub"),
        items: vec![LineItem {
            part_name: "Brake Pad".to_string(),
            unit_price: Money::new(Decimal::from(1000)),
            quantity: 2,
            ..LineItem::new_row()
        }],
        delivery_charge: Money::new(Decimal::from(100)),
        ..InvoiceRecord::default()
    }
}

#[tokio::test]
async fn parties_come_from_the_user_directory_with_bearer_auth() {
    let srv = StubBackend::spawn().await;
    let gateway = srv.gateway();

    let garages = gateway.list_parties(PartyRole::Garage).await.unwrap();
    assert_eq!(garages.len(), 1);
    assert_eq!(garages[0].name, "Sai Motors");
    assert_eq!(garages[0].address, "12 MG Road, Pune, 411001");

    let vendors = gateway.list_parties(PartyRole::Vendor).await.unwrap();
    assert_eq!(vendors[0].name, "partshub");
    assert_eq!(vendors[0].gstin.as_deref(), Some("27AAAAA0000A1Z5"));

    let seen = srv.seen.lock().unwrap();
    assert!(seen.auth.iter().all(|a| a.as_deref() == Some("Bearer secret-token")));
}

#[tokio::test]
async fn listing_tolerates_loose_records() {
    let srv = StubBackend::spawn().await;
    let invoices = srv.gateway().list_invoices().await.unwrap();

    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].items[0].quantity, 2);
    // Fresh totals ignore the stale cached ones.
    assert_eq!(invoices[0].computed_totals().subtotal, Money::new(Decimal::from(900)));
    assert!(invoices[1].items.is_empty());
    assert_eq!(invoices[1].delivery_charge, Money::ZERO);
}

#[tokio::test]
async fn create_sends_recomputed_totals_and_reads_back_the_id() {
    let srv = StubBackend::spawn().await;
    let saved = srv.gateway().save_invoice(&valid_invoice()).await.unwrap();

    assert_eq!(saved.id.as_ref().map(|id| id.as_str()), Some("inv-new"));
    assert_eq!(saved.items[0].part_name, "Brake Pad");

    let seen = srv.seen.lock().unwrap();
    let body = &seen.bodies[0];
    assert_eq!(body["computedTotals"]["subtotal"].as_f64(), Some(2000.0));
    assert_eq!(body["computedTotals"]["totalGst"].as_f64(), Some(360.0));
    assert_eq!(body["computedTotals"]["grandTotal"].as_f64(), Some(2460.0));
    assert_eq!(body["total"].as_f64(), Some(2460.0));
    assert!(body.get("_id").is_none());
}

#[tokio::test]
async fn update_without_an_echo_keeps_the_submitted_invoice() {
    let srv = StubBackend::spawn().await;
    let mut invoice = valid_invoice();
    invoice.id = Some(InvoiceId::new("inv-1").unwrap());

    let saved = srv.gateway().save_invoice(&invoice).await.unwrap();
    assert_eq!(saved, invoice);
    assert_eq!(srv.seen.lock().unwrap().bodies[0]["_id"], "inv-1");
}

#[tokio::test]
async fn backend_errors_keep_status_and_body() {
    let srv = StubBackend::spawn().await;
    let mut invoice = valid_invoice();
    invoice.id = Some(InvoiceId::new("inv-9").unwrap());

    match srv.gateway().save_invoice(&invoice).await {
        Err(GatewayError::Api(status, body)) => {
            assert_eq!(status, 422);
            assert_eq!(body, "stale invoice");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_invoices_map_to_not_found() {
    let srv = StubBackend::spawn().await;
    let gateway = srv.gateway();

    let found = gateway.fetch_invoice(&InvoiceId::new("inv-1").unwrap()).await.unwrap();
    assert_eq!(found.invoice_number.as_ref().map(|n| n.as_str()), Some("INV-1"));

    let missing = InvoiceId::new("inv-404").unwrap();
    assert!(matches!(gateway.fetch_invoice(&missing).await, Err(GatewayError::NotFound(_))));
    assert!(matches!(gateway.delete_invoice(&missing).await, Err(GatewayError::NotFound(_))));

    gateway.delete_invoice(&InvoiceId::new("inv-1").unwrap()).await.unwrap();
    assert_eq!(srv.seen.lock().unwrap().deleted, vec!["inv-1".to_string()]);
}

#[tokio::test]
async fn invalid_invoices_never_reach_the_backend() {
    let srv = StubBackend::spawn().await;
    let mut invoice = valid_invoice();
    invoice.seller = PartyInfo::default();

    let err = srv.gateway().save_invoice(&invoice).await.unwrap_err();
    assert!(matches!(err, GatewayError::Invalid(_)));
    assert!(srv.seen.lock().unwrap().auth.is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let gateway = HttpInvoiceGateway::new(ClientConfig::new("http://127.0.0.1:9"));
    assert!(matches!(gateway.list_invoices().await, Err(GatewayError::Network(_))));
}
