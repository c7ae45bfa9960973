use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use inbound_receiving_log::config::DatabaseConfig;
use inbound_receiving_log::{
    build_router, create_pool, init_schema, ReceivingService, ReferenceCatalog,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const MASTER: &str = "\
Item_Code,Item_Description,Weight_per_Unit,Bin_1,Aditional_Bin_Location
BG01499917,Maintenance Kit 1000h,10 kg,RA25A,RA25A
FT9876543210987,Oil Filter Model X,2 kg,SB10C,\"SB10C, SB11A\"
";

const GRN: &str = "\
GRN_Number,Item_Code,Quantity
21044,BG01499917,12
21044,FT9876543210987,5
";

async fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let master = dir.path().join("master.csv");
    let grn = dir.path().join("grn.csv");
    std::fs::write(&master, MASTER).unwrap();
    std::fs::write(&grn, GRN).unwrap();

    let pool = create_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap();
    init_schema(&pool).await.unwrap();

    let service = Arc::new(ReceivingService::new(pool, ReferenceCatalog::new(master, grn)));
    (dir, build_router(service))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes, disposition)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let (status, bytes, _) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn receipt(shipment_ref: &str, item_code: &str, quantity: Value) -> Value {
    json!({
        "shipmentRef": shipment_ref,
        "waybill": "WB-100",
        "itemCode": item_code,
        "quantity": quantity,
    })
}

#[tokio::test]
async fn health_check_responds() {
    let (_dir, app) = test_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn item_lookup_found_and_missing() {
    let (_dir, app) = test_app().await;

    let (status, body) = send_json(&app, "GET", "/api/items/BG01499917/21044", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itemCode"], "BG01499917");
    assert_eq!(body["binLocation"], "RA25A");
    assert_eq!(body["defaultExpectedQty"], 12);

    let (status, body) = send_json(&app, "GET", "/api/items/UNKNOWN/21044", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body.get("itemCode").is_none());
}

#[tokio::test]
async fn receiving_scenario_tracks_cumulative_difference() {
    let (_dir, app) = test_app().await;

    let (status, body) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!(5)))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["entry"]["difference"], -7);
    assert_eq!(body["entry"]["qtyGrn"], 12);

    let (status, body) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!("10")))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["difference"], 3);
    let second_id = body["entry"]["id"].as_i64().unwrap();

    let (status, body) = send_json(&app, "GET", "/api/receipts", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"].as_i64(), Some(second_id));
}

#[tokio::test]
async fn expected_quantity_miss_is_not_an_error() {
    let (_dir, app) = test_app().await;
    let (status, body) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("30000", "BG01499917", json!(4)))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entry"]["qtyGrn"], 0);
    assert_eq!(body["entry"]["difference"], 4);
}

#[tokio::test]
async fn create_validation_failures() {
    let (_dir, app) = test_app().await;

    let (status, body) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!(0)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) =
        send_json(&app, "POST", "/api/receipts", Some(json!({ "itemCode": "BG01499917" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "NOPE", json!(1)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("POST")
        .uri("/api/receipts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_updates_mutable_fields_only() {
    let (_dir, app) = test_app().await;
    let (_, created) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!(5)))).await;
    let id = created["entry"]["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/receipts/{id}"),
        Some(json!({ "waybill": "WB-200", "relocateBin": "RB02", "qtyReceived": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entry = &body["entry"];
    assert_eq!(entry["qtyReceived"], 0);
    assert_eq!(entry["difference"], -12);
    assert_eq!(entry["relocatedBin"], "RB02");
    assert_eq!(entry["shipmentRef"], created["entry"]["shipmentRef"]);
    assert_eq!(entry["itemDescription"], created["entry"]["itemDescription"]);
    assert_eq!(entry["binLocation"], created["entry"]["binLocation"]);
    assert_eq!(entry["qtyGrn"], created["entry"]["qtyGrn"]);

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/receipts/{id}"),
        Some(json!({ "waybill": "WB-200" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("qtyReceived"));

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/receipts/999",
        Some(json!({ "waybill": "W", "relocatedBin": "", "qtyReceived": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exports_require_records() {
    let (_dir, app) = test_app().await;
    let (status, body) = send_json(&app, "GET", "/api/reports/summary", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("no records to summarize"));

    let (status, _) = send_json(&app, "GET", "/api/reports/detail", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exports_download_as_attachments() {
    let (_dir, app) = test_app().await;
    send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!(5)))).await;
    send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!(10)))).await;

    let request = Request::builder()
        .uri("/api/reports/summary?format=csv")
        .body(Body::empty())
        .unwrap();
    let (status, bytes, disposition) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let disposition = disposition.unwrap();
    assert!(disposition.starts_with("attachment; filename=\"shipment_summary_"));
    assert!(disposition.ends_with(".csv\""));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with(
        "Shipment Ref,Item Code,Item Description,Total Received,Total Expected,Difference"
    ));
    assert!(text.contains("21044,BG01499917,Maintenance Kit 1000h,15,12,3"));

    let request = Request::builder()
        .uri("/api/reports/detail")
        .body(Body::empty())
        .unwrap();
    let (status, bytes, disposition) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(disposition.unwrap().contains("inbound_log_"));
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn null_waybill_is_accepted_and_overflow_is_bad_request() {
    let (_dir, app) = test_app().await;

    let mut body = receipt("21044", "BG01499917", json!(5));
    body["waybill"] = Value::Null;
    let (status, created) = send_json(&app, "POST", "/api/receipts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["entry"]["waybill"], "");

    let (status, body) =
        send_json(&app, "POST", "/api/receipts", Some(receipt("21044", "BG01499917", json!(1e30)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/receipts",
        Some(receipt("21044", "BG01499917", json!(i64::MAX))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, entries) = send_json(&app, "GET", "/api/receipts", None).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);
}
