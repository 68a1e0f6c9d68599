use httpmock::prelude::*;
use serde_json::json;

use backend::shared::carrier::{
    Address, CarrierGateway, CreateShipmentRequest, PackageSpec, PaymentMode, PickupRequest,
};
use backend::shared::carrier::parcelway::ParcelwayClient;
use backend::shared::config::CarrierConfig;
use contracts::enums::ShipmentKind;
use contracts::shared::packaging::BoxDimensions;

fn carrier_config(base_url: String) -> CarrierConfig {
    CarrierConfig {
        base_url,
        api_token: "test-token".into(),
        timeout_secs: 5,
        pickup_location: "main-warehouse".into(),
        seller_name: "Warehouse".into(),
        seller_phone: "+7 000".into(),
        seller_address: "Warehouse street, 1".into(),
        seller_pincode: "000000".into(),
    }
}

fn shipment_request() -> CreateShipmentRequest {
    CreateShipmentRequest {
        kind: ShipmentKind::ReplacementOutbound,
        consignee: Address {
            name: "Иван Иванов".into(),
            phone: "+7 900 000-00-00".into(),
            address: "г. Москва, ул. Ленина, 1".into(),
            pincode: "101000".into(),
        },
        origin: Address {
            name: "Warehouse".into(),
            phone: "+7 000".into(),
            address: "Warehouse street, 1".into(),
            pincode: "000000".into(),
        },
        package: PackageSpec {
            weight_grams: 300,
            dimensions: BoxDimensions::new(32.0, 22.0, 12.0),
            fragile: false,
            self_packaged: false,
        },
        payment_mode: PaymentMode::Prepaid,
        order_ref: "rr-0001".into(),
        contents: "Футболка хлопок".into(),
    }
}

#[tokio::test]
async fn test_create_shipment_returns_waybill() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/shipments")
                .header("Authorization", "Token test-token")
                .json_body_partial(r#"{"order_ref": "rr-0001", "kind": "forward"}"#);
            then.status(200).json_body(json!({"waybill": "PW000123"}));
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();
    let created = client.create_shipment(&shipment_request()).await.unwrap();

    assert_eq!(created.waybill_number, "PW000123");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_validation_error_is_not_retried_and_surfaced_verbatim() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/shipments");
            then.status(400)
                .json_body(json!({"error": "invalid pincode", "field": "consignee.pincode"}));
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();
    let err = client.create_shipment(&shipment_request()).await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(err.to_string().contains("invalid pincode"));
    // 4xx не ретраится
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_transient_error_is_retried_once() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/shipments");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();
    let err = client.create_shipment(&shipment_request()).await.unwrap_err();

    assert!(err.is_retryable());
    // один повтор и не больше
    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn test_unparseable_success_body_is_protocol_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/shipments");
            then.status(200).body("<html>gateway index</html>");
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();
    let err = client.create_shipment(&shipment_request()).await.unwrap_err();

    assert!(!err.is_retryable());
    assert!(err.to_string().contains("Unexpected carrier response"));
}

#[tokio::test]
async fn test_missing_waybill_in_response_is_protocol_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/shipments");
            then.status(200).json_body(json!({"status": "queued"}));
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();
    let err = client.create_shipment(&shipment_request()).await.unwrap_err();

    assert!(err.to_string().contains("no waybill"));
}

#[tokio::test]
async fn test_create_return_shipment() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/returns")
                .json_body_partial(r#"{"original_waybill": "PW000123"}"#);
            then.status(200).json_body(json!({"waybill": "RT000007"}));
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();
    let created = client
        .create_return_shipment("PW000123", "defective item")
        .await
        .unwrap();

    assert_eq!(created.waybill_number, "RT000007");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_schedule_pickup_and_tracking() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/pickups");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/track/PW000123");
            then.status(200).json_body(json!({
                "status": "in_transit",
                "status_at": "2025-03-01T10:00:00Z",
                "location": "Sorting hub"
            }));
        })
        .await;

    let client = ParcelwayClient::new(&carrier_config(server.base_url())).unwrap();

    client
        .schedule_pickup(&PickupRequest {
            location: "main-warehouse".into(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            expected_package_count: 1,
        })
        .await
        .unwrap();

    let tracking = client.track_shipment("PW000123").await.unwrap();
    assert_eq!(tracking.status, "in_transit");
    assert_eq!(tracking.location.as_deref(), Some("Sorting hub"));
}
