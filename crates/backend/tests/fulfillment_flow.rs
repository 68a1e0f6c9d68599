use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use backend::domain::a001_packing_template;
use backend::domain::a003_return_request::service;
use backend::shared::carrier::{
    CarrierError, CarrierGateway, CreateShipmentRequest, CreatedShipment, PickupRequest,
    ShipmentTracking,
};
use backend::shared::data::db;
use contracts::domain::a001_packing_template::aggregate::PackingTemplateDto;
use contracts::domain::a003_return_request::aggregate::SubmitReturnRequestDto;
use contracts::enums::{RequestStatus, RequestType, ShipmentKind};

/// Шлюз-двойник: считает созданные отправления и умеет имитировать
/// недоступность перевозчика
#[derive(Default)]
struct MockGateway {
    unavailable: AtomicBool,
    shipments_created: AtomicUsize,
    returns_created: AtomicUsize,
    pickups_scheduled: AtomicUsize,
}

impl MockGateway {
    fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl CarrierGateway for MockGateway {
    async fn create_shipment(
        &self,
        request: &CreateShipmentRequest,
    ) -> Result<CreatedShipment, CarrierError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CarrierError::Transient("connection timed out".into()));
        }
        assert!(!request.order_ref.is_empty());
        let n = self.shipments_created.fetch_add(1, Ordering::SeqCst) + 1;
        let waybill = format!("PW{:06}", n);
        Ok(CreatedShipment {
            waybill_number: waybill.clone(),
            raw_response: json!({ "waybill": waybill }),
        })
    }

    async fn create_return_shipment(
        &self,
        original_waybill: &str,
        _reason: &str,
    ) -> Result<CreatedShipment, CarrierError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CarrierError::Transient("connection timed out".into()));
        }
        let n = self.returns_created.fetch_add(1, Ordering::SeqCst) + 1;
        let waybill = format!("RT{:06}-{}", n, original_waybill);
        Ok(CreatedShipment {
            waybill_number: waybill.clone(),
            raw_response: json!({ "waybill": waybill }),
        })
    }

    async fn schedule_pickup(&self, _request: &PickupRequest) -> Result<(), CarrierError> {
        self.pickups_scheduled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn track_shipment(&self, waybill: &str) -> Result<ShipmentTracking, CarrierError> {
        Ok(ShipmentTracking {
            waybill_number: waybill.to_string(),
            status: "in_transit".into(),
            status_at: None,
            location: None,
        })
    }
}

fn submit_dto(request_type: RequestType, new_variant_id: Option<&str>) -> SubmitReturnRequestDto {
    SubmitReturnRequestDto {
        description: "Не подошёл размер".into(),
        order_id: "ord-100".into(),
        order_item_id: format!("item-{}", Uuid::new_v4()),
        user_id: "user-7".into(),
        brand_id: "brand-x".into(),
        product_type_id: "tshirt".into(),
        item_name: "Футболка хлопок".into(),
        weight_grams: 300,
        request_type,
        new_variant_id: new_variant_id.map(Into::into),
        reason: Some("Маломерит".into()),
        images: vec!["https://cdn.example/evidence/1.jpg".into()],
        customer_name: "Иван Иванов".into(),
        customer_phone: "+7 900 000-00-00".into(),
        customer_address: "г. Москва, ул. Ленина, 1".into(),
        customer_pincode: "101000".into(),
        ..Default::default()
    }
}

async fn setup() -> anyhow::Result<()> {
    let db_path = std::env::temp_dir().join(format!(
        "fulfillment_flow_test_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&db_path);
    db::initialize_database(Some(&db_path.to_string_lossy())).await?;

    // Системный шаблон по умолчанию нужен резолверу упаковки
    a001_packing_template::service::create(PackingTemplateDto {
        description: "Коробка по умолчанию".into(),
        base_length_cm: 20.0,
        base_width_cm: 15.0,
        base_height_cm: 10.0,
        extra_cm: 1.0,
        is_default: true,
        ..Default::default()
    })
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_request_lifecycle_and_carrier_failures() -> anyhow::Result<()> {
    setup().await?;
    let gateway = MockGateway::default();

    // --- подача: замена без варианта отклоняется до записи ---
    let err = service::submit(submit_dto(RequestType::Replace, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");

    // --- отклонение: идемпотентный reject и запрет после approve ---
    let rejected = service::submit(submit_dto(RequestType::Return, None)).await?;
    let rejected_id = rejected.base.id.value();

    let after = service::reject(rejected_id).await?;
    assert_eq!(after.status, RequestStatus::Rejected);

    // повторный reject — no-op success
    let again = service::reject(rejected_id).await?;
    assert_eq!(again.status, RequestStatus::Rejected);

    // approve отклонённой — конфликт состояния
    let err = service::approve(rejected_id, &gateway).await.unwrap_err();
    assert_eq!(err.kind(), "state_conflict");

    // --- сценарий: перевозчик недоступен в момент одобрения ---
    let request = service::submit(submit_dto(RequestType::Return, None)).await?;
    let request_id = request.base.id.value();

    gateway.set_unavailable(true);
    let err = service::approve(request_id, &gateway).await.unwrap_err();
    assert_eq!(err.kind(), "carrier");

    // решение администратора сохранено, отправления нет
    let stored = service::get_by_id(request_id).await?.unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
    assert!(stored.waybill_number.is_none());

    let unfulfilled = service::list_unfulfilled().await?;
    assert!(unfulfilled.iter().any(|r| r.base.id.value() == request_id));

    // повторное одобрение — конфликт, а не второе отправление
    let err = service::approve(request_id, &gateway).await.unwrap_err();
    assert_eq!(err.kind(), "state_conflict");
    assert_eq!(gateway.shipments_created.load(Ordering::SeqCst), 0);

    // повтор отправления после восстановления перевозчика, без повторного одобрения
    gateway.set_unavailable(false);
    let fulfilled = service::retry_fulfillment(request_id, &gateway).await?;
    assert_eq!(fulfilled.status, RequestStatus::Approved);
    let waybill = fulfilled.waybill_number.clone().unwrap();
    assert_eq!(fulfilled.shipment_kind, Some(ShipmentKind::Rto));
    assert_eq!(gateway.shipments_created.load(Ordering::SeqCst), 1);

    // повтор по заявке с накладной — no-op, отправление одно
    let noop = service::retry_fulfillment(request_id, &gateway).await?;
    assert_eq!(noop.waybill_number.as_deref(), Some(waybill.as_str()));
    assert_eq!(gateway.shipments_created.load(Ordering::SeqCst), 1);

    // отклонить одобренную нельзя
    let err = service::reject(request_id).await.unwrap_err();
    assert_eq!(err.kind(), "state_conflict");

    // --- замена: прямое отправление покупателю ---
    let replace = service::submit(submit_dto(RequestType::Replace, Some("var-42"))).await?;
    let replace_id = replace.base.id.value();

    let fulfilled = service::approve(replace_id, &gateway).await?;
    assert_eq!(fulfilled.status, RequestStatus::Approved);
    assert_eq!(
        fulfilled.shipment_kind,
        Some(ShipmentKind::ReplacementOutbound)
    );
    assert!(fulfilled.waybill_number.is_some());
    assert_eq!(gateway.shipments_created.load(Ordering::SeqCst), 2);

    // --- возврат с исходной накладной: RTO по ней, а не новое отправление ---
    let mut dto = submit_dto(RequestType::Return, None);
    dto.original_waybill = Some("PWORIG01".into());
    let rto = service::submit(dto).await?;
    let rto_id = rto.base.id.value();

    let fulfilled = service::approve(rto_id, &gateway).await?;
    assert_eq!(fulfilled.shipment_kind, Some(ShipmentKind::Rto));
    assert!(fulfilled
        .waybill_number
        .as_deref()
        .unwrap()
        .contains("PWORIG01"));
    assert_eq!(gateway.returns_created.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.shipments_created.load(Ordering::SeqCst), 2);

    // забор груза планировался для каждого созданного отправления
    assert_eq!(gateway.pickups_scheduled.load(Ordering::SeqCst), 3);

    // --- итоги по датасету ---
    let totals = service::totals().await?;
    assert_eq!(totals.rejected_count, 1);
    assert_eq!(totals.approved_count, 3);
    assert_eq!(totals.unfulfilled_count, 0);

    // одобрение несуществующей заявки — ошибка целостности
    let err = service::approve(Uuid::new_v4(), &gateway).await.unwrap_err();
    assert_eq!(err.kind(), "data_integrity");

    Ok(())
}
