pub mod parcelway;

use async_trait::async_trait;
use contracts::enums::ShipmentKind;
use contracts::shared::packaging::BoxDimensions;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::CarrierConfig;
use parcelway::ParcelwayClient;

/// Ошибки взаимодействия со службой доставки
#[derive(Debug, Error)]
pub enum CarrierError {
    /// Перевозчик отклонил данные (4xx); не ретраится,
    /// текст ответа показывается оператору без изменений
    #[error("Carrier rejected the request: {0}")]
    Validation(String),

    /// Временный сбой: таймаут, обрыв сети, 5xx; допустим один повтор
    #[error("Transient carrier failure: {0}")]
    Transient(String),

    /// Ответ перевозчика не удалось разобрать
    #[error("Unexpected carrier response: {0}")]
    Protocol(String),
}

impl CarrierError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CarrierError::Transient(_))
    }
}

/// Адрес стороны отправления или получения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
}

/// Физические параметры упакованного места
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSpec {
    pub weight_grams: i32,
    pub dimensions: BoxDimensions,
    pub fragile: bool,
    /// Товар в собственной упаковке, коробка не подбиралась
    pub self_packaged: bool,
}

/// Режим оплаты доставки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Prepaid,
    CollectOnDelivery,
}

impl PaymentMode {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMode::Prepaid => "prepaid",
            PaymentMode::CollectOnDelivery => "cod",
        }
    }
}

/// Заявка на создание отправления
///
/// `order_ref` — ссылка на заказ/заявку, ключ идемпотентности на стороне
/// перевозчика: повторная отправка той же заявки не создаёт второе
/// отправление.
#[derive(Debug, Clone)]
pub struct CreateShipmentRequest {
    pub kind: ShipmentKind,
    pub consignee: Address,
    pub origin: Address,
    pub package: PackageSpec,
    pub payment_mode: PaymentMode,
    pub order_ref: String,
    pub contents: String,
}

/// Созданное отправление
#[derive(Debug, Clone)]
pub struct CreatedShipment {
    pub waybill_number: String,
    /// Сырой ответ перевозчика для аудита
    pub raw_response: serde_json::Value,
}

/// Заявка на забор груза
#[derive(Debug, Clone)]
pub struct PickupRequest {
    pub location: String,
    pub date: chrono::NaiveDate,
    pub expected_package_count: i32,
}

/// Статус отправления по данным перевозчика
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentTracking {
    #[serde(rename = "waybillNumber")]
    pub waybill_number: String,
    pub status: String,
    #[serde(rename = "statusAt")]
    pub status_at: Option<String>,
    pub location: Option<String>,
}

/// Шлюз службы доставки
///
/// Все вызовы синхронные с точки зрения оркестратора и ограничены
/// таймаутом; исход по таймауту трактуется как неизвестный.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    /// Создать отправление (прямое или RTO)
    async fn create_shipment(
        &self,
        request: &CreateShipmentRequest,
    ) -> Result<CreatedShipment, CarrierError>;

    /// Оформить обратную доставку по исходной накладной
    async fn create_return_shipment(
        &self,
        original_waybill: &str,
        reason: &str,
    ) -> Result<CreatedShipment, CarrierError>;

    /// Запланировать забор груза; сбой не отменяет созданное отправление
    async fn schedule_pickup(&self, request: &PickupRequest) -> Result<(), CarrierError>;

    /// Текущий статус отправления (только чтение, для дашбордов)
    async fn track_shipment(&self, waybill: &str) -> Result<ShipmentTracking, CarrierError>;
}

static GATEWAY: OnceCell<ParcelwayClient> = OnceCell::new();

/// Инициализация глобального клиента перевозчика из конфигурации
pub fn initialize_gateway(config: &CarrierConfig) -> anyhow::Result<()> {
    GATEWAY
        .set(ParcelwayClient::new(config)?)
        .map_err(|_| anyhow::anyhow!("Carrier gateway already initialized"))?;
    Ok(())
}

pub fn gateway() -> &'static ParcelwayClient {
    GATEWAY.get().expect("Carrier gateway is not initialized")
}
