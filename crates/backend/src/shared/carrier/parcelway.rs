use async_trait::async_trait;
use contracts::enums::ShipmentKind;
use serde::Serialize;
use serde_json::json;

use super::{
    CarrierError, CarrierGateway, CreateShipmentRequest, CreatedShipment, PickupRequest,
    ShipmentTracking,
};
use crate::shared::config::CarrierConfig;

/// HTTP-клиент для работы с Parcelway Logistics API
pub struct ParcelwayClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ParcelwayClient {
    pub fn new(config: &CarrierConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// POST с одним повтором при временном сбое
    ///
    /// Повтор безопасен: создание отправления несёт order_ref, по которому
    /// перевозчик отбрасывает дубликаты.
    async fn post_json_with_retry(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, CarrierError> {
        match self.post_json(path, body).await {
            Err(e) if e.is_retryable() => {
                tracing::warn!("Parcelway transient failure, retrying once: {}", e);
                self.post_json(path, body).await
            }
            other => other,
        }
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, CarrierError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_reqwest_error)?;

        if status.is_client_error() {
            // Ответ валидации показывается оператору без изменений
            tracing::error!("Parcelway rejected request {}: {}", path, text);
            return Err(CarrierError::Validation(text));
        }
        if !status.is_success() {
            tracing::error!("Parcelway API failure {}: {} {}", path, status, text);
            return Err(CarrierError::Transient(format!(
                "Parcelway API status {}: {}",
                status,
                preview(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Parcelway response: {}", e);
            CarrierError::Protocol(format!("{}; body: {}", e, preview(&text)))
        })
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, CarrierError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.api_token))
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_reqwest_error)?;

        if status.is_client_error() {
            return Err(CarrierError::Validation(text));
        }
        if !status.is_success() {
            return Err(CarrierError::Transient(format!(
                "Parcelway API status {}: {}",
                status,
                preview(&text)
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| CarrierError::Protocol(format!("{}; body: {}", e, preview(&text))))
    }

    fn extract_waybill(payload: serde_json::Value) -> Result<CreatedShipment, CarrierError> {
        let waybill_number = payload
            .get("waybill")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                CarrierError::Protocol(format!("Response carries no waybill: {}", payload))
            })?;
        Ok(CreatedShipment {
            waybill_number,
            raw_response: payload,
        })
    }
}

/// Тело запроса создания отправления
#[derive(Debug, Serialize)]
struct ShipmentPayload<'a> {
    order_ref: &'a str,
    kind: &'static str,
    payment_mode: &'static str,
    consignee: AddressPayload<'a>,
    pickup: AddressPayload<'a>,
    package: PackagePayload,
    contents: &'a str,
}

#[derive(Debug, Serialize)]
struct AddressPayload<'a> {
    name: &'a str,
    phone: &'a str,
    address: &'a str,
    pincode: &'a str,
}

#[derive(Debug, Serialize)]
struct PackagePayload {
    weight_grams: i32,
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
    fragile: bool,
    self_packaged: bool,
}

impl<'a> From<&'a super::Address> for AddressPayload<'a> {
    fn from(a: &'a super::Address) -> Self {
        Self {
            name: &a.name,
            phone: &a.phone,
            address: &a.address,
            pincode: &a.pincode,
        }
    }
}

#[async_trait]
impl CarrierGateway for ParcelwayClient {
    async fn create_shipment(
        &self,
        request: &CreateShipmentRequest,
    ) -> Result<CreatedShipment, CarrierError> {
        let payload = ShipmentPayload {
            order_ref: &request.order_ref,
            kind: match request.kind {
                ShipmentKind::Rto => "rto",
                ShipmentKind::ReplacementOutbound => "forward",
            },
            payment_mode: request.payment_mode.code(),
            consignee: (&request.consignee).into(),
            pickup: (&request.origin).into(),
            package: PackagePayload {
                weight_grams: request.package.weight_grams,
                length_cm: request.package.dimensions.length_cm,
                width_cm: request.package.dimensions.width_cm,
                height_cm: request.package.dimensions.height_cm,
                fragile: request.package.fragile,
                self_packaged: request.package.self_packaged,
            },
            contents: &request.contents,
        };

        let body = serde_json::to_value(&payload)
            .map_err(|e| CarrierError::Protocol(e.to_string()))?;

        let response = self.post_json_with_retry("/api/v1/shipments", &body).await?;
        Self::extract_waybill(response)
    }

    async fn create_return_shipment(
        &self,
        original_waybill: &str,
        reason: &str,
    ) -> Result<CreatedShipment, CarrierError> {
        let body = json!({
            "original_waybill": original_waybill,
            "reason": reason,
        });

        let response = self.post_json_with_retry("/api/v1/returns", &body).await?;
        Self::extract_waybill(response)
    }

    async fn schedule_pickup(&self, request: &PickupRequest) -> Result<(), CarrierError> {
        let body = json!({
            "location": request.location,
            "date": request.date.format("%Y-%m-%d").to_string(),
            "expected_package_count": request.expected_package_count,
        });

        self.post_json_with_retry("/api/v1/pickups", &body).await?;
        Ok(())
    }

    async fn track_shipment(&self, waybill: &str) -> Result<ShipmentTracking, CarrierError> {
        let payload = self.get_json(&format!("/api/v1/track/{}", waybill)).await?;

        let status = payload
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(ShipmentTracking {
            waybill_number: waybill.to_string(),
            status,
            status_at: payload
                .get("status_at")
                .and_then(|v| v.as_str())
                .map(Into::into),
            location: payload
                .get("location")
                .and_then(|v| v.as_str())
                .map(Into::into),
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> CarrierError {
    if e.is_timeout() || e.is_connect() {
        // Исход неизвестен: отправление могло быть создано, повтор
        // безопасен только благодаря order_ref
        CarrierError::Transient(e.to_string())
    } else {
        CarrierError::Protocol(e.to_string())
    }
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}
