use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use crate::enums::{RequestStatus, RequestType, ShipmentKind};
use crate::shared::packaging::BoxDimensions;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для заявки на возврат/замену
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnRequestId(pub Uuid);

impl ReturnRequestId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ReturnRequestId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ReturnRequestId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Заявка покупателя на возврат или замену товара (агрегат)
///
/// Жизненный цикл: создаётся покупателем со статусом pending, далее
/// изменяется только действием администратора (approve/reject) и
/// оркестратором, прикрепляющим накладную перевозчика после одобрения.
/// После выхода из pending запись неизменяема, кроме полей отправления.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
    #[serde(flatten)]
    pub base: BaseAggregate<ReturnRequestId>,

    /// Ссылка на заказ
    #[serde(rename = "orderId")]
    pub order_id: String,

    /// Ссылка на строку заказа
    #[serde(rename = "orderItemId")]
    pub order_item_id: String,

    /// Ссылка на покупателя
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Ссылка на бренд (продавца)
    #[serde(rename = "brandId")]
    pub brand_id: String,

    /// Тип товара из строки заказа (вход резолвера упаковки)
    #[serde(rename = "productTypeId")]
    pub product_type_id: String,

    /// Название товара для накладной
    #[serde(rename = "itemName")]
    pub item_name: String,

    /// Заявленные габариты товара, если витрина их передала
    #[serde(rename = "declaredDimensions")]
    pub declared_dimensions: Option<BoxDimensions>,

    /// Вес товара в граммах для накладной
    #[serde(rename = "weightGrams")]
    pub weight_grams: i32,

    /// Тип заявки: возврат или замена
    #[serde(rename = "requestType")]
    pub request_type: RequestType,

    /// Вариант на замену; обязателен для replace и запрещён для return
    #[serde(rename = "newVariantId")]
    pub new_variant_id: Option<String>,

    /// Причина обращения (свободный текст)
    pub reason: Option<String>,

    /// Упорядоченный список URL загруженных фото-доказательств
    pub images: Vec<String>,

    /// Накладная прямой доставки заказа, если витрина её передала;
    /// при возврате позволяет оформить RTO по исходному отправлению
    #[serde(rename = "originalWaybill")]
    pub original_waybill: Option<String>,

    /// Адресные данные покупателя (снимок на момент подачи заявки)
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerPhone")]
    pub customer_phone: String,
    #[serde(rename = "customerAddress")]
    pub customer_address: String,
    #[serde(rename = "customerPincode")]
    pub customer_pincode: String,

    /// Статус заявки
    pub status: RequestStatus,

    /// Накладная перевозчика, прикрепляется оркестратором после одобрения
    #[serde(rename = "waybillNumber")]
    pub waybill_number: Option<String>,

    /// Вид созданного отправления (RTO или прямая отправка замены)
    #[serde(rename = "shipmentKind")]
    pub shipment_kind: Option<ShipmentKind>,

    /// Момент успешного создания отправления
    #[serde(rename = "fulfilledAt")]
    pub fulfilled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ReturnRequest {
    pub fn new_for_insert(code: String, dto: &SubmitReturnRequestDto) -> Self {
        let mut base = BaseAggregate::new(
            ReturnRequestId::new_v4(),
            code,
            dto.description.clone(),
        );
        base.comment = dto.comment.clone();
        Self {
            base,
            order_id: dto.order_id.clone(),
            order_item_id: dto.order_item_id.clone(),
            user_id: dto.user_id.clone(),
            brand_id: dto.brand_id.clone(),
            product_type_id: dto.product_type_id.clone(),
            item_name: dto.item_name.clone(),
            declared_dimensions: dto.declared_dimensions,
            weight_grams: dto.weight_grams,
            request_type: dto.request_type,
            new_variant_id: dto.new_variant_id.clone(),
            reason: dto.reason.clone(),
            images: dto.images.clone(),
            original_waybill: dto.original_waybill.clone(),
            customer_name: dto.customer_name.clone(),
            customer_phone: dto.customer_phone.clone(),
            customer_address: dto.customer_address.clone(),
            customer_pincode: dto.customer_pincode.clone(),
            status: RequestStatus::Pending,
            waybill_number: None,
            shipment_kind: None,
            fulfilled_at: None,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Заявка одобрена, но отправление ещё не создано
    pub fn is_unfulfilled(&self) -> bool {
        self.status == RequestStatus::Approved && self.waybill_number.is_none()
    }

    /// Перевести заявку в новый статус с проверкой допустимости перехода
    pub fn transition(&mut self, target: RequestStatus) -> Result<(), String> {
        if !self.status.can_transition_to(target) {
            return Err(format!(
                "Недопустимый переход статуса: {} -> {}",
                self.status, target
            ));
        }
        self.status = target;
        self.base.touch();
        Ok(())
    }

    /// Прикрепить накладную перевозчика после успешного создания отправления
    pub fn attach_shipment(&mut self, waybill_number: String, kind: ShipmentKind) {
        self.waybill_number = Some(waybill_number);
        self.shipment_kind = Some(kind);
        self.fulfilled_at = Some(chrono::Utc::now());
        self.base.touch();
    }

    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.order_id.trim().is_empty() {
            return Err("Заказ обязателен".into());
        }
        if self.order_item_id.trim().is_empty() {
            return Err("Строка заказа обязательна".into());
        }
        if self.user_id.trim().is_empty() {
            return Err("Покупатель обязателен".into());
        }
        if self.brand_id.trim().is_empty() {
            return Err("Бренд обязателен".into());
        }
        if self.product_type_id.trim().is_empty() {
            return Err("Тип товара обязателен".into());
        }
        if self.weight_grams < 0 {
            return Err("Вес не может быть отрицательным".into());
        }
        match self.request_type {
            RequestType::Replace => {
                match &self.new_variant_id {
                    Some(v) if !v.trim().is_empty() => {}
                    _ => return Err("Для замены обязателен вариант на замену".into()),
                }
            }
            RequestType::Return => {
                if self.new_variant_id.is_some() {
                    return Err("Для возврата вариант на замену не указывается".into());
                }
            }
        }
        if self.customer_name.trim().is_empty() {
            return Err("Имя получателя обязательно".into());
        }
        if self.customer_address.trim().is_empty() {
            return Err("Адрес получателя обязателен".into());
        }
        if self.customer_pincode.trim().is_empty() {
            return Err("Индекс получателя обязателен".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for ReturnRequest {
    type Id = ReturnRequestId;
    fn id(&self) -> Self::Id {
        self.base.id
    }
    fn code(&self) -> &str {
        &self.base.code
    }
    fn description(&self) -> &str {
        &self.base.description
    }
    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }
    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }
    fn events(&self) -> &EventStore {
        &self.base.events
    }
    fn events_mut(&mut self) -> &mut EventStore {
        &mut self.base.events
    }
    fn aggregate_index() -> &'static str {
        "a003"
    }
    fn collection_name() -> &'static str {
        "return_request"
    }
    fn element_name() -> &'static str {
        "Заявка на возврат/замену"
    }
    fn list_name() -> &'static str {
        "Заявки на возврат/замену"
    }
    fn origin() -> Origin {
        Origin::Storefront
    }
}

// =============================================================================
// DTO
// =============================================================================

/// Заявка, подаваемая витриной от имени покупателя
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubmitReturnRequestDto {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "orderItemId")]
    pub order_item_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "brandId")]
    pub brand_id: String,
    #[serde(rename = "productTypeId")]
    pub product_type_id: String,
    #[serde(rename = "itemName", default)]
    pub item_name: String,
    #[serde(rename = "declaredDimensions")]
    pub declared_dimensions: Option<BoxDimensions>,
    #[serde(rename = "weightGrams", default)]
    pub weight_grams: i32,
    #[serde(rename = "requestType")]
    pub request_type: RequestType,
    #[serde(rename = "newVariantId")]
    pub new_variant_id: Option<String>,
    pub reason: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "originalWaybill")]
    pub original_waybill: Option<String>,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerPhone", default)]
    pub customer_phone: String,
    #[serde(rename = "customerAddress")]
    pub customer_address: String,
    #[serde(rename = "customerPincode")]
    pub customer_pincode: String,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_dto(request_type: RequestType, new_variant_id: Option<&str>) -> SubmitReturnRequestDto {
        SubmitReturnRequestDto {
            description: "Брак по шву".into(),
            order_id: "ord-1".into(),
            order_item_id: "item-1".into(),
            user_id: "user-1".into(),
            brand_id: "brand-x".into(),
            product_type_id: "tshirt".into(),
            item_name: "Футболка".into(),
            weight_grams: 300,
            request_type,
            new_variant_id: new_variant_id.map(Into::into),
            customer_name: "Иван Иванов".into(),
            customer_phone: "+7 900 000-00-00".into(),
            customer_address: "г. Москва, ул. Ленина, 1".into(),
            customer_pincode: "101000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_requires_new_variant() {
        let req = ReturnRequest::new_for_insert(
            "RR-1".into(),
            &submit_dto(RequestType::Replace, None),
        );
        assert!(req.validate().is_err());

        let req = ReturnRequest::new_for_insert(
            "RR-2".into(),
            &submit_dto(RequestType::Replace, Some("var-42")),
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_return_forbids_new_variant() {
        let req = ReturnRequest::new_for_insert(
            "RR-3".into(),
            &submit_dto(RequestType::Return, Some("var-42")),
        );
        assert!(req.validate().is_err());

        let req = ReturnRequest::new_for_insert(
            "RR-4".into(),
            &submit_dto(RequestType::Return, None),
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_transition_guards_terminal_states() {
        let mut req = ReturnRequest::new_for_insert(
            "RR-5".into(),
            &submit_dto(RequestType::Return, None),
        );
        assert!(req.transition(RequestStatus::Approved).is_ok());
        assert!(req.transition(RequestStatus::Rejected).is_err());
        assert!(req.transition(RequestStatus::Pending).is_err());
        assert!(req.is_unfulfilled());

        req.attach_shipment("WB123".into(), ShipmentKind::Rto);
        assert!(!req.is_unfulfilled());
        assert_eq!(req.waybill_number.as_deref(), Some("WB123"));
    }
}
