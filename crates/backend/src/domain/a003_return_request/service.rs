use super::repository;
use super::repository::{ReturnRequestListQuery, ReturnRequestListResult, ReturnRequestTotals};
use contracts::domain::a003_return_request::aggregate::{ReturnRequest, SubmitReturnRequestDto};
use contracts::enums::{RequestStatus, RequestType, ShipmentKind};
use contracts::errors::{CoreError, CoreResult};
use uuid::Uuid;

use crate::shared::carrier::{
    Address, CarrierGateway, CreateShipmentRequest, PackageSpec, PaymentMode, PickupRequest,
};
use crate::shared::packaging;

/// Подача заявки покупателем: валидация и запись со статусом pending.
/// Перевозчик на этом шаге не вызывается.
pub async fn submit(dto: SubmitReturnRequestDto) -> CoreResult<ReturnRequest> {
    let code = format!("RR-{}", Uuid::new_v4());
    let mut aggregate = ReturnRequest::new_for_insert(code, &dto);

    aggregate.validate().map_err(CoreError::Validation)?;

    aggregate.before_write();

    repository::insert(&aggregate).await?;

    tracing::info!(
        "Return request {} submitted ({})",
        aggregate.to_string_id(),
        aggregate.request_type
    );

    Ok(aggregate)
}

/// Одобрение заявки администратором
///
/// Переход pending -> approved записывается атомарно ДО обращения к
/// перевозчику: решение администратора не должно потеряться из-за
/// сетевого сбоя. Сбой логистики оставляет заявку в состоянии
/// "одобрена без отправления" и не откатывает одобрение.
pub async fn approve(id: Uuid, gateway: &dyn CarrierGateway) -> CoreResult<ReturnRequest> {
    let request = repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?;

    // Замена без варианта не одобряется; заявка остаётся pending
    if request.request_type == RequestType::Replace {
        match &request.new_variant_id {
            Some(v) if !v.trim().is_empty() => {}
            _ => {
                return Err(CoreError::validation(
                    "Для замены обязателен вариант на замену",
                ))
            }
        }
    }

    // Условный переход: из двух конкурентных одобрений выигрывает одно,
    // второе получает конфликт состояния, второго отправления не будет
    let transitioned =
        repository::transition_status(id, RequestStatus::Pending, RequestStatus::Approved).await?;
    if !transitioned {
        let current = repository::get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?;
        return Err(CoreError::state_conflict(format!(
            "Заявка уже обработана, статус: {}",
            current.status
        )));
    }

    tracing::info!("Return request {} approved", id);

    let approved = repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?;

    fulfill(&approved, gateway).await
}

/// Отклонение заявки администратором
///
/// Повторное отклонение уже отклонённой заявки — no-op; отклонение
/// одобренной — конфликт состояния.
pub async fn reject(id: Uuid) -> CoreResult<ReturnRequest> {
    let request = repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?;

    if request.status == RequestStatus::Rejected {
        return Ok(request);
    }

    let transitioned =
        repository::transition_status(id, RequestStatus::Pending, RequestStatus::Rejected).await?;
    if !transitioned {
        let current = repository::get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?;
        if current.status == RequestStatus::Rejected {
            return Ok(current);
        }
        return Err(CoreError::state_conflict(format!(
            "Заявку в статусе {} нельзя отклонить",
            current.status
        )));
    }

    tracing::info!("Return request {} rejected", id);

    Ok(repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?)
}

/// Повторное создание отправления для одобренной заявки
///
/// Одобрение не перепроверяется; заявка с уже прикреплённой накладной —
/// no-op. Благодаря order_ref повтор не создаёт второе отправление
/// на стороне перевозчика.
pub async fn retry_fulfillment(id: Uuid, gateway: &dyn CarrierGateway) -> CoreResult<ReturnRequest> {
    let request = repository::get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?;

    if request.status != RequestStatus::Approved {
        return Err(CoreError::state_conflict(format!(
            "Повтор отправления доступен только для одобренных заявок, статус: {}",
            request.status
        )));
    }

    if request.waybill_number.is_some() {
        return Ok(request);
    }

    fulfill(&request, gateway).await
}

pub async fn get_by_id(id: Uuid) -> CoreResult<Option<ReturnRequest>> {
    Ok(repository::get_by_id(id).await?)
}

pub async fn list(query: &ReturnRequestListQuery) -> CoreResult<ReturnRequestListResult> {
    Ok(repository::list_filtered(query).await?)
}

pub async fn totals() -> CoreResult<ReturnRequestTotals> {
    Ok(repository::calculate_totals().await?)
}

pub async fn list_unfulfilled() -> CoreResult<Vec<ReturnRequest>> {
    Ok(repository::list_approved_unfulfilled().await?)
}

/// Логистическая часть одобрения: подбор упаковки, создание отправления,
/// прикрепление накладной, план забора груза
async fn fulfill(request: &ReturnRequest, gateway: &dyn CarrierGateway) -> CoreResult<ReturnRequest> {
    let carrier_config = &crate::shared::config::current()?.carrier;

    // Для возврата упаковка подбирается по возвращаемому товару, для
    // замены — по новому варианту (тот же бренд и тип товара)
    let packaging = packaging::resolve(
        &request.brand_id,
        &request.product_type_id,
        request.declared_dimensions,
    )
    .await?;

    let seller = Address {
        name: carrier_config.seller_name.clone(),
        phone: carrier_config.seller_phone.clone(),
        address: carrier_config.seller_address.clone(),
        pincode: carrier_config.seller_pincode.clone(),
    };
    let customer = Address {
        name: request.customer_name.clone(),
        phone: request.customer_phone.clone(),
        address: request.customer_address.clone(),
        pincode: request.customer_pincode.clone(),
    };

    let package = PackageSpec {
        weight_grams: request.weight_grams,
        dimensions: packaging.dimensions,
        fragile: packaging.is_fragile,
        self_packaged: packaging.ships_in_own_box,
    };

    let (kind, created) = match request.request_type {
        RequestType::Return => {
            let kind = ShipmentKind::Rto;
            // По исходной накладной оформляется обратная доставка; без
            // неё создаётся новое обратное отправление
            let created = match &request.original_waybill {
                Some(original) => {
                    gateway
                        .create_return_shipment(
                            original,
                            request.reason.as_deref().unwrap_or("customer return"),
                        )
                        .await
                }
                None => {
                    gateway
                        .create_shipment(&CreateShipmentRequest {
                            kind,
                            consignee: seller.clone(),
                            origin: customer.clone(),
                            package,
                            payment_mode: PaymentMode::Prepaid,
                            order_ref: request.to_string_id(),
                            contents: request.item_name.clone(),
                        })
                        .await
                }
            };
            (kind, created)
        }
        RequestType::Replace => {
            let kind = ShipmentKind::ReplacementOutbound;
            let created = gateway
                .create_shipment(&CreateShipmentRequest {
                    kind,
                    consignee: customer.clone(),
                    origin: seller.clone(),
                    package,
                    payment_mode: PaymentMode::Prepaid,
                    order_ref: request.to_string_id(),
                    contents: request.item_name.clone(),
                })
                .await;
            (kind, created)
        }
    };

    let created = created.map_err(|e| {
        tracing::error!(
            "Carrier fulfillment failed for request {}: {}",
            request.to_string_id(),
            e
        );
        CoreError::Carrier(e.to_string())
    })?;

    repository::attach_shipment(
        request.base.id.value(),
        &created.waybill_number,
        kind,
        Some(created.raw_response.to_string()),
    )
    .await?;

    tracing::info!(
        "Shipment {} ({}) created for request {}",
        created.waybill_number,
        kind,
        request.to_string_id()
    );

    // Забор груза — отдельный вызов с независимым доменом сбоя:
    // неудача не отменяет уже созданное отправление
    let pickup = PickupRequest {
        location: match kind {
            ShipmentKind::Rto => request.customer_address.clone(),
            ShipmentKind::ReplacementOutbound => carrier_config.pickup_location.clone(),
        },
        date: chrono::Utc::now().date_naive() + chrono::Duration::days(1),
        expected_package_count: 1,
    };
    if let Err(e) = gateway.schedule_pickup(&pickup).await {
        tracing::warn!(
            "Pickup scheduling failed for request {} (shipment {} already created): {}",
            request.to_string_id(),
            created.waybill_number,
            e
        );
    }

    Ok(repository::get_by_id(request.base.id.value())
        .await?
        .ok_or_else(|| CoreError::data_integrity("Заявка не найдена"))?)
}
