use axum::extract::Query;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_return_request::aggregate::{ReturnRequest, SubmitReturnRequestDto};
use contracts::enums::{RequestStatus, RequestType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{core_error_response, ApiError};
use crate::domain::a003_return_request as domain;
use crate::domain::a003_return_request::repository::{ReturnRequestListQuery, ReturnRequestTotals};
use crate::shared::carrier::{self, CarrierGateway, ShipmentTracking};

/// Ответ со списком заявок и пагинацией
#[derive(Debug, Serialize)]
pub struct PaginatedReturnRequestResponse {
    pub items: Vec<ReturnRequest>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Серверные итоги по всему датасету
    pub totals: Option<ReturnRequestTotals>,
}

/// Параметры запроса списка
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    pub request_type: Option<String>,
    pub user_id: Option<String>,
    pub brand_id: Option<String>,
    pub order_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Handler для получения списка заявок с пагинацией
pub async fn list_requests(
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<PaginatedReturnRequestResponse>, ApiError> {
    let page_size = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);
    let page = if page_size > 0 { offset / page_size } else { 0 };

    let list_query = ReturnRequestListQuery {
        status: query.status.as_deref().and_then(RequestStatus::from_code),
        request_type: query.request_type.as_deref().and_then(RequestType::from_code),
        user_id: query.user_id.clone(),
        brand_id: query.brand_id.clone(),
        order_id: query.order_id.clone(),
        limit: page_size,
        offset,
    };

    let result = domain::service::list(&list_query)
        .await
        .map_err(core_error_response)?;

    let total = result.total;
    let total_pages = if page_size > 0 {
        (total + page_size - 1) / page_size
    } else {
        0
    };

    let totals = domain::service::totals().await.ok();

    Ok(Json(PaginatedReturnRequestResponse {
        items: result.items,
        total,
        page,
        page_size,
        total_pages,
        totals,
    }))
}

/// Handler для подачи заявки покупателем
pub async fn submit(
    Json(dto): Json<SubmitReturnRequestDto>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let request = domain::service::submit(dto)
        .await
        .map_err(core_error_response)?;
    Ok(Json(request))
}

/// Handler для получения заявки по ID
pub async fn get_by_id(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let item = domain::service::get_by_id(uuid)
        .await
        .map_err(core_error_response)?
        .ok_or_else(not_found)?;

    Ok(Json(item))
}

/// Handler одобрения заявки администратором
///
/// Ошибка перевозчика возвращает 502 с классом "carrier": заявка уже
/// одобрена, оператору нужно повторить создание отправления, а не
/// одобрять заново.
pub async fn approve(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let request = domain::service::approve(uuid, carrier::gateway())
        .await
        .map_err(core_error_response)?;

    Ok(Json(request))
}

/// Handler отклонения заявки администратором
pub async fn reject(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let request = domain::service::reject(uuid)
        .await
        .map_err(core_error_response)?;

    Ok(Json(request))
}

/// Handler для списка одобренных заявок без отправления
pub async fn list_unfulfilled() -> Result<Json<Vec<ReturnRequest>>, ApiError> {
    let items = domain::service::list_unfulfilled()
        .await
        .map_err(core_error_response)?;
    Ok(Json(items))
}

/// Handler повторного создания отправления по одобренной заявке
pub async fn retry_shipment(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let request = domain::service::retry_fulfillment(uuid, carrier::gateway())
        .await
        .map_err(core_error_response)?;

    Ok(Json(request))
}

/// Handler для трекинга отправления заявки (данные перевозчика, только чтение)
pub async fn tracking(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<ShipmentTracking>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let request = domain::service::get_by_id(uuid)
        .await
        .map_err(core_error_response)?
        .ok_or_else(not_found)?;

    let waybill = request.waybill_number.as_deref().ok_or((
        StatusCode::CONFLICT,
        Json(super::ErrorBody {
            error: "По заявке нет отправления".into(),
            kind: "state_conflict",
        }),
    ))?;

    let tracking = carrier::gateway()
        .track_shipment(waybill)
        .await
        .map_err(|e| {
            tracing::error!("Tracking failed for waybill {}: {}", waybill, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(super::ErrorBody {
                    error: e.to_string(),
                    kind: "carrier",
                }),
            )
        })?;

    Ok(Json(tracking))
}

fn parse_uuid(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(super::ErrorBody {
                error: "Некорректный ID".into(),
                kind: "validation",
            }),
        )
    })
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(super::ErrorBody {
            error: "Заявка не найдена".into(),
            kind: "not_found",
        }),
    )
}
