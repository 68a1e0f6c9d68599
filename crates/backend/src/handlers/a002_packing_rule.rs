use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_packing_rule::aggregate::{PackingRule, PackingRuleDto};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{core_error_response, ApiError};
use crate::domain::a002_packing_rule as domain;

/// Handler для получения списка правил упаковки
pub async fn list_all() -> Result<Json<Vec<PackingRule>>, ApiError> {
    let items = domain::service::list_all()
        .await
        .map_err(core_error_response)?;
    Ok(Json(items))
}

/// Handler для создания/обновления правила упаковки
///
/// Создание дубликата пары (бренд, тип товара) возвращает 409,
/// существующее правило не изменяется.
pub async fn upsert(Json(dto): Json<PackingRuleDto>) -> Result<Json<Value>, ApiError> {
    if dto.id.is_some() {
        domain::service::update(dto)
            .await
            .map_err(core_error_response)?;
        Ok(Json(json!({"success": true})))
    } else {
        let id = domain::service::create(dto)
            .await
            .map_err(core_error_response)?;
        Ok(Json(json!({"success": true, "id": id.to_string()})))
    }
}

/// Handler для получения правила упаковки по ID
pub async fn get_by_id(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<PackingRule>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let item = domain::service::get_by_id(uuid)
        .await
        .map_err(core_error_response)?
        .ok_or_else(not_found)?;

    Ok(Json(item))
}

/// Handler для мягкого удаления правила упаковки
pub async fn delete(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let deleted = domain::service::delete(uuid)
        .await
        .map_err(core_error_response)?;

    Ok(Json(json!({"success": deleted})))
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
            error: "Правило упаковки не найдено".into(),
            kind: "not_found",
        }),
    )
}
