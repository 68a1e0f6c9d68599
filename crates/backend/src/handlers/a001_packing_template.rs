use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_packing_template::aggregate::{PackingTemplate, PackingTemplateDto};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{core_error_response, ApiError};
use crate::domain::a001_packing_template as domain;

/// Handler для получения списка шаблонов упаковки
pub async fn list_all() -> Result<Json<Vec<PackingTemplate>>, ApiError> {
    let items = domain::service::list_all()
        .await
        .map_err(core_error_response)?;
    Ok(Json(items))
}

/// Handler для создания/обновления шаблона упаковки
pub async fn upsert(Json(dto): Json<PackingTemplateDto>) -> Result<Json<Value>, ApiError> {
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

/// Handler для получения шаблона упаковки по ID
pub async fn get_by_id(
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<PackingTemplate>, ApiError> {
    let uuid = parse_uuid(&id)?;

    let item = domain::service::get_by_id(uuid)
        .await
        .map_err(core_error_response)?
        .ok_or_else(not_found)?;

    Ok(Json(item))
}

/// Handler для мягкого удаления шаблона упаковки
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
            error: "Шаблон упаковки не найден".into(),
            kind: "not_found",
        }),
    )
}
