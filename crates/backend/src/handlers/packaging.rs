use axum::extract::Query;
use axum::Json;
use contracts::shared::packaging::{BoxDimensions, PackagingResult};
use serde::Deserialize;

use super::{core_error_response, ApiError};
use crate::shared::packaging;

/// Параметры запроса подбора упаковки
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub brand_id: String,
    pub product_type_id: String,
    /// Заявленные габариты товара на момент отгрузки (все три — или никакие)
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
}

/// Handler для подбора коробки по бренду и типу товара
pub async fn resolve(Query(query): Query<ResolveQuery>) -> Result<Json<PackagingResult>, ApiError> {
    let declared = match (query.length_cm, query.width_cm, query.height_cm) {
        (Some(l), Some(w), Some(h)) => Some(BoxDimensions::new(l, w, h)),
        _ => None,
    };

    let result = packaging::resolve(&query.brand_id, &query.product_type_id, declared)
        .await
        .map_err(core_error_response)?;

    Ok(Json(result))
}
