pub mod a001_packing_template;
pub mod a002_packing_rule;
pub mod a003_return_request;
pub mod packaging;

use axum::http::StatusCode;
use axum::Json;
use contracts::errors::CoreError;
use serde::Serialize;

/// Тело ответа с ошибкой: машиночитаемый класс + сообщение
///
/// Класс ошибки различим на клиенте: оператор по kind="carrier" видит,
/// что нужно повторить создание отправления, а не одобрять заявку заново.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Маппинг классов ошибок ядра на HTTP-статусы
pub fn core_error_response(e: CoreError) -> ApiError {
    let status = match &e {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::StateConflict(_) => StatusCode::CONFLICT,
        CoreError::DataIntegrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::Carrier(_) => StatusCode::BAD_GATEWAY,
        CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Internal error: {}", e);
    }
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
            kind: e.kind(),
        }),
    )
}
