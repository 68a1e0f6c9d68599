use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов
///
/// Пишет в журнал метод, путь, статус и длительность обработки.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    if response.status().is_success() {
        tracing::info!("{} {} -> {} ({}ms)", method, uri.path(), status, duration.as_millis());
    } else {
        tracing::warn!("{} {} -> {} ({}ms)", method, uri.path(), status, duration.as_millis());
    }

    response
}
