use crate::dto::health::HealthResponse;

/// Respond with a static health payload.
///
/// The service keeps no external connections, so liveness is the only
/// signal: if the handler runs, the answer is "ok".
pub async fn health_status() -> HealthResponse {
    HealthResponse::ok()
}
