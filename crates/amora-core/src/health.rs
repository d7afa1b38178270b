use axum::http::StatusCode;

/// Handler for `GET /healthz`: the process is up. Readiness is service specific.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
