use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use crate::domain::credential::ports::AuthFlowPort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Delete the caller's own account. The access token in the
/// `Authorization` header is the only proof required.
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    state
        .auth_flow
        .delete_user(authorization)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}
