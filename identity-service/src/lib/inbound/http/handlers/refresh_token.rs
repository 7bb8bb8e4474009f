use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::issue_token::TokenDetailData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::credential::models::RefreshTokenCommand;
use crate::domain::credential::ports::AuthFlowPort;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<ApiSuccess<TokenDetailData>, ApiError> {
    let command = RefreshTokenCommand::new(body.token.access_token, body.token.refresh_token);

    state
        .auth_flow
        .refresh_token(command)
        .await
        .map_err(ApiError::from)
        .map(|token_set| ApiSuccess::new(StatusCode::OK, token_set.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    token: RefreshInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshInput {
    access_token: String,
    refresh_token: String,
}
