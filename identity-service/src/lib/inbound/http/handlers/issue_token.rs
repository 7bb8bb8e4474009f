use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::credential::models::IssueTokenCommand;
use crate::domain::credential::models::TokenSet;
use crate::domain::credential::models::Username;
use crate::domain::credential::ports::AuthFlowPort;
use crate::inbound::http::router::AppState;

pub async fn issue_token(
    State(state): State<AppState>,
    Json(body): Json<IssueTokenRequest>,
) -> Result<ApiSuccess<TokenDetailData>, ApiError> {
    // A malformed username cannot belong to anyone
    let username = Username::new(body.user.username).map_err(|_| ApiError::unauthorized())?;

    state
        .auth_flow
        .issue_token(IssueTokenCommand::new(username, body.user.password))
        .await
        .map_err(ApiError::from)
        .map(|token_set| ApiSuccess::new(StatusCode::OK, token_set.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueTokenRequest {
    user: IssueInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueInput {
    username: String,
    password: String,
}

/// Token pair as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDetailData {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: String,
}

impl From<TokenSet> for TokenDetailData {
    fn from(token_set: TokenSet) -> Self {
        Self {
            access_token: token_set.access_token,
            token_type: "Bearer".to_string(),
            expires_in: token_set.expires_in,
            refresh_token: token_set.refresh_token,
        }
    }
}
