use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::credential::errors::AuthFlowError;
use crate::domain::credential::models::CreateUserCommand;
use crate::domain::credential::models::Username;
use crate::domain::credential::ports::AuthFlowPort;
use crate::inbound::http::router::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_flow
        .create_user(body.user.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    user: UserInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    username: String,
    password: String,
}

impl UserInput {
    fn try_into_command(self) -> Result<CreateUserCommand, AuthFlowError> {
        let username = Username::new(self.username)?;
        Ok(CreateUserCommand::new(username, self.password))
    }
}
