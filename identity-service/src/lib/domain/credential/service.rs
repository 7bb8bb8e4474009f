use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::credential::errors::AuthFlowError;
use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::errors::HashingError;
use crate::domain::credential::models::CreateUserCommand;
use crate::domain::credential::models::Credential;
use crate::domain::credential::models::IssueTokenCommand;
use crate::domain::credential::models::RefreshTokenCommand;
use crate::domain::credential::models::TokenPolicy;
use crate::domain::credential::models::TokenSet;
use crate::domain::credential::models::Username;
use crate::domain::credential::ports::AuthFlowPort;
use crate::domain::credential::ports::Clock;
use crate::domain::credential::ports::CredentialRepository;
use crate::domain::credential::ports::PasswordHashing;
use crate::domain::credential::ports::TokenCodec;

/// Domain service implementing the authentication flow.
///
/// Stateless across calls: it only holds its collaborators. Access tokens are
/// minted and verified by `access_codec`, refresh tokens by `refresh_codec`;
/// the two are expected to use different secrets.
pub struct AuthFlow<CR, PH, TC>
where
    CR: CredentialRepository,
    PH: PasswordHashing,
    TC: TokenCodec,
{
    repository: Arc<CR>,
    hasher: Arc<PH>,
    access_codec: Arc<TC>,
    refresh_codec: Arc<TC>,
    clock: Arc<dyn Clock>,
    policy: TokenPolicy,
}

impl<CR, PH, TC> AuthFlow<CR, PH, TC>
where
    CR: CredentialRepository,
    PH: PasswordHashing,
    TC: TokenCodec,
{
    /// Create a new authentication flow with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential persistence implementation
    /// * `hasher` - Password hashing implementation
    /// * `access_codec` - Codec for short-lived access tokens
    /// * `refresh_codec` - Codec for long-lived refresh tokens
    /// * `clock` - Source of the current instant
    pub fn new(
        repository: Arc<CR>,
        hasher: Arc<PH>,
        access_codec: Arc<TC>,
        refresh_codec: Arc<TC>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            hasher,
            access_codec,
            refresh_codec,
            clock,
            policy: TokenPolicy::new(),
        }
    }

    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    fn mint_token_set(&self, subject: &Username) -> Result<TokenSet, AuthFlowError> {
        let now = self.clock.now();

        let access_token = self
            .access_codec
            .mint(subject.as_str(), now, self.policy.access_token_ttl())
            .map_err(|e| internal("Failed to mint access token", e))?;
        let refresh_token = self
            .refresh_codec
            .mint(subject.as_str(), now, self.policy.refresh_token_ttl())
            .map_err(|e| internal("Failed to mint refresh token", e))?;

        Ok(TokenSet {
            access_token,
            refresh_token,
            expires_in: self.policy.expires_in(),
        })
    }

    /// Subject of whichever token verifies first: access codec, then refresh codec.
    fn extract_subject(
        &self,
        command: &RefreshTokenCommand,
        now: DateTime<Utc>,
    ) -> Result<String, AuthFlowError> {
        if let Ok(subject) = self.access_codec.verify(&command.access_token, now) {
            return Ok(subject);
        }

        self.refresh_codec
            .verify(&command.refresh_token, now)
            .map_err(|_| AuthFlowError::TokenInvalid)
    }

    async fn find_credential(&self, username: &Username) -> Result<Credential, AuthFlowError> {
        self.repository.get(username).await.map_err(|e| match e {
            CredentialError::NotFound(name) => {
                tracing::info!(username = %name, "No credential for username");
                AuthFlowError::UserNotFound(name)
            }
            other => internal("Failed to read credential", other),
        })
    }
}

#[async_trait]
impl<CR, PH, TC> AuthFlowPort for AuthFlow<CR, PH, TC>
where
    CR: CredentialRepository,
    PH: PasswordHashing,
    TC: TokenCodec,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<(), AuthFlowError> {
        let password_digest = self
            .hasher
            .hash(&command.password)
            .await
            .map_err(|e| internal("Failed to hash password", e))?;

        let username = command.username;
        self.repository
            .create(Credential::new(username.clone(), password_digest))
            .await
            .map_err(|e| match e {
                CredentialError::AlreadyExists(name) => AuthFlowError::UserAlreadyExists(name),
                other => internal("Failed to create credential", other),
            })?;

        tracing::info!(username = %username, "User created");

        Ok(())
    }

    async fn delete_user(&self, bearer_token: &str) -> Result<(), AuthFlowError> {
        let token = strip_bearer_prefix(bearer_token);

        let subject = self
            .access_codec
            .verify(token, self.clock.now())
            .map_err(|_| AuthFlowError::TokenInvalid)?;
        let username = Username::new(subject).map_err(|_| AuthFlowError::TokenInvalid)?;

        let credential = self.find_credential(&username).await?;

        self.repository
            .delete(&credential)
            .await
            .map_err(|e| match e {
                CredentialError::NotFound(name) => AuthFlowError::UserNotFound(name),
                other => internal("Failed to delete credential", other),
            })?;

        tracing::info!(username = %username, "User deleted");

        Ok(())
    }

    async fn issue_token(&self, command: IssueTokenCommand) -> Result<TokenSet, AuthFlowError> {
        let credential = self.find_credential(&command.username).await?;

        self.hasher
            .compare(&command.password, &credential.password_digest)
            .await
            .map_err(|e| match e {
                HashingError::Mismatch => {
                    tracing::info!(username = %credential.username, "Password mismatch");
                    AuthFlowError::UserUnauthorized(credential.username.to_string())
                }
                other => internal("Failed to compare password", other),
            })?;

        let token_set = self.mint_token_set(&credential.username)?;

        tracing::debug!(username = %credential.username, "Token pair issued");

        Ok(token_set)
    }

    async fn refresh_token(
        &self,
        command: RefreshTokenCommand,
    ) -> Result<TokenSet, AuthFlowError> {
        let subject = self.extract_subject(&command, self.clock.now())?;
        let username = Username::new(subject).map_err(|_| AuthFlowError::TokenInvalid)?;

        let credential = self.find_credential(&username).await?;

        let token_set = self.mint_token_set(&credential.username)?;

        tracing::debug!(username = %credential.username, "Token pair refreshed");

        Ok(token_set)
    }
}

/// Remove an optional `Bearer` scheme (any case) from an authorization value.
pub fn strip_bearer_prefix(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => value,
    }
}

fn internal(context: &str, error: impl fmt::Display) -> AuthFlowError {
    tracing::error!(error = %error, "{}", context);
    AuthFlowError::Internal(format!("{}: {}", context, error))
}
