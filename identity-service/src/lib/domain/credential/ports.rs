use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::credential::errors::AuthFlowError;
use crate::domain::credential::errors::CredentialError;
use crate::domain::credential::errors::HashingError;
use crate::domain::credential::errors::TokenError;
use crate::domain::credential::models::CreateUserCommand;
use crate::domain::credential::models::Credential;
use crate::domain::credential::models::IssueTokenCommand;
use crate::domain::credential::models::RefreshTokenCommand;
use crate::domain::credential::models::TokenSet;
use crate::domain::credential::models::Username;

/// Port for authentication flow operations.
#[async_trait]
pub trait AuthFlowPort: Send + Sync + 'static {
    /// Register a new user. No token is issued.
    ///
    /// # Arguments
    /// * `command` - Validated username and plaintext password
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Username is already taken
    /// * `Internal` - Hashing or storage failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<(), AuthFlowError>;

    /// Delete the user the access token was issued for.
    ///
    /// # Arguments
    /// * `bearer_token` - Access token, with or without a `Bearer ` prefix
    ///
    /// # Errors
    /// * `TokenInvalid` - Token does not verify with the access codec
    /// * `UserNotFound` - Token subject has no credential
    /// * `Internal` - Storage failed
    async fn delete_user(&self, bearer_token: &str) -> Result<(), AuthFlowError>;

    /// Exchange a username and password for a fresh token pair.
    ///
    /// # Errors
    /// * `UserNotFound` - No credential for the username
    /// * `UserUnauthorized` - Password does not match
    /// * `Internal` - Hashing, signing or storage failed
    async fn issue_token(&self, command: IssueTokenCommand) -> Result<TokenSet, AuthFlowError>;

    /// Exchange an access/refresh pair for a fresh token pair.
    ///
    /// # Errors
    /// * `TokenInvalid` - Neither token verifies
    /// * `UserNotFound` - Token subject has been deleted
    /// * `Internal` - Signing or storage failed
    async fn refresh_token(&self, command: RefreshTokenCommand)
        -> Result<TokenSet, AuthFlowError>;
}

/// Persistence operations for credentials, keyed by username.
///
/// Implementations must guarantee at most one credential per username, even
/// under concurrent `create` calls for the same key.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Persist a new credential.
    ///
    /// # Errors
    /// * `AlreadyExists` - Username is already taken; nothing is overwritten
    /// * `Storage` - Backing store failed
    async fn create(&self, credential: Credential) -> Result<(), CredentialError>;

    /// Retrieve the credential for a username.
    ///
    /// # Errors
    /// * `NotFound` - No credential for the username
    /// * `Storage` - Backing store failed
    async fn get(&self, username: &Username) -> Result<Credential, CredentialError>;

    /// Remove a credential.
    ///
    /// # Errors
    /// * `NotFound` - No credential for the username
    /// * `Storage` - Backing store failed
    async fn delete(&self, credential: &Credential) -> Result<(), CredentialError>;
}

/// One-way, salted password hashing.
#[async_trait]
pub trait PasswordHashing: Send + Sync + 'static {
    /// Produce a self-describing digest of `password`.
    ///
    /// # Errors
    /// * `Failed` - Hashing subsystem failed
    async fn hash(&self, password: &str) -> Result<String, HashingError>;

    /// Check `password` against `digest` in constant time.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match (an expected outcome)
    /// * `Failed` - Digest unreadable or hashing subsystem failed
    async fn compare(&self, password: &str, digest: &str) -> Result<(), HashingError>;
}

/// Signs and verifies time-bounded identity assertions under one secret.
pub trait TokenCodec: Send + Sync + 'static {
    /// Mint a token for `subject` valid over `[now, now + ttl)`.
    ///
    /// # Errors
    /// * `SigningFailed` - Token could not be signed
    fn mint(&self, subject: &str, now: DateTime<Utc>, ttl: Duration)
        -> Result<String, TokenError>;

    /// Verify a token at `now` and return its subject.
    ///
    /// # Errors
    /// * `Invalid` - Any structural, signature, issuer or time-window failure
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}
