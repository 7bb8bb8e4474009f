use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for credential persistence operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential already exists: {0}")]
    AlreadyExists(String),

    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error for password hashing operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HashingError {
    #[error("Password does not match")]
    Mismatch,

    #[error("Password hashing failed: {0}")]
    Failed(String),
}

/// Error for token operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is invalid")]
    Invalid,

    #[error("Token signing failed: {0}")]
    SigningFailed(String),
}

/// Top-level error for the authentication flow.
///
/// `UserNotFound`, `UserUnauthorized` and `TokenInvalid` are kept apart for
/// logging only; the transport layer renders all three as one `Unauthorized`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthFlowError {
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User unauthorized: {0}")]
    UserUnauthorized(String),

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthFlowError {
    /// Whether the caller must only ever see a generic "unauthorized" answer.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthFlowError::UserNotFound(_)
                | AuthFlowError::UserUnauthorized(_)
                | AuthFlowError::TokenInvalid
        )
    }
}
