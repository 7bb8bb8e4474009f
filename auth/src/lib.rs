//! Authentication utilities library
//!
//! Provides the security primitives used by the identity service:
//! - Password hashing (Argon2id)
//! - HS256 identity tokens bound to an issuer and a validity window
//!
//! The service defines its own traits (ports) and adapts these implementations,
//! so storage and transport concerns never leak in here.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//! use auth::PasswordError;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! assert_eq!(hasher.verify("not_it", &hash), Err(PasswordError::Mismatch));
//! ```
//!
//! ## Identity Tokens
//! ```
//! use auth::JwtHandler;
//! use chrono::Duration;
//! use chrono::Utc;
//!
//! let handler = JwtHandler::new("key-stone", b"secret_key_at_least_32_bytes_long!");
//! let now = Utc::now();
//! let token = handler.mint("alice", now, Duration::minutes(15)).unwrap();
//! assert_eq!(handler.verify(&token, now).unwrap(), "alice");
//! assert!(handler.verify(&token, now + Duration::minutes(15)).is_err());
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
