pub mod hasher;
pub mod tokens;

pub use hasher::Argon2CredentialHasher;
