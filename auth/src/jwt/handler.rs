use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT token handler for minting and verifying identity tokens.
///
/// Each handler owns exactly one symmetric secret and one issuer name. Uses
/// HS256 (HMAC with SHA-256); tokens signed with any other algorithm are
/// rejected. Both operations are pure functions of the secret, the claims and
/// the supplied instant, so a handler can be shared freely between tasks.
pub struct JwtHandler {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler.
    ///
    /// # Arguments
    /// * `issuer` - Issuer name stamped into and required from every token
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Access and refresh tokens must use different secrets
    pub fn new(issuer: impl ToString, secret: &[u8]) -> Self {
        Self {
            issuer: issuer.to_string(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Issuer name this handler signs and accepts.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Mint a signed token for `subject`, valid from `now` for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Username the token asserts
    /// * `now` - Mint instant (becomes `iat` and `nbf`)
    /// * `ttl` - Time-to-live (`exp = now + ttl`)
    ///
    /// # Returns
    /// Compact JWT string (header.payload.signature)
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims serialization or signing failed
    pub fn mint(
        &self,
        subject: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims::issue(&self.issuer, subject, now, ttl);
        self.encode(&claims)
    }

    /// Sign an arbitrary claims set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims serialization or signing failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token at instant `now` and return its subject.
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    /// * `now` - Instant the validity window is checked against
    ///
    /// # Returns
    /// The `sub` claim
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, wrongly signed, foreign issuer, not yet
    ///   valid, or expired. The cases are not distinguished.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, JwtError> {
        self.decode(token, now).map(|claims| claims.sub)
    }

    /// Verify a token at instant `now` and return all of its claims.
    ///
    /// # Errors
    /// * `InvalidToken` - See [`JwtHandler::verify`]
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // The window is checked against the caller's instant below, not the wall clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| JwtError::InvalidToken)?;

        let claims = token_data.claims;
        if !claims.is_valid_at(now, &self.issuer) {
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }
}
