use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Registered claims carried by every identity token.
///
/// Timestamps are whole Unix seconds. A claims set minted at `iat` with a
/// time-to-live `ttl` always has `nbf == iat` and `exp == iat + ttl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer (name of the service that minted the token)
    pub iss: String,

    /// Subject (username the token asserts identity for)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID, unique per minted token
    pub jti: String,
}

impl Claims {
    /// Build the claims for a token issued at `issued_at` and living for `ttl`.
    ///
    /// # Arguments
    /// * `issuer` - Issuer name
    /// * `subject` - Username the token is issued for
    /// * `issued_at` - Mint instant
    /// * `ttl` - Time-to-live
    ///
    /// # Returns
    /// Claims with a fresh random `jti`
    pub fn issue(
        issuer: impl ToString,
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let iat = issued_at.timestamp();

        Self {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            iat,
            nbf: iat,
            exp: iat + ttl.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check whether the token has reached its expiry at `current_timestamp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Check whether the token is not yet usable at `current_timestamp`.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.nbf
    }

    /// Full validity check: `nbf <= now < exp` and the issuer matches.
    pub fn is_valid_at(&self, now: DateTime<Utc>, issuer: &str) -> bool {
        let now = now.timestamp();
        self.iss == issuer && !self.is_premature(now) && !self.is_expired(now)
    }
}
