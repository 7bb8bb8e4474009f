use auth::JwtHandler;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::credential::errors::TokenError;
use crate::domain::credential::ports::TokenCodec;

impl TokenCodec for JwtHandler {
    fn mint(
        &self,
        subject: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        JwtHandler::mint(self, subject, now, ttl)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        JwtHandler::verify(self, token, now).map_err(|_| TokenError::Invalid)
    }
}
