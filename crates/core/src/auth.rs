//! Identity tokens.
//!
//! Sign-in happens at an external identity provider; requests reach us with
//! an HS256 bearer token whose claims describe the user. Logging out is
//! purely client-side (the client drops its token).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

impl From<Claims> for User {
    fn from(claims: Claims) -> Self {
        User {
            uid: claims.sub,
            email: claims.email,
            display_name: claims.name,
            photo_url: claims.picture,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token has an empty subject")]
    MissingSubject,
}

/// Signing and verification keys derived from a shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token for `user`, valid for `ttl`.
    pub fn issue(&self, user: &User, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.uid.clone(),
            name: user.display_name.clone(),
            email: user.email.clone(),
            picture: user.photo_url.clone(),
            iat: now.timestamp().max(0) as u64,
            exp: (now + ttl).timestamp().max(0) as u64,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry and return the user.
    pub fn verify(&self, token: &str) -> Result<User, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        if data.claims.sub.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            uid: "alice".into(),
            email: "alice@example.com".into(),
            display_name: "Alice".into(),
            photo_url: Some("https://example.com/a.png".into()),
        }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let keys = TokenKeys::from_secret(b"test-secret");
        let token = keys.issue(&alice(), Duration::hours(1)).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), alice());
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = TokenKeys::from_secret(b"other")
            .issue(&alice(), Duration::hours(1))
            .unwrap();
        let keys = TokenKeys::from_secret(b"test-secret");
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let keys = TokenKeys::from_secret(b"test-secret");
        let token = keys.issue(&alice(), Duration::hours(-2)).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
