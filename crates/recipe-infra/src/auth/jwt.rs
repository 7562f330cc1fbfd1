//! Locally signed ID tokens for federated sign-in without a hosted identity provider.
//!
//! A development consent screen issues these tokens and the in-memory auth
//! provider verifies them, mirroring how a real provider hands the app an ID
//! token that the identity backend then checks.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use recipe_core::ports::{AuthError, IdTokenClaims, IdTokenVerifier};

const DEFAULT_SECRET: &str = "local-id-token-secret";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_minutes: 60,
            issuer: "recipe-plus-dev-idp".to_string(),
            audience: "recipe-plus".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

/// HS256 ID token issuer and verifier.
pub struct JwtIdTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtIdTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let secret = std::env::var("ID_TOKEN_SECRET").unwrap_or(defaults.secret);

        if secret == DEFAULT_SECRET {
            tracing::warn!("Using default ID token secret. Set ID_TOKEN_SECRET to change it.");
        }

        Self::new(JwtConfig {
            secret,
            expiration_minutes: std::env::var("ID_TOKEN_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_minutes),
            issuer: std::env::var("ID_TOKEN_ISSUER").unwrap_or(defaults.issuer),
            audience: defaults.audience,
        })
    }

    pub fn issue(&self, subject: &str, email: Option<&str>) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl IdTokenVerifier for JwtIdTokenService {
    fn verify(&self, token: &str) -> Result<IdTokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(IdTokenClaims {
            subject: token_data.claims.sub,
            email: token_data.claims.email,
            exp: token_data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            ..JwtConfig::default()
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let service = JwtIdTokenService::new(test_config());

        let token = service.issue("google-123", Some("cook@example.com")).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.subject, "google-123");
        assert_eq!(claims.email.as_deref(), Some("cook@example.com"));
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_token_without_email() {
        let service = JwtIdTokenService::new(test_config());

        let token = service.issue("google-456", None).unwrap();
        assert!(service.verify(&token).unwrap().email.is_none());
    }

    #[test]
    fn test_verify_garbage() {
        let service = JwtIdTokenService::new(test_config());

        assert!(matches!(
            service.verify("invalid-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_verify_rejects_other_issuer() {
        let issuer = JwtIdTokenService::new(JwtConfig {
            issuer: "someone-else".to_string(),
            ..test_config()
        });
        let verifier = JwtIdTokenService::new(test_config());

        let token = issuer.issue("google-789", None).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtIdTokenService::new(JwtConfig {
            expiration_minutes: -10,
            ..test_config()
        });

        let token = service.issue("google-1", None).unwrap();
        assert!(matches!(service.verify(&token), Err(AuthError::TokenExpired)));
    }
}
