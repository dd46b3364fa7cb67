//! HMAC-signed JWT issuance and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub const SECRET_ENV: &str = "JWT_SECRET";
pub const ISSUER_ENV: &str = "JWT_ISSUER";
pub const BEARER_PREFIX: &str = "Bearer ";

pub const DEFAULT_ACCESS_TTL_HOURS: i64 = 24;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("token not provided")]
    NotProvided,
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                JwtError::UnsupportedAlgorithm
            }
            _ => JwtError::Invalid,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Vec<u8>,
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: Vec::new(),
            issuer: String::new(),
            access_ttl: Duration::hours(DEFAULT_ACCESS_TTL_HOURS),
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }
}

impl JwtConfig {
    pub fn new(secret: impl AsRef<[u8]>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            issuer: issuer.into(),
            ..Self::default()
        }
    }

    /// Reads `JWT_SECRET` and `JWT_ISSUER`; unset variables become empty.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(SECRET_ENV).unwrap_or_default(),
            std::env::var(ISSUER_ENV).unwrap_or_default(),
        )
    }
}

/// Standard claims; every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role: role.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Immutable once built; share it behind an `Arc` across tasks.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("access_ttl", &self.config.access_ttl)
            .field("refresh_ttl", &self.config.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            config,
            validation,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Signs the claims exactly as given, with HS256.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(JwtError::from)
    }

    /// Access token carries the full claims; the refresh token only the user id.
    pub fn generate_token_pair(&self, claims: &Claims) -> Result<TokenPair, JwtError> {
        let mut access = claims.clone();
        access.registered = RegisteredClaims {
            sub: claims.registered.sub.clone(),
            jti: claims.registered.jti.clone(),
            ..self.stamped(self.config.access_ttl, None)
        };

        let refresh = Claims {
            user_id: claims.user_id.clone(),
            registered: self.stamped(self.config.refresh_ttl, Some(claims.user_id.clone())),
            ..Claims::default()
        };

        Ok(TokenPair {
            access_token: self.generate_token(&access)?,
            refresh_token: self.generate_token(&refresh)?,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        if token.is_empty() {
            return Err(JwtError::NotProvided);
        }
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            debug!(error = %err, "jwt rejected");
            JwtError::from(err)
        })?;
        Ok(data.claims)
    }

    /// Issues a new access token from a valid refresh token.
    pub fn refresh_token(&self, refresh_token: &str) -> Result<String, JwtError> {
        let refresh = self.validate_token(refresh_token)?;
        let access = Claims {
            registered: self.stamped(self.config.access_ttl, Some(refresh.user_id.clone())),
            user_id: refresh.user_id,
            username: refresh.username,
            role: refresh.role,
            extra_data: refresh.extra_data,
        };
        self.generate_token(&access)
    }

    pub fn extract_token_from_header(&self, header: &str) -> Result<String, JwtError> {
        extract_bearer(header).map(str::to_string)
    }

    fn stamped(&self, ttl: Duration, subject: Option<String>) -> RegisteredClaims {
        let now = Utc::now();
        RegisteredClaims {
            iss: Some(self.config.issuer.clone()).filter(|iss| !iss.is_empty()),
            sub: subject,
            exp: Some((now + ttl).timestamp()),
            nbf: Some(now.timestamp()),
            iat: Some(now.timestamp()),
            jti: None,
        }
    }
}

/// Token from an `Authorization: Bearer <token>` value.
pub fn extract_bearer(header: &str) -> Result<&str, JwtError> {
    if header.is_empty() {
        return Err(JwtError::NotProvided);
    }
    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(JwtError::Invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret", "base-components"))
    }

    fn claims() -> Claims {
        let mut claims = Claims::new("u-1", "alice", "admin");
        claims.extra_data = json!({"plan": "pro"}).as_object().cloned();
        claims
    }

    #[test]
    fn token_pair_round_trip() {
        let svc = service();
        let pair = svc.generate_token_pair(&claims()).unwrap();

        let access = svc.validate_token(&pair.access_token).unwrap();
        assert_eq!(access.user_id, "u-1");
        assert_eq!(access.username, "alice");
        assert_eq!(access.role, "admin");
        assert_eq!(access.registered.iss.as_deref(), Some("base-components"));
        assert_eq!(access.extra_data.unwrap()["plan"], "pro");

        let refresh = svc.validate_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.user_id, "u-1");
        assert!(refresh.username.is_empty());
        assert_eq!(refresh.registered.sub.as_deref(), Some("u-1"));

        let ttl = refresh.registered.exp.unwrap() - refresh.registered.iat.unwrap();
        assert_eq!(ttl, Duration::days(7).num_seconds());
    }

    #[test]
    fn refresh_issues_access_token() {
        let svc = service();
        let mut source = claims();
        source.registered.exp = Some((Utc::now() + Duration::hours(1)).timestamp());
        let token = svc.generate_token(&source).unwrap();

        let access = svc.refresh_token(&token).unwrap();
        let decoded = svc.validate_token(&access).unwrap();
        assert_eq!(decoded.user_id, "u-1");
        assert_eq!(decoded.role, "admin");
        assert_eq!(decoded.registered.sub.as_deref(), Some("u-1"));
        assert!(decoded.extra_data.is_some());
    }

    #[test]
    fn generated_claims_validate_unchanged() {
        let svc = service();
        let now = Utc::now();
        let mut source = claims();
        source.registered = RegisteredClaims {
            iss: Some("base-components".to_string()),
            sub: Some("u-1".to_string()),
            exp: Some((now + Duration::hours(1)).timestamp()),
            nbf: Some(now.timestamp()),
            iat: Some(now.timestamp()),
            jti: Some("jti-1".to_string()),
        };

        let token = svc.generate_token(&source).unwrap();
        assert_eq!(svc.validate_token(&token).unwrap(), source);
    }

    #[test]
    fn pair_refresh_token_yields_access_token() {
        let svc = service();
        let pair = svc.generate_token_pair(&claims()).unwrap();

        let access = svc.refresh_token(&pair.refresh_token).unwrap();
        let decoded = svc.validate_token(&access).unwrap();
        assert_eq!(decoded.user_id, "u-1");
        assert_eq!(decoded.registered.sub.as_deref(), Some("u-1"));
        assert_eq!(decoded.registered.iss.as_deref(), Some("base-components"));

        let ttl = decoded.registered.exp.unwrap() - decoded.registered.iat.unwrap();
        assert_eq!(ttl, Duration::hours(24).num_seconds());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let mut expired = claims();
        expired.registered.exp = Some((Utc::now() - Duration::minutes(5)).timestamp());
        let token = svc.generate_token(&expired).unwrap();
        assert_eq!(svc.validate_token(&token), Err(JwtError::Expired));
    }

    #[test]
    fn token_without_expiry_is_accepted() {
        let svc = service();
        let token = svc.generate_token(&claims()).unwrap();
        assert_eq!(svc.validate_token(&token).unwrap().user_id, "u-1");
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = JwtService::new(JwtConfig::new("other", ""))
            .generate_token(&claims())
            .unwrap();
        assert_eq!(service().validate_token(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn garbage_and_empty_tokens() {
        let svc = service();
        assert_eq!(svc.validate_token(""), Err(JwtError::NotProvided));
        assert_eq!(svc.validate_token("not-a-jwt"), Err(JwtError::Invalid));
        assert_eq!(svc.refresh_token(""), Err(JwtError::NotProvided));
    }

    #[test]
    fn bearer_extraction() {
        let svc = service();
        assert_eq!(svc.extract_token_from_header("Bearer abc.def"), Ok("abc.def".to_string()));
        assert_eq!(svc.extract_token_from_header(""), Err(JwtError::NotProvided));
        assert_eq!(svc.extract_token_from_header("Bearer "), Err(JwtError::Invalid));
        assert_eq!(svc.extract_token_from_header("Basic abc"), Err(JwtError::Invalid));
    }

    #[test]
    fn default_lifetimes() {
        let config = JwtConfig::default();
        assert_eq!(config.access_ttl, Duration::hours(24));
        assert_eq!(config.refresh_ttl, Duration::days(7));
    }
}
