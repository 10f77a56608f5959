use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::ErrorResponse;

pub const ADMIN_ROLE: &str = "admin";
pub const CUSTOMER_ROLE: &str = "customer";

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (customer or staff identifier)
    pub sub: String,
    /// Role granted to the token ("admin" or "customer")
    pub role: String,
    /// JWT ID
    pub jti: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// Authenticated principal extracted from a JWT or API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub role: String,
    pub is_api_key: bool,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Insufficient permissions")]
    Forbidden,
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
            request_id: crate::tracing::current_request_id().map(|r| r.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub token_expiration: Duration,
    /// Hex-encoded SHA-256 digest of the admin API key
    pub admin_api_key_hash: Option<String>,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        issuer: String,
        token_expiration: Duration,
        admin_api_key_hash: Option<String>,
    ) -> Self {
        Self {
            jwt_secret,
            issuer,
            token_expiration,
            admin_api_key_hash,
        }
    }
}

/// Token issuance and validation
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Issue a signed token for a subject with the given role.
    pub fn issue_token(&self, subject: &str, role: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role: role.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::from_std(self.config.token_expiration)
                .unwrap_or_else(|_| chrono::Duration::seconds(3600)))
            .timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|_| AuthError::InvalidToken)
    }

    /// Validate a bearer token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// Validate an admin API key against the configured digest.
    pub fn validate_api_key(&self, api_key: &str) -> Result<(), AuthError> {
        let expected = self
            .config
            .admin_api_key_hash
            .as_deref()
            .ok_or(AuthError::InvalidApiKey)?;

        let digest = hex::encode(Sha256::digest(api_key.as_bytes()));
        if digest.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}

/// Authentication middleware: resolves the caller from headers and stashes
/// an `AuthenticatedUser` in the request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth(&request, &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth(request: &Request, auth_service: &AuthService) -> Result<AuthenticatedUser, AuthError> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_value) = auth_header.to_str() {
            if let Some(token) = auth_value.strip_prefix("Bearer ") {
                let claims = auth_service.validate_token(token.trim())?;
                return Ok(AuthenticatedUser {
                    subject: claims.sub,
                    role: claims.role,
                    is_api_key: false,
                });
            }
        }
    }

    if let Some(api_key_header) = request.headers().get("X-API-Key") {
        if let Ok(api_key) = api_key_header.to_str() {
            auth_service.validate_api_key(api_key)?;
            // The configured API key is an operator credential.
            return Ok(AuthenticatedUser {
                subject: "api-key".to_string(),
                role: ADMIN_ROLE.to_string(),
                is_api_key: true,
            });
        }
    }

    Err(AuthError::MissingAuth)
}

/// Role check middleware; runs after `auth_middleware`.
pub async fn role_middleware(
    State(required_role): State<String>,
    request: Request,
    next: Next,
) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.has_role(&required_role) => next.run(request).await,
        Some(_) => AuthError::Forbidden.into_response(),
        None => AuthError::MissingAuth.into_response(),
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extension methods for Router to gate routes behind auth
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: &str) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: &str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            role.to_string(),
            role_middleware,
        ))
        .with_auth()
    }
}
