mod permission_gate;

pub use permission_gate::{Operation, authorize};

use std::collections::HashSet;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use membership_core::domain::value_objects::permissions::{
    Permission, PermissionProfile, StaffRole, resolve,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::config_loader;

fn default_profile() -> PermissionProfile {
    PermissionProfile::RoleDefault
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StaffClaims {
    pub sub: String,
    pub role: StaffRole,
    #[serde(default = "default_profile")]
    pub profile: PermissionProfile,
    pub exp: usize,
}

/// An authenticated staff member and the permissions resolved for this request.
#[derive(Debug, Clone)]
pub struct AuthStaff {
    pub staff_id: Uuid,
    pub role: StaffRole,
    pub permissions: HashSet<Permission>,
}

impl AuthStaff {
    pub fn from_claims(claims: StaffClaims) -> Result<Self, AuthError> {
        let staff_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError(anyhow::anyhow!("Invalid staff ID in token")))?;

        Ok(Self {
            staff_id,
            role: claims.role,
            permissions: resolve(claims.role, &claims.profile),
        })
    }
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn validate_staff_jwt(token: &str, secret: &str) -> Result<StaffClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<StaffClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthStaff
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "Missing or malformed Authorization header".to_string(),
                    )
                })?;

        let staff_auth = config_loader::get_staff_auth().map_err(|err| {
            warn!(error = %err, "auth: staff JWT secret is not configured");
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        })?;

        let claims = validate_staff_jwt(bearer.token(), &staff_auth.jwt_secret)
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

        AuthStaff::from_claims(claims).map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))
    }
}
