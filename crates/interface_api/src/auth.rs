//! Bearer-token authentication
//!
//! Tokens are stateless JWTs carrying the caller's identity and role list.
//! The `sub` claim doubles as the `created_by` value stamped on documents.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity, recorded as `created_by` on new documents
    pub sub: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Signs a token for `user_id` valid for `ttl_secs` from now.
pub fn issue_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verifies the signature and expiry, returning the claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}

/// The `admin` role implies every permission.
pub fn has_permission(claims: &Claims, permission: &str) -> bool {
    claims
        .roles
        .iter()
        .any(|r| r == permission || r == "admin")
}

/// Permission strings carried in the token's role list
pub mod permissions {
    pub const SHIPMENT_READ: &str = "shipment:read";
    pub const SHIPMENT_WRITE: &str = "shipment:write";
    pub const SHIPMENT_REPAIR: &str = "shipment:repair";
    pub const CUSTOMER_READ: &str = "customer:read";
    pub const CUSTOMER_WRITE: &str = "customer:write";
    pub const VOUCHER_READ: &str = "voucher:read";
    pub const VOUCHER_WRITE: &str = "voucher:write";
    pub const TRIP_READ: &str = "trip:read";
    pub const TRIP_WRITE: &str = "trip:write";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = issue_token(
            "clerk-1",
            vec![permissions::SHIPMENT_WRITE.to_string()],
            "secret",
            60,
        )
        .unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "clerk-1");
        assert!(has_permission(&claims, permissions::SHIPMENT_WRITE));
        assert!(!has_permission(&claims, permissions::TRIP_WRITE));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token("clerk-1", vec![], "secret", 60).unwrap();
        assert!(matches!(
            verify_token(&token, "other"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_admin_implies_every_permission() {
        let token = issue_token("boss", vec!["admin".to_string()], "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert!(has_permission(&claims, permissions::SHIPMENT_REPAIR));
        assert!(has_permission(&claims, permissions::TRIP_WRITE));
    }
}
