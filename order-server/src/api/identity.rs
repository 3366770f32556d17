//! Header-derived request identity
//!
//! The upstream gateway authenticates callers and forwards the internal
//! identity headers; handlers consume them through the [`Identity`]
//! extractor and check roles with a typed set-membership test.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shared::models::{Role, RoleSet};

use crate::common::AppError;

pub const USER_ID_HEADER: &str = "x-internal-user-id";
pub const ROLES_HEADER: &str = "x-internal-user-roles";
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Caller identity forwarded by the gateway.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub roles: RoleSet,
}

impl Identity {
    /// Reject the request unless the caller carries `role`.
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.roles.contains(role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("{role} role required")))
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or(AppError::Unauthorized)?;

        let roles = parts
            .headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(RoleSet::parse)
            .unwrap_or_default();

        Ok(Identity { user_id, roles })
    }
}

/// Idempotency token for order placement.
#[derive(Debug, Clone)]
pub struct IdempotencyKey(pub String);

impl<S> FromRequestParts<S> for IdempotencyKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(IDEMPOTENCY_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| IdempotencyKey(v.to_string()))
            .ok_or_else(|| AppError::validation("Idempotency-Key header is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract_identity(request: Request<()>) -> Result<Identity, AppError> {
        let (mut parts, _) = request.into_parts();
        Identity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_identity_from_headers() {
        let request = Request::builder()
            .header("X-Internal-User-Id", "7")
            .header("X-Internal-User-Roles", "CUSTOMER,ADMIN")
            .body(())
            .unwrap();

        let identity = extract_identity(request).await.unwrap();
        assert_eq!(identity.user_id, 7);
        assert!(identity.require(Role::Customer).is_ok());
        assert!(identity.require(Role::Admin).is_ok());
        assert!(matches!(
            identity.require(Role::Restaurant),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_user_id_is_unauthorized() {
        let request = Request::builder()
            .header("X-Internal-User-Roles", "CUSTOMER")
            .body(())
            .unwrap();

        let result = extract_identity(request).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_non_numeric_user_id_is_unauthorized() {
        let request = Request::builder()
            .header("X-Internal-User-Id", "bob")
            .body(())
            .unwrap();

        let result = extract_identity(request).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_missing_roles_header_means_no_roles() {
        let request = Request::builder()
            .header("X-Internal-User-Id", "7")
            .body(())
            .unwrap();

        let identity = extract_identity(request).await.unwrap();
        assert!(identity.roles.is_empty());
    }

    #[tokio::test]
    async fn test_idempotency_key_extraction() {
        let request = Request::builder()
            .header("Idempotency-Key", " token-1 ")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let key = IdempotencyKey::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(key.0, "token-1");

        let request = Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let result = IdempotencyKey::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
