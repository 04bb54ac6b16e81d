//! Authentication middleware and the authenticated-user extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::AppState;
use crate::response::ApiError;
use backoffice_core::auth::UserRole;
use backoffice_shared::{Claims, JwtError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Validates the bearer token and stores its claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized("Authorization header with Bearer token is required")
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => ApiError::unauthorized("Token has expired").into_response(),
        Err(_) => ApiError::unauthorized("Invalid or malformed token").into_response(),
    }
}

/// Authenticated caller: user, home branch and parsed role.
#[derive(Debug, Clone)]
pub struct AuthUser {
    claims: Claims,
    role: UserRole,
}

impl AuthUser {
    /// Builds the caller from verified claims.
    ///
    /// # Errors
    ///
    /// Returns 403 for a role this service does not know.
    pub fn from_claims(claims: Claims) -> Result<Self, ApiError> {
        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| ApiError::forbidden(format!("Unknown role '{}'", claims.role)))?;
        Ok(Self { claims, role })
    }

    /// Returns the user ID.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.claims.user_id()
    }

    /// Returns the caller's own branch.
    #[must_use]
    pub const fn branch_id(&self) -> Uuid {
        self.claims.branch_id()
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Fails with 403 unless `allowed` accepts the caller's role.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error naming the action.
    pub fn require(&self, allowed: fn(&UserRole) -> bool, action: &str) -> Result<(), ApiError> {
        if allowed(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Role '{}' cannot {action}",
                self.role.as_str()
            )))
        }
    }

    /// Resolves the branch filter for a read.
    ///
    /// Admin and finance may pass any branch or none (all branches);
    /// everyone else is pinned to their own branch.
    ///
    /// # Errors
    ///
    /// Returns 403 when a branch-bound user asks for another branch.
    pub fn branch_scope(&self, requested: Option<Uuid>) -> Result<Option<Uuid>, ApiError> {
        if self.role.sees_all_branches() {
            return Ok(requested);
        }
        match requested {
            Some(branch) if branch != self.branch_id() => {
                Err(ApiError::forbidden("Access to other branches is not allowed"))
            }
            _ => Ok(Some(self.branch_id())),
        }
    }

    /// Checks that a loaded resource belongs to a branch the caller may see.
    ///
    /// # Errors
    ///
    /// Returns 403 for another branch's resource.
    pub fn ensure_branch(&self, branch_id: Uuid) -> Result<(), ApiError> {
        self.branch_scope(Some(branch_id)).map(|_| ())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        Self::from_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(role: &str) -> AuthUser {
        let claims = Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            role,
            Utc::now() + Duration::minutes(5),
        );
        AuthUser::from_claims(claims).unwrap()
    }

    #[test]
    fn test_bearer_prefix() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let claims = Claims::new(Uuid::nil(), Uuid::nil(), "owner", Utc::now());
        let err = AuthUser::from_claims(claims).unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }

    #[test]
    fn test_cashier_pinned_to_own_branch() {
        let cashier = user("cashier");
        assert_eq!(cashier.branch_scope(None).unwrap(), Some(cashier.branch_id()));
        assert!(cashier.branch_scope(Some(Uuid::new_v4())).is_err());
        assert!(cashier.ensure_branch(cashier.branch_id()).is_ok());
    }

    #[test]
    fn test_finance_sees_all_branches() {
        let finance = user("finance");
        let other = Uuid::new_v4();
        assert_eq!(finance.branch_scope(None).unwrap(), None);
        assert_eq!(finance.branch_scope(Some(other)).unwrap(), Some(other));
    }

    #[test]
    fn test_require_role() {
        assert!(user("manager").require(UserRole::can_manage_floats, "manage floats").is_ok());
        let err = user("cashier")
            .require(UserRole::can_manage_floats, "manage floats")
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }
}
