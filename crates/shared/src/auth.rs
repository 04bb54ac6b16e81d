//! JWT claims carried by every authenticated request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Branch the user is attached to.
    pub branch: Uuid,
    /// User's role (`admin`, `finance`, `manager`, `operations`, `cashier`).
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, branch_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            branch: branch_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the branch ID from claims.
    #[must_use]
    pub const fn branch_id(&self) -> Uuid {
        self.branch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn claims_sets_expiration_and_iat() {
        let user = Uuid::new_v4();
        let branch = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::minutes(30);
        let before = Utc::now().timestamp();
        let claims = Claims::new(user, branch, "cashier", expires_at);
        let after = Utc::now().timestamp();

        assert_eq!(claims.user_id(), user);
        assert_eq!(claims.branch_id(), branch);
        assert_eq!(claims.role, "cashier");
        assert!(claims.iat >= before && claims.iat <= after);
        assert_eq!(claims.exp, expires_at.timestamp());
    }
}
