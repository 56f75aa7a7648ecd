//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Identifiable;
use crate::error::{DomainError, DomainResult};

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    /// Lookup key. Uniqueness is a convention, not a schema constraint.
    pub email: String,
    pub name: String,
    /// Optimistic-locking counter (not yet compared at write time)
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for User {
    fn id(&self) -> i32 {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    /// User email address
    pub email: String,
    /// User display name
    pub name: String,
}

impl CreateUser {
    /// Normalize the payload: trim surrounding whitespace and lowercase the
    /// email so lookups stay case-insensitive.
    pub fn normalized(self) -> DomainResult<CreateUser> {
        let email = self.email.trim().to_lowercase();
        let name = self.name.trim().to_string();

        if email.is_empty() {
            return Err(DomainError::validation("Email cannot be empty"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("Name cannot be empty"));
        }

        Ok(CreateUser { email, name })
    }
}

/// User response (shape returned to clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: i32,
    /// User email address
    pub email: String,
    /// User display name
    pub name: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn identifiable_exposes_id_and_version() {
        let user = sample_user();
        assert_eq!(user.id(), 7);
        assert_eq!(user.version(), 3);
    }

    #[test]
    fn normalized_trims_and_lowercases_email() {
        let input = CreateUser {
            email: "  Jane@Example.COM ".to_string(),
            name: " Jane ".to_string(),
        };

        let normalized = input.normalized().unwrap();
        assert_eq!(normalized.email, "jane@example.com");
        assert_eq!(normalized.name, "Jane");
    }

    #[test]
    fn normalized_rejects_blank_fields() {
        let blank_email = CreateUser {
            email: "   ".to_string(),
            name: "Jane".to_string(),
        };
        assert!(matches!(
            blank_email.normalized(),
            Err(DomainError::Validation(_))
        ));

        let blank_name = CreateUser {
            email: "jane@example.com".to_string(),
            name: "".to_string(),
        };
        assert!(matches!(
            blank_name.normalized(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn response_drops_internal_fields() {
        let user = sample_user();
        let response = UserResponse::from(&user);
        assert_eq!(response.id, user.id);
        assert_eq!(response.email, user.email);
    }
}
