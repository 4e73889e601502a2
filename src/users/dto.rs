use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::dto::is_valid_email;
use crate::error::FieldError;
use crate::users::repo::{Role, User};
use crate::users::service::UserChanges;

/// Public projection of a user record: everything except the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Body of PUT /users/:id. Role arrives as a plain string so an unknown
/// value surfaces as a field error rather than a body-level rejection.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserChanges, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.is_none() && self.email.is_none() && self.role.is_none() {
            return Err(vec![FieldError {
                field: "body",
                message: "at least one of name, email or role is required".into(),
            }]);
        }

        let name = self.name.map(|n| n.trim().to_string());
        if let Some(name) = &name {
            if name.chars().count() < 2 || name.chars().count() > 255 {
                errors.push(FieldError {
                    field: "name",
                    message: "name must be between 2 and 255 characters".into(),
                });
            }
        }

        let email = self.email.map(|e| e.trim().to_lowercase());
        if let Some(email) = &email {
            if email.len() > 255 || !is_valid_email(email) {
                errors.push(FieldError {
                    field: "email",
                    message: "email must be a valid address of at most 255 characters".into(),
                });
            }
        }

        let role = match self.role.as_deref() {
            Some(raw) => match Role::parse(raw) {
                Some(role) => Some(role),
                None => {
                    errors.push(FieldError {
                        field: "role",
                        message: "role must be either \"user\" or \"admin\"".into(),
                    });
                    None
                }
            },
            None => None,
        };

        if errors.is_empty() {
            Ok(UserChanges { name, email, role })
        } else {
            Err(errors)
        }
    }
}

/// Success envelopes: `{message, ...payload}`.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UsersEnvelope {
    pub message: &'static str,
    pub users: Vec<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: Option<&str>, email: Option<&str>, role: Option<&str>) -> UpdateUserRequest {
        UpdateUserRequest {
            name: name.map(String::from),
            email: email.map(String::from),
            role: role.map(String::from),
        }
    }

    #[test]
    fn empty_update_is_rejected() {
        let errors = req(None, None, None).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
    }

    #[test]
    fn valid_partial_update_passes_through() {
        let changes = req(Some("  Jane Doe "), None, None).validate().unwrap();
        assert_eq!(changes.name.as_deref(), Some("Jane Doe"));
        assert!(changes.email.is_none());
        assert!(changes.role.is_none());
    }

    #[test]
    fn email_is_normalized_to_lowercase() {
        let changes = req(None, Some(" Jane@X.Com "), None).validate().unwrap();
        assert_eq!(changes.email.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn short_name_and_bad_email_collect_field_errors() {
        let errors = req(Some("J"), Some("not-an-email"), None)
            .validate()
            .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn unknown_role_is_a_field_error() {
        let errors = req(None, None, Some("superuser")).validate().unwrap_err();
        assert_eq!(errors[0].field, "role");
    }

    #[test]
    fn known_roles_parse() {
        let changes = req(None, None, Some("admin")).validate().unwrap();
        assert_eq!(changes.role, Some(Role::Admin));
    }

    #[test]
    fn public_user_hides_password_and_uses_camel_case() {
        let now = OffsetDateTime::now_utc();
        let public = PublicUser::from(User {
            id: 1,
            name: "Jane".into(),
            email: "jane@x.com".into(),
            password_hash: "argon2-secret".into(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        });
        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("createdAt"));
        assert!(json.contains("updatedAt"));
        assert!(json.contains(r#""role":"user""#));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2-secret"));
    }
}
