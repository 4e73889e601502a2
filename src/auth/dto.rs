use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::FieldError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for POST /signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    /// Assumes name and email were already trimmed/lowercased by the caller.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.chars().count() < 2 || self.name.chars().count() > 255 {
            errors.push(FieldError {
                field: "name",
                message: "name must be between 2 and 255 characters".into(),
            });
        }
        if self.email.len() > 255 || !is_valid_email(&self.email) {
            errors.push(FieldError {
                field: "email",
                message: "email must be a valid address of at most 255 characters".into(),
            });
        }
        if self.password.len() < 8 {
            errors.push(FieldError {
                field: "password",
                message: "password must be at least 8 characters".into(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request body for POST /signin.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if !is_valid_email(&self.email) {
            errors.push(FieldError {
                field: "email",
                message: "email must be a valid address".into(),
            });
        }
        if self.password.is_empty() {
            errors.push(FieldError {
                field: "password",
                message: "password is required".into(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
