use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::users::repo::{Role, User};

/// Outcomes the handlers translate to HTTP statuses: NotFound -> 404,
/// EmailTaken -> 409, Database -> 500.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("email already in use")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update, already validated and normalized by the DTO layer.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(d) if d.code().as_deref() == Some("23505")
    )
}

pub async fn create(db: &PgPool, new: NewUser) -> Result<User, UserError> {
    User::insert(db, &new.name, &new.email, &new.password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                UserError::EmailTaken
            } else {
                e.into()
            }
        })
}

pub async fn get_all(db: &PgPool) -> Result<Vec<User>, UserError> {
    Ok(User::list(db).await?)
}

pub async fn get_by_id(db: &PgPool, id: i64) -> Result<User, UserError> {
    User::find_by_id(db, id).await?.ok_or(UserError::NotFound)
}

/// Re-reads the current row, rejects an email change that collides with a
/// different row, merges the provided fields and writes the result back.
/// The pre-check gives the friendly 409; the unique index is the arbiter
/// when two writers race past it, and the loser is reported the same way.
pub async fn update(db: &PgPool, id: i64, changes: UserChanges) -> Result<User, UserError> {
    let current = User::find_by_id(db, id).await?.ok_or(UserError::NotFound)?;

    if let Some(email) = &changes.email {
        if *email != current.email {
            if let Some(other) = User::find_by_email(db, email).await? {
                if other.id != id {
                    debug!(target_id = id, other_id = other.id, "email collision on update");
                    return Err(UserError::EmailTaken);
                }
            }
        }
    }

    let name = changes.name.unwrap_or(current.name);
    let email = changes.email.unwrap_or(current.email);
    let role = changes.role.unwrap_or(current.role);

    let updated = User::update(db, id, &name, &email, role).await.map_err(|e| {
        if is_unique_violation(&e) {
            UserError::EmailTaken
        } else {
            UserError::from(e)
        }
    })?;

    // The row existed a moment ago; a concurrent delete can still win.
    updated.ok_or(UserError::NotFound)
}

pub async fn delete(db: &PgPool, id: i64) -> Result<User, UserError> {
    User::delete(db, id).await?.ok_or(UserError::NotFound)
}
