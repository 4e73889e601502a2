use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{instrument, warn};

use crate::auth::jwt::AuthUser;
use crate::error::{parse_body, ApiError, FieldError};
use crate::state::AppState;
use crate::users::dto::{PublicUser, UpdateUserRequest, UserEnvelope, UsersEnvelope};
use crate::users::policy::{self, Action};
use crate::users::repo::{Role, User};
use crate::users::service;

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users)).route(
        "/users/:id",
        get(get_user).put(update_user).delete(delete_user),
    )
}

/// Path ids are parsed by hand so a non-numeric id comes back as the same
/// structured validation envelope as a bad body.
fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        ApiError::Validation(vec![FieldError {
            field: "id",
            message: "id must be an integer".into(),
        }])
    })
}

#[instrument(skip(state, _claims))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<UsersEnvelope>, ApiError> {
    let users = service::get_all(&state.db).await?;
    Ok(Json(UsersEnvelope {
        message: "Users retrieved successfully",
        users: users.into_iter().map(PublicUser::from).collect(),
    }))
}

#[instrument(skip(state, claims), fields(actor = claims.sub))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let id = parse_user_id(&id)?;
    if !policy::permits(claims.role, claims.sub, id, Action::Read) {
        return Err(ApiError::Forbidden("Not allowed to view this user"));
    }
    let user = service::get_by_id(&state.db, id).await?;
    Ok(Json(UserEnvelope {
        message: "User retrieved successfully",
        user: user.into(),
    }))
}

#[instrument(skip(state, claims, body), fields(actor = claims.sub))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let id = parse_user_id(&id)?;
    let req: UpdateUserRequest = parse_body(body)?;
    let changes = req.validate().map_err(ApiError::Validation)?;

    // A payload touching the role is gated as a role change even when other
    // fields ride along.
    let action = if changes.role.is_some() {
        Action::UpdateRole
    } else {
        Action::UpdateProfile
    };
    if !policy::permits(claims.role, claims.sub, id, action) {
        warn!(actor = claims.sub, target_id = id, ?action, "update denied");
        return Err(ApiError::Forbidden("Not allowed to update this user"));
    }

    let user = service::update(&state.db, id, changes).await?;
    Ok(Json(UserEnvelope {
        message: "User updated successfully",
        user: user.into(),
    }))
}

#[instrument(skip(state, claims), fields(actor = claims.sub))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let id = parse_user_id(&id)?;
    if !policy::permits(claims.role, claims.sub, id, Action::Delete) {
        warn!(actor = claims.sub, target_id = id, "delete denied");
        return Err(ApiError::Forbidden("Not allowed to delete this user"));
    }

    // Known gap, kept on purpose: the last admin deleting their own account
    // is warned about but not stopped.
    if claims.role == Role::Admin && claims.sub == id {
        if let Ok(admins) = User::count_admins(&state.db).await {
            if admins <= 1 {
                warn!(
                    actor = claims.sub,
                    "last remaining admin is deleting their own account"
                );
            }
        }
    }

    let user = service::delete(&state.db, id).await?;
    Ok(Json(UserEnvelope {
        message: "User deleted successfully",
        user: user.into(),
    }))
}
