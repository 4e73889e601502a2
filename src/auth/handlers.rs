use axum::extract::{FromRef, State};
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, instrument, warn};

use crate::auth::dto::{SigninRequest, SignupRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::{cookie, password};
use crate::error::{parse_body, ApiError};
use crate::state::AppState;
use crate::users::dto::{StatusMessage, UserEnvelope};
use crate::users::repo::User;
use crate::users::service::{self, NewUser};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}

#[instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut req: SignupRequest = parse_body(body)?;
    req.name = req.name.trim().to_string();
    req.email = req.email.trim().to_lowercase();
    req.validate().map_err(ApiError::Validation)?;

    let existing = User::find_by_email(&state.db, &req.email)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    if existing.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered"));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = service::create(
        &state.db,
        NewUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;
    info!(user_id = user.id, email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(
            header::SET_COOKIE,
            cookie::session_cookie(&token, keys.ttl.as_secs()),
        )]),
        Json(UserEnvelope {
            message: "User registered successfully",
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn signin(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut req: SigninRequest = parse_body(body)?;
    req.email = req.email.trim().to_lowercase();
    req.validate().map_err(ApiError::Validation)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .ok_or_else(|| {
            warn!(email = %req.email, "signin with unknown email");
            ApiError::Unauthenticated("Invalid credentials")
        })?;

    let ok = password::verify_password(&req.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = user.id, "signin with invalid password");
        return Err(ApiError::Unauthenticated("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;
    info!(user_id = user.id, email = %user.email, "user signed in");

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            cookie::session_cookie(&token, keys.ttl.as_secs()),
        )]),
        Json(UserEnvelope {
            message: "Signed in successfully",
            user: user.into(),
        }),
    ))
}

/// Stateless sign-out: the token is never stored, so clearing the cookie is
/// the whole operation.
#[instrument]
pub async fn signout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, cookie::clear_cookie())]),
        Json(StatusMessage {
            message: "Signed out successfully",
        }),
    )
}
