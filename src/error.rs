use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::users::service::UserError;

/// One entry in the `details` list of a validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Request-level error taxonomy. Every handler failure path funnels through
/// here so the wire shape stays `{error, details?}` with the right status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => ApiError::NotFound("User not found"),
            UserError::EmailTaken => ApiError::Conflict("Email already in use"),
            UserError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.to_string(), None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string(), None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string(), None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.to_string(), None),
            ApiError::Internal(e) => {
                // Runs inside the handler's span, so actor/target/operation
                // context from #[instrument] fields lands on this event.
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };
        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

/// Deserialize a JSON body into a typed request, reporting mismatches as a
/// structured validation failure instead of a framework rejection.
pub fn parse_body<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::Validation(vec![FieldError {
            field: "body",
            message: e.to_string(),
        }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn validation_error_carries_details() {
        let err = ApiError::Validation(vec![FieldError {
            field: "email",
            message: "invalid email".into(),
        }]);
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn statuses_match_taxonomy() {
        let cases = [
            (ApiError::Unauthenticated("no"), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("no"), StatusCode::FORBIDDEN),
            (ApiError::NotFound("no"), StatusCode::NOT_FOUND),
            (ApiError::Conflict("no"), StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn internal_error_hides_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused on 5432"));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn user_error_mapping() {
        assert_eq!(
            ApiError::from(UserError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UserError::EmailTaken)
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn parse_body_reports_shape_mismatch() {
        #[derive(serde::Deserialize, Debug)]
        struct Req {
            #[allow(dead_code)]
            name: String,
        }
        let err = parse_body::<Req>(serde_json::json!({ "name": 42 })).unwrap_err();
        match err {
            ApiError::Validation(details) => assert_eq!(details[0].field, "body"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
