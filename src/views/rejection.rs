use std::convert::Infallible;

use serde_json::json;
use thiserror::Error;
use warp::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    reject::{self, Rejection},
    reply::Response,
    Reply,
};

use crate::{
    constants::AUTH_HEADER_KEYWORD,
    error::{FieldErrors, QueryError},
};

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Not found.")]
    NotFound,

    #[error("Method \"{0}\" not allowed.")]
    MethodNotAllowed(String),

    #[error("Invalid input")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl reject::Reject for ApiError {}

impl From<QueryError> for ApiError {
    fn from(value: QueryError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl ApiError {
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), json!([message]));
        ApiError::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::Internal(info) => {
                log::error!("{info}");
                json!({ "detail": "A server error occurred." })
            }
            other => json!({ "detail": other.to_string() }),
        };

        let mut response = warp::reply::with_status(warp::reply::json(&body), status).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_HEADER_KEYWORD));
        }

        response
    }
}

/// Turns every rejection that escapes the route tree into a JSON error.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let error = if let Some(e) = err.find::<ApiError>() {
        e.clone()
    } else if err.is_not_found() {
        ApiError::NotFound
    } else if err.find::<reject::InvalidHeader>().is_some() {
        ApiError::Unauthorized(String::from(
            "Invalid token header. Token string should not contain invalid characters.",
        ))
    } else {
        ApiError::Internal(format!("Unhandled rejection: {err:?}"))
    };

    Ok(error.into_response())
}
