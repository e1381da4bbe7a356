use async_trait::async_trait;
use serde::Serialize;
use warp::{
    http::{Method, StatusCode},
    hyper::body::Bytes,
    reply::Response,
    Reply,
};

use crate::{
    error::FieldErrors,
    form::{Form, FormData},
    permissions::{Action, Resource},
    rejection::ApiError,
    schema::Uuid,
    session::SessionData,
};

/// One authenticated call routed to a viewset.
pub struct ViewRequest {
    pub method: Method,
    pub action: Action,
    pub session: SessionData,
    pub pk: Option<Uuid>,
    pub body: Bytes,
}

impl ViewRequest {
    pub fn pk(&self) -> Result<Uuid, ApiError> {
        self.pk.ok_or(ApiError::NotFound)
    }

    /// Parses the body as a JSON object. An empty body is an empty form.
    pub fn form(&self) -> Result<Form, ApiError> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Form::from_data(FormData::new()));
        }

        let value: serde_json::Value = serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::BadRequest(format!("JSON parse error - {e}")))?;

        match value {
            serde_json::Value::Object(map) => Ok(Form::from_data(map.into_iter().collect())),
            _ => {
                let mut errors = FieldErrors::new();
                errors.insert(
                    String::from("non_field_errors"),
                    serde_json::json!(["Invalid data. Expected a dictionary."]),
                );
                Err(ApiError::Validation(errors))
            }
        }
    }
}

#[async_trait]
pub trait ViewSet: Send + Sync {
    fn resource(&self) -> Resource;

    async fn dispatch(&self, request: ViewRequest) -> Result<Response, ApiError>;
}

pub fn respond<T: Serialize>(status: StatusCode, body: &T) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

pub fn no_content() -> Response {
    warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response()
}
