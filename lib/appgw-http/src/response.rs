//! JSON responses for descriptors and classified errors

use appgw_core::{AppError, ErrorKind};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

const CONTENT_TYPE_JSON: &str = "application/json";

/// Body of every error response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: String,
}

/// Status code reported for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::WrongInput => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Serialize `body` as JSON with the given status
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let payload = match serde_json::to_vec(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "encode failed");
            Vec::new()
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(payload)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    response
}

/// ErrorHandler renders one error code/message pair
#[derive(Clone, Debug)]
pub struct ErrorHandler {
    pub code: StatusCode,
    pub message: String,
}

impl ErrorHandler {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn response(&self) -> Response<Full<Bytes>> {
        let body = ErrorResponse {
            code: self.code.as_u16(),
            error: self.message.clone(),
        };
        json_response(self.code, &body)
    }
}

impl From<&AppError> for ErrorHandler {
    fn from(err: &AppError) -> Self {
        Self::new(status_for(err.kind()), err.message())
    }
}
