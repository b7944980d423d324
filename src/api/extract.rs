//! Request extractors whose rejections use the service's error shape.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::SwapperError;

/// JSON request body. Malformed or mistyped bodies become
/// [`SwapperError::InvalidRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(SwapperError))]
pub struct ApiJson<T>(pub T);

/// Path parameters. Unparsable ids become [`SwapperError::InvalidRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(SwapperError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for SwapperError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for SwapperError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}
