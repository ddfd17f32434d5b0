use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::collector::SubmitError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("submit error: {0}")]
    Submit(#[from] SubmitError),
    #[error("json body rejected: {0}")]
    JsonBody(#[from] JsonRejection),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Submit(er @ (SubmitError::MissingField | SubmitError::Validation(_))) => {
                (StatusCode::BAD_REQUEST, InvalidInput(er.to_string()))
            }
            Error::Submit(SubmitError::Internal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
            Error::JsonBody(_) => (StatusCode::BAD_REQUEST, InvalidBody),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client gets to see. The display text is the `message` of the response body.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(String),
    #[display("Invalid request body.")]
    InvalidBody,
    #[display("Server Error. Please try again later.")]
    ServiceError,
}
