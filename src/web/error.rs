use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::routes::SubscribeError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),

    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Subscribe(SubscribeError::Body(rejection)) => {
                (rejection.status(), InvalidInput(rejection.body_text()))
            }
            Error::Subscribe(SubscribeError::DataParsing(data_er)) => {
                (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string()))
            }
            Error::Subscribe(SubscribeError::MissingSubscriberId) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SubscriberNotCreated)
            }
            Error::Subscribe(SubscribeError::MailingList(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SubscribeFailed)
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
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

/// The errors the client gets to see, their `Display` is the `message` of the JSON body.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Received invalid input: {_0}")]
    InvalidInput(String),
    #[display("Error creating subscriber")]
    SubscriberNotCreated,
    #[display("Failed to subscribe. Please try again.")]
    SubscribeFailed,
    #[display("Service Error!")]
    ServiceError,
}
