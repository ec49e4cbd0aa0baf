//! Request payloads of the `web` module and the validated types built from them.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable signup request.
/// Can be deserialized but the email hasn't been validated yet.
#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub email: String,
}

impl TryFrom<SubscribeBody> for ValidEmail {
    type Error = DataParsingError;

    fn try_from(body: SubscribeBody) -> Result<Self, Self::Error> {
        ValidEmail::parse(body.email)
    }
}

/// Validated Subscriber Email
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// Surrounding whitespace is dropped before validation.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        if value.validate_email() {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

/// JSON body of every response on the `/api` routes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email invalid")]
    EmailInvalid,
    #[error("email too long")]
    EmailTooLong,
}
