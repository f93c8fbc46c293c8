//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

use shopzify_core::api::ErrorBody;

/// Message shown when the server gave no usable one.
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error {status}: {}", .body.message)]
    Api { status: StatusCode, body: ErrorBody },

    /// Input rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Response or request body was not the expected JSON.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status, for server answers.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Message and optional detail suitable for showing to a user.
    #[must_use]
    pub fn user_message(&self) -> (String, Option<String>) {
        match self {
            Self::Api { body, .. } if !body.message.is_empty() => {
                (body.message.clone(), body.sub_message.clone())
            }
            Self::Validation(message) if !message.is_empty() => (message.clone(), None),
            _ => (FALLBACK_MESSAGE.to_owned(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_body() {
        let err = ClientError::Api {
            status: StatusCode::CONFLICT,
            body: ErrorBody {
                message: "Wishlist was modified concurrently".to_owned(),
                sub_message: Some("try again".to_owned()),
            },
        };
        assert_eq!(
            err.user_message(),
            (
                "Wishlist was modified concurrently".to_owned(),
                Some("try again".to_owned())
            )
        );

        let empty = ClientError::Api {
            status: StatusCode::BAD_GATEWAY,
            body: ErrorBody::default(),
        };
        assert_eq!(empty.user_message().0, FALLBACK_MESSAGE);
        assert_eq!(
            ClientError::Validation("Email is invalid".to_owned()).user_message().0,
            "Email is invalid"
        );
    }
}
