//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Client errors become a JSON
//! `{message, subMessage?}` body with a 4xx status. Server faults are logged,
//! captured to Sentry and answered with a generic message.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use shopzify_core::api::ErrorBody;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::services::wishlist::WishlistError;

/// Message sent for every server fault.
pub const SERVER_FAULT_MESSAGE: &str = "Something went wrong";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Wishlist error: {0}")]
    Wishlist(#[from] WishlistError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected access token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How an error is presented to the client.
enum Reply {
    Client {
        status: StatusCode,
        message: String,
        sub_message: Option<String>,
    },
    Fault,
}

impl Reply {
    fn client(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Client {
            status,
            message: message.into(),
            sub_message: None,
        }
    }
}

impl AppError {
    fn reply(&self) -> Reply {
        match self {
            Self::Database(_) | Self::Internal(_) => Reply::Fault,
            Self::Auth(err) => auth_reply(err),
            Self::Catalog(err) => match err {
                CatalogError::NotFound => Reply::client(StatusCode::NOT_FOUND, err.to_string()),
                CatalogError::Validation(msg) => Reply::client(StatusCode::BAD_REQUEST, msg.clone()),
                CatalogError::Repository(_) => Reply::Fault,
            },
            Self::Wishlist(err) => match err {
                WishlistError::UserNotFound
                | WishlistError::ProductNotFound
                | WishlistError::WishlistNotFound => {
                    Reply::client(StatusCode::NOT_FOUND, err.to_string())
                }
                WishlistError::MissingProductId => {
                    Reply::client(StatusCode::BAD_REQUEST, err.to_string())
                }
                WishlistError::Conflict => Reply::client(StatusCode::CONFLICT, err.to_string()),
                WishlistError::Repository(_) => Reply::Fault,
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound | CartError::NotInCart => {
                    Reply::client(StatusCode::NOT_FOUND, err.to_string())
                }
                CartError::InsufficientStock { .. } | CartError::InvalidQuantity => {
                    Reply::client(StatusCode::BAD_REQUEST, err.to_string())
                }
                CartError::Conflict => Reply::client(StatusCode::CONFLICT, err.to_string()),
                CartError::Repository(_) => Reply::Fault,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => Reply::client(StatusCode::BAD_REQUEST, err.to_string()),
                CheckoutError::IncompleteAddress(fields) => Reply::Client {
                    status: StatusCode::BAD_REQUEST,
                    message: "Please complete the shipping address".to_owned(),
                    sub_message: Some(format!("Missing: {}", fields.join(", "))),
                },
                CheckoutError::Conflict => Reply::client(StatusCode::CONFLICT, err.to_string()),
                CheckoutError::Repository(_) => Reply::Fault,
            },
            Self::NotFound(msg) => Reply::client(StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => Reply::client(StatusCode::UNAUTHORIZED, msg.clone()),
            Self::BadRequest(msg) => Reply::client(StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

fn auth_reply(err: &AuthError) -> Reply {
    match err {
        AuthError::InvalidEmail(e) => Reply::Client {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid email address".to_owned(),
            sub_message: Some(e.to_string()),
        },
        AuthError::WeakPassword(e) => Reply::client(StatusCode::BAD_REQUEST, e.to_string()),
        AuthError::MissingName => Reply::client(StatusCode::BAD_REQUEST, "Name is required"),
        AuthError::InvalidCredentials => {
            Reply::client(StatusCode::UNAUTHORIZED, "Invalid email or password")
        }
        AuthError::UserAlreadyExists => Reply::client(
            StatusCode::CONFLICT,
            "An account with this email already exists",
        ),
        AuthError::NoSession => {
            Reply::client(StatusCode::UNAUTHORIZED, "Session expired, please log in again")
        }
        AuthError::InvalidToken(_) => Reply::client(StatusCode::UNAUTHORIZED, "Unauthorized"),
        AuthError::TokenSigning(_)
        | AuthError::Session(_)
        | AuthError::Repository(_)
        | AuthError::PasswordHash => Reply::Fault,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.reply() {
            Reply::Client {
                status,
                message,
                sub_message,
            } => {
                tracing::debug!(error = %self, %status, "Request rejected");
                let body = ErrorBody {
                    message,
                    sub_message,
                };
                (status, Json(body)).into_response()
            }
            Reply::Fault => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                let body = ErrorBody {
                    message: SERVER_FAULT_MESSAGE.to_owned(),
                    sub_message: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor that rejects with an [`AppError`] body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor that rejects with an [`AppError`] body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string extractor that rejects with an [`AppError`] body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
