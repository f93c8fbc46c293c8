//! Authentication route handlers.
//!
//! Login starts a server session whose cookie is the refresh credential and
//! returns a short-lived access token. Refresh trades the cookie for a new
//! token and rotates the session id.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use shopzify_core::api::{AccessTokenResponse, LoginRequest, MessageResponse, SignupRequest};

use crate::error::{AppJson, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Register a new account.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    AuthService::new(state.repos().users.as_ref())
        .register_with_password(&body.name, &body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Log in with email and password.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<AccessTokenResponse>> {
    let user = AuthService::new(state.repos().users.as_ref())
        .login_with_password(&body.email, &body.password)
        .await?;

    // New id on privilege change
    session.cycle_id().await.map_err(AuthError::from)?;
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(AuthError::from)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    let access_token = state.tokens().issue(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(AccessTokenResponse { access_token }))
}

/// Issue a new access token from the session cookie.
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AccessTokenResponse>> {
    let current = current_user(&session)
        .await
        .map_err(AuthError::from)?
        .ok_or(AuthError::NoSession)?;

    let user = match AuthService::new(state.repos().users.as_ref())
        .session_user(current.id)
        .await
    {
        Ok(user) => user,
        Err(AuthError::NoSession) => {
            session.flush().await.map_err(AuthError::from)?;
            return Err(AuthError::NoSession.into());
        }
        Err(e) => return Err(e.into()),
    };

    session.cycle_id().await.map_err(AuthError::from)?;
    let access_token = state.tokens().issue(user.id)?;
    tracing::debug!(user_id = %user.id, "Access token refreshed");
    Ok(Json(AccessTokenResponse { access_token }))
}

/// End the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    session.flush().await.map_err(AuthError::from)?;
    clear_sentry_user();
    Ok(Json(MessageResponse::new("Logged out successfully")))
}
