//! Authentication route handlers.
//!
//! Email/password sign-in against Firebase Auth. On success the user's id and
//! email go into the session; the Firebase id token is not kept.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthSession;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: Option<String>,
}

// =============================================================================
// Route Handlers
// =============================================================================

async fn sign_in(session: &Session, auth: AuthSession) -> Result<CurrentUser> {
    let user = CurrentUser {
        id: auth.user_id,
        email: auth.email,
    };
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User signed in");
    Ok(user)
}

/// Sign in with email and password.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<CurrentUser>> {
    let auth = state
        .auth()
        .login_with_password(&form.email, &form.password)
        .await?;
    sign_in(&session, auth).await.map(Json)
}

/// Create an account and sign in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    if form
        .password_confirm
        .as_ref()
        .is_some_and(|confirm| *confirm != form.password)
    {
        return Err(AppError::BadRequest("Passwords do not match".to_owned()));
    }

    let auth = state
        .auth()
        .register_with_password(&form.email, &form.password)
        .await?;
    let user = sign_in(&session, auth).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign out. The cart and saved address stay in the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
