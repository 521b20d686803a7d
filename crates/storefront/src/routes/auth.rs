//! Authentication route handlers.
//!
//! Login, logout and registration over the process-wide session store, plus
//! a Server-Sent Events feed of session changes.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Redirect, Sse,
        sse::{Event, KeepAlive},
    },
};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tienda_core::Role;

use crate::error::{AppJson, Result, clear_sentry_user, set_sentry_user};
use crate::models::{Session, UserProfile};
use crate::services::{AuthError, Registration, RegistrationService};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Session snapshot as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub is_authenticated: bool,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub current_user: Option<UserProfile>,
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            is_authenticated: session.is_authenticated(),
            display_name: session.display_name().map(str::to_string),
            role: session.role(),
            current_user: session.user().map(UserProfile::from),
            logged_in_at: session.logged_in_at(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Log in and return the new session.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<SessionView>> {
    if !state.session().login(&request.email, &request.password).await {
        return Err(AuthError::InvalidCredentials.into());
    }

    let session = state.session().session();
    if let Some(user) = session.user() {
        set_sentry_user(&user.id, Some(user.email.as_str()));
    }
    Ok(Json(SessionView::from(&session)))
}

/// Log out and redirect to the login view.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Redirect {
    let next = state.session().logout();
    clear_sentry_user();
    Redirect::to(next.path())
}

/// Current session snapshot.
pub async fn session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView::from(&state.session().session()))
}

/// Stream of session changes, starting with the current session.
#[instrument(skip(state))]
pub async fn session_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let changes = state.session().session_changes().into_stream();
    let events = changes.map(|session| Ok(session_event(&session)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn session_event(session: &Session) -> Event {
    let event = Event::default().event("session");
    match serde_json::to_string(&SessionView::from(session)) {
        Ok(json) => event.data(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize session event");
            event.data("{}")
        }
    }
}

/// Register a new user.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(form): AppJson<Registration>,
) -> Result<impl IntoResponse> {
    let user = RegistrationService::new(state.session())
        .register(form)
        .await?;

    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}
