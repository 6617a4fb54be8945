//! HTTP request handlers.

use super::extract::FormOrJson;
use super::middleware::SessionId;
use super::types::{ContactForm, HealthResponse, LoginForm, RegisterForm, VerifyForm};
use super::AppState;
use crate::error::PortalError;
use crate::html;
use crate::workflow::{LoginOutcome, VerifyOutcome};
use axum::{
    extract::State,
    response::{Html, Redirect},
    Extension, Json,
};
use record_store::Collection;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, PortalError> {
    let records = state.portal.records();

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        users: records.count(Collection::Users).await?,
        contacts: records.count(Collection::Contacts).await?,
        active_sessions: state.sessions.active_count().await,
    }))
}

/// Start a registration and send the visitor to the code entry page.
pub async fn register(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    FormOrJson(form): FormOrJson<RegisterForm>,
) -> Redirect {
    state.portal.register(&session_id, form.into_user()).await;
    Redirect::to("/otp.html")
}

/// Confirm a registration with the emailed code.
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    FormOrJson(form): FormOrJson<VerifyForm>,
) -> Result<Html<String>, PortalError> {
    let page = match state.portal.verify(&session_id, &form.otp).await? {
        VerifyOutcome::Verified(_) => html::registration_complete(),
        VerifyOutcome::Rejected => html::invalid_otp(),
        VerifyOutcome::SessionExpired => html::session_expired(),
    };

    Ok(Html(page))
}

/// Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Result<Html<String>, PortalError> {
    let page = match state
        .portal
        .login(&session_id, &form.email, &form.password)
        .await?
    {
        LoginOutcome::Success(user) => html::login_success(&user.name),
        LoginOutcome::InvalidCredentials => html::invalid_credentials(),
    };

    Ok(Html(page))
}

/// Store a contact message.
pub async fn contact(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<ContactForm>,
) -> Result<Html<String>, PortalError> {
    state
        .portal
        .submit_contact(form.name, form.email, form.message)
        .await?;

    Ok(Html(html::contact_received()))
}
