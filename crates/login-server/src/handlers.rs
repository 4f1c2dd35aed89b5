//! Flow orchestration handlers.
//!
//! Every handler produces either an HTTP redirect (the next step of the
//! flow) or a JSON error body; page rendering happens elsewhere.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use login_client::{BackendError, SessionChecks, UserSearchKey};
use login_flow::{FlowError, FlowOutcome, LoginNameCommand};

use crate::state::AppState;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error description.
    pub error: String,
}

/// JSON body for a completed login with no pending request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInBody {
    /// The session that satisfied the login.
    pub session_id: String,
    /// Login name of the signed-in user.
    pub login_name: Option<String>,
}

/// Query parameters of the flow entry point.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Pending OIDC authorization request id.
    #[serde(rename = "authRequest")]
    pub auth_request: Option<String>,
    /// Pending SAML request id.
    #[serde(rename = "samlRequest")]
    pub saml_request: Option<String>,
    /// Session to finalize with, e.g. from the account picker.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Form data for a submitted login name.
#[derive(Debug, Deserialize)]
pub struct LoginNameForm {
    /// The typed identifier.
    #[serde(rename = "loginName")]
    pub login_name: String,
    /// Organization constraint.
    pub organization: Option<String>,
    /// Pending authorization request id.
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
}

/// Form data for a password check.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    /// Login name the session was established with.
    #[serde(rename = "loginName")]
    pub login_name: String,
    /// The password to verify.
    pub password: String,
    /// Organization constraint.
    pub organization: Option<String>,
    /// Pending authorization request id.
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
}

/// Form data for a logout.
#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    /// Session to terminate.
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Flow entry point: resolves a pending authorization request against
/// the browser's sessions.
pub async fn login_entry(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let Some(request_id) = query.auth_request.or(query.saml_request) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "no authorization request provided",
        );
    };

    let resolver = state.flow_resolver();
    let outcome = FlowOutcome::from_result(
        resolver
            .resolve(&request_id, query.session_id.as_deref())
            .await,
    );
    outcome_response(outcome)
}

/// Resolves a submitted login name to the next step.
pub async fn submit_login_name(
    State(state): State<AppState>,
    Form(form): Form<LoginNameForm>,
) -> Response {
    let mut command = LoginNameCommand::new(form.login_name);
    if let Some(organization) = form.organization {
        command = command.with_organization(organization);
    }
    if let Some(request_id) = form.request_id {
        command = command.with_auth_request_id(request_id);
    }

    let resolver = state.flow_resolver();
    let outcome = FlowOutcome::from_result(resolver.send_login_name(&command).await);
    outcome_response(outcome)
}

/// Verifies a password against the user's session, then continues the
/// flow (MFA gate, callback, or done).
pub async fn submit_password(
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Response {
    let Ok(mut record) = state
        .store
        .find_by_login_name(&form.login_name, form.organization.as_deref())
    else {
        return flow_error_response(&FlowError::SessionNotFound);
    };

    let checks = SessionChecks::for_user(UserSearchKey::LoginName(form.login_name.clone()))
        .with_password(form.password);
    let patch = match state
        .backend
        .set_session(&record.id, &record.token, &checks)
        .await
    {
        Ok(patch) => patch,
        Err(err) => return backend_error_response(&err),
    };

    record.token = patch.token;
    record.change_date = patch.change_date;
    state.store.insert(record.clone());

    let session = match state.backend.get_session(&record.id, &record.token).await {
        Ok(session) => session,
        Err(err) => return backend_error_response(&err),
    };

    let resolver = state.flow_resolver();
    let outcome = FlowOutcome::from_result(
        resolver
            .continue_after_check(
                &session,
                form.organization.as_deref(),
                form.request_id.as_deref(),
            )
            .await,
    );
    outcome_response(outcome)
}

/// Terminates a session and drops its cookie record.
pub async fn logout(State(state): State<AppState>, Form(form): Form<LogoutForm>) -> Response {
    let Ok(record) = state.store.get(&form.session_id) else {
        return flow_error_response(&FlowError::SessionNotFound);
    };

    if let Err(err) = state.backend.delete_session(&record.id, &record.token).await {
        // The backend may already have dropped the session; the record
        // is removed either way.
        if !err.is_not_found() {
            return backend_error_response(&err);
        }
    }
    state.store.remove(&record.id);

    StatusCode::NO_CONTENT.into_response()
}

fn outcome_response(outcome: FlowOutcome) -> Response {
    match outcome {
        FlowOutcome::Redirect(url) => Redirect::to(&url).into_response(),
        FlowOutcome::Completed(session) => Json(SignedInBody {
            session_id: session.id.clone(),
            login_name: session.user().map(|u| u.login_name.clone()),
        })
        .into_response(),
        FlowOutcome::Error(err) => flow_error_response(&err),
    }
}

fn flow_error_response(err: &FlowError) -> Response {
    let status = match err {
        FlowError::UserNotFound | FlowError::SessionNotFound => StatusCode::NOT_FOUND,
        FlowError::AmbiguousUser
        | FlowError::UnsupportedState
        | FlowError::NoActiveSession => StatusCode::BAD_REQUEST,
        FlowError::PolicyDenied(_) => StatusCode::FORBIDDEN,
        FlowError::Backend(backend) => return backend_error_response(backend),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "flow resolution failed");
    } else {
        tracing::debug!(error = %err, "flow resolution rejected");
    }
    error_response(status, &err.to_string())
}

fn backend_error_response(err: &BackendError) -> Response {
    let status = match err {
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::PermissionDenied(_) => StatusCode::UNAUTHORIZED,
        BackendError::FailedPrecondition(_) => StatusCode::CONFLICT,
        BackendError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        BackendError::InvalidResponse(_) | BackendError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "backend call failed");
    }
    error_response(status, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
