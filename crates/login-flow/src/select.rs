//! Session selection.

use login_client::IdentityBackend;
use login_model::{AuthRequest, Session};

use crate::error::FlowResult;
use crate::validity::is_session_valid;

/// Picks the session that best satisfies an authorization request.
///
/// Sessions are filtered by the request's hint (a user-id hint wins over
/// a login-name hint; no hint keeps everything), sorted by change date
/// descending with ties keeping their original order, and the first one
/// that passes [`is_session_valid`] wins. A newer invalid session never
/// shadows an older valid one.
///
/// ## Errors
///
/// Propagates backend failures from the validity checks.
pub async fn select_valid_session(
    backend: &dyn IdentityBackend,
    sessions: &[Session],
    request: &AuthRequest,
) -> FlowResult<Option<Session>> {
    let mut candidates: Vec<&Session> = sessions
        .iter()
        .filter(|session| match (&request.hint_user_id, &request.login_hint) {
            (Some(user_id), _) => session.user().is_some_and(|u| &u.id == user_id),
            (None, Some(login_hint)) => {
                session.user().is_some_and(|u| &u.login_name == login_hint)
            }
            (None, None) => true,
        })
        .collect();

    if candidates.is_empty() {
        return Ok(None);
    }

    candidates.sort_by(|a, b| b.change_date.cmp(&a.change_date));

    for candidate in candidates {
        if is_session_valid(backend, candidate).await? {
            return Ok(Some(candidate.clone()));
        }
    }

    Ok(None)
}
