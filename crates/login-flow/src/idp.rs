//! Identity provider redirect construction.

use login_client::IdentityBackend;
use login_model::IdentityProvider;

use crate::error::FlowResult;
use crate::outcome::FlowOutcome;

/// Starts a federated login at the backend and returns the redirect to
/// the provider's authorization URL.
///
/// The success and failure return URLs point back at this service's
/// `/idp/<slug>/success` and `/idp/<slug>/failure` endpoints, carrying
/// the pending request id and organization so the flow can resume.
pub(crate) async fn start_idp_redirect(
    backend: &dyn IdentityBackend,
    base_url: &str,
    idp: &IdentityProvider,
    request_id: Option<&str>,
    organization: Option<&str>,
) -> FlowResult<FlowOutcome> {
    let query = {
        let mut params = url::form_urlencoded::Serializer::new(String::new());
        if let Some(request_id) = request_id {
            params.append_pair("requestId", request_id);
        }
        if let Some(organization) = organization {
            params.append_pair("organization", organization);
        }
        params.finish()
    };

    let slug = idp.kind.slug();
    let success_url = format!("{base_url}/idp/{slug}/success?{query}");
    let failure_url = format!("{base_url}/idp/{slug}/failure?{query}");

    let auth_url = backend
        .start_idp_flow(&idp.id, &success_url, &failure_url)
        .await?;
    Ok(FlowOutcome::Redirect(auth_url))
}
