//! HTTP implementation of the identity backend.
//!
//! JSON over HTTP with a service bearer token. The wire shapes here are
//! this client's own contract with the backend gateway; they are not part
//! of the flow engine's API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use login_model::{
    AuthRequest, AuthenticationMethodType, IdentityProvider, IdpLink, LoginPolicy, Organization,
    Session, UserAccount,
};

use crate::backend::{
    CreatedSession, IdentityBackend, SessionBinding, SessionChecks, SessionPatch, UserQuery,
};
use crate::error::{BackendError, BackendResult};

/// Header carrying the session bearer token on session reads/updates.
const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Identity backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    service_token: String,
}

impl HttpBackend {
    /// Creates a backend client.
    ///
    /// ## Errors
    ///
    /// Returns [`BackendError::InvalidResponse`] if `base_url` is not a
    /// valid URL.
    pub fn new(base_url: &str, service_token: impl Into<String>) -> BackendResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::InvalidResponse(format!("invalid base url: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            service_token: service_token.into(),
        })
    }

    fn url(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidResponse(format!("invalid url path {path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> BackendResult<T> {
        let response = request
            .bearer_auth(&self.service_token)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn send_no_content(&self, request: reqwest::RequestBuilder) -> BackendResult<()> {
        let response = request
            .bearer_auth(&self.service_token)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, body));
        }
        Ok(())
    }
}

fn error_for_status(status: StatusCode, body: String) -> BackendError {
    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(body),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            BackendError::FailedPrecondition(body)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::PermissionDenied(body),
        s if s.is_server_error() => BackendError::Unavailable(format!("{s}: {body}")),
        s => BackendError::Internal(format!("{s}: {body}")),
    }
}

#[derive(Deserialize)]
struct ListUsersResponse {
    result: Vec<UserAccount>,
}

#[derive(Deserialize)]
struct GetSessionResponse {
    session: Session,
}

#[derive(Deserialize)]
struct ListSessionsResponse {
    sessions: Vec<Session>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListSessionsRequest<'a> {
    session_ids: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMethodsResponse {
    auth_method_types: Vec<AuthenticationMethodType>,
}

#[derive(Deserialize)]
struct ListOrgsResponse {
    result: Vec<Organization>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListIdpsResponse {
    identity_providers: Vec<IdentityProvider>,
}

#[derive(Deserialize)]
struct ListIdpLinksResponse {
    result: Vec<IdpLink>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartIdpFlowRequest<'a> {
    idp_id: &'a str,
    success_url: &'a str,
    failure_url: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartIdpFlowResponse {
    auth_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequestResponse {
    auth_request: AuthRequest,
}

#[derive(Serialize)]
struct CreateCallbackRequest<'a> {
    session: &'a SessionBinding,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCallbackResponse {
    callback_url: String,
}

#[async_trait]
impl IdentityBackend for HttpBackend {
    async fn list_users(&self, query: &UserQuery) -> BackendResult<Vec<UserAccount>> {
        let url = self.url("v1/users/_search")?;
        let response: ListUsersResponse = self.send(self.http.post(url).json(query)).await?;
        Ok(response.result)
    }

    async fn get_user_by_id(&self, user_id: &str) -> BackendResult<UserAccount> {
        let url = self.url(&format!("v1/users/{user_id}"))?;
        self.send(self.http.get(url)).await
    }

    async fn create_session(&self, checks: &SessionChecks) -> BackendResult<CreatedSession> {
        let url = self.url("v1/sessions")?;
        self.send(self.http.post(url).json(checks)).await
    }

    async fn set_session(
        &self,
        session_id: &str,
        token: &str,
        checks: &SessionChecks,
    ) -> BackendResult<SessionPatch> {
        let url = self.url(&format!("v1/sessions/{session_id}"))?;
        self.send(
            self.http
                .patch(url)
                .header(SESSION_TOKEN_HEADER, token)
                .json(checks),
        )
        .await
    }

    async fn get_session(&self, session_id: &str, token: &str) -> BackendResult<Session> {
        let url = self.url(&format!("v1/sessions/{session_id}"))?;
        let response: GetSessionResponse = self
            .send(self.http.get(url).header(SESSION_TOKEN_HEADER, token))
            .await?;
        Ok(response.session)
    }

    async fn delete_session(&self, session_id: &str, token: &str) -> BackendResult<()> {
        let url = self.url(&format!("v1/sessions/{session_id}"))?;
        self.send_no_content(self.http.delete(url).header(SESSION_TOKEN_HEADER, token))
            .await
    }

    async fn list_sessions(&self, ids: &[String]) -> BackendResult<Vec<Session>> {
        let url = self.url("v1/sessions/_search")?;
        let body = ListSessionsRequest { session_ids: ids };
        let response: ListSessionsResponse = self.send(self.http.post(url).json(&body)).await?;
        Ok(response.sessions)
    }

    async fn list_authentication_methods(
        &self,
        user_id: &str,
    ) -> BackendResult<Vec<AuthenticationMethodType>> {
        let url = self.url(&format!("v1/users/{user_id}/authentication_methods"))?;
        let response: ListMethodsResponse = self.send(self.http.get(url)).await?;
        Ok(response.auth_method_types)
    }

    async fn get_login_policy(&self, organization_id: Option<&str>) -> BackendResult<LoginPolicy> {
        let mut url = self.url("v1/settings/login")?;
        if let Some(org) = organization_id {
            url.query_pairs_mut().append_pair("organization", org);
        }
        self.send(self.http.get(url)).await
    }

    async fn get_orgs_by_domain(&self, domain: &str) -> BackendResult<Vec<Organization>> {
        let mut url = self.url("v1/organizations")?;
        url.query_pairs_mut().append_pair("domain", domain);
        let response: ListOrgsResponse = self.send(self.http.get(url)).await?;
        Ok(response.result)
    }

    async fn get_default_organization(&self) -> BackendResult<Organization> {
        let url = self.url("v1/organizations/default")?;
        self.send(self.http.get(url)).await
    }

    async fn list_active_idps(
        &self,
        organization_id: Option<&str>,
    ) -> BackendResult<Vec<IdentityProvider>> {
        let mut url = self.url("v1/idps")?;
        if let Some(org) = organization_id {
            url.query_pairs_mut().append_pair("organization", org);
        }
        let response: ListIdpsResponse = self.send(self.http.get(url)).await?;
        Ok(response.identity_providers)
    }

    async fn list_idp_links(&self, user_id: &str) -> BackendResult<Vec<IdpLink>> {
        let url = self.url(&format!("v1/users/{user_id}/idp_links"))?;
        let response: ListIdpLinksResponse = self.send(self.http.get(url)).await?;
        Ok(response.result)
    }

    async fn get_idp_by_id(&self, idp_id: &str) -> BackendResult<IdentityProvider> {
        let url = self.url(&format!("v1/idps/{idp_id}"))?;
        self.send(self.http.get(url)).await
    }

    async fn start_idp_flow(
        &self,
        idp_id: &str,
        success_url: &str,
        failure_url: &str,
    ) -> BackendResult<String> {
        let url = self.url("v1/idp_intents")?;
        let body = StartIdpFlowRequest {
            idp_id,
            success_url,
            failure_url,
        };
        let response: StartIdpFlowResponse = self.send(self.http.post(url).json(&body)).await?;
        Ok(response.auth_url)
    }

    async fn get_auth_request(&self, request_id: &str) -> BackendResult<AuthRequest> {
        let url = self.url(&format!("v1/auth_requests/{request_id}"))?;
        let response: AuthRequestResponse = self.send(self.http.get(url)).await?;
        Ok(response.auth_request)
    }

    async fn create_callback(
        &self,
        request_id: &str,
        binding: &SessionBinding,
    ) -> BackendResult<String> {
        let url = self.url(&format!("v1/auth_requests/{request_id}/callback"))?;
        let body = CreateCallbackRequest { session: binding };
        let response: CreateCallbackResponse = self.send(self.http.post(url).json(&body)).await?;
        Ok(response.callback_url)
    }
}
