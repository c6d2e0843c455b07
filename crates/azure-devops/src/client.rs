//! Azure DevOps HTTP client.
//!
//! Authenticates with a personal access token (basic auth, empty user name)
//! and implements [`DevOpsSession`] over the Git REST endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use audit::{
    AccessToken, AuditError, DevOpsSession, OrganizationUrl, Page, PullRequest,
    PullRequestStatus, Repository, RepositoryId,
};

use crate::models::{ConnectionData, GitPullRequest, GitRepository, ListResponse};

/// REST API version sent with every Git request.
pub const API_VERSION: &str = "5.1";

/// An authenticated session against one Azure DevOps organization.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    client: Client,
    organization_url: OrganizationUrl,
    token: AccessToken,
}

impl AzureDevOpsClient {
    /// Build a client and validate the credentials with one request to
    /// `_apis/connectionData`.
    ///
    /// # Errors
    ///
    /// [`AuditError::AuthenticationFailure`] when the service rejects the
    /// token, [`AuditError::TransportFailure`] for anything else.
    pub async fn connect(
        organization_url: OrganizationUrl,
        token: AccessToken,
    ) -> Result<Self, AuditError> {
        info!("Connecting to Azure DevOps Org...");

        let client = Client::builder()
            .build()
            .map_err(|e| AuditError::transport(format!("Failed to build HTTP client: {e}")))?;
        let session = Self {
            client,
            organization_url,
            token,
        };

        let data: ConnectionData = session.get("/_apis/connectionData", &[]).await?;
        let user = data
            .authenticated_user
            .and_then(|u| u.provider_display_name)
            .unwrap_or_default();
        debug!(user = %user, organization = %session.organization_url, "Authenticated");

        Ok(session)
    }

    /// Absolute URL for an API path under the organization.
    fn api_url(&self, path: &str) -> String {
        api_url(self.organization_url.as_str(), path)
    }

    /// Issue an authenticated GET and decode the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AuditError> {
        let url = self.api_url(path);
        debug!(url = %url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .basic_auth("", Some(self.token.expose()))
            .query(query)
            .send()
            .await
            .map_err(|e| AuditError::transport(format!("Request to {path} failed: {e}")))?;

        handle_response(response, path).await
    }
}

#[async_trait]
impl DevOpsSession for AzureDevOpsClient {
    async fn list_repositories(&self) -> Result<Vec<Repository>, AuditError> {
        let list: ListResponse<GitRepository> = self
            .get(
                "/_apis/git/repositories",
                &[("api-version", API_VERSION.to_string())],
            )
            .await?;

        Ok(list
            .value
            .into_iter()
            .filter_map(GitRepository::into_domain)
            .collect())
    }

    async fn list_pull_requests(
        &self,
        repository: &RepositoryId,
        status: PullRequestStatus,
        page: Page,
    ) -> Result<Vec<PullRequest>, AuditError> {
        let path = format!("/_apis/git/repositories/{repository}/pullrequests");
        let list: ListResponse<GitPullRequest> = self
            .get(&path, &pull_request_query(status, page))
            .await?;

        Ok(list.value.into_iter().map(PullRequest::from).collect())
    }
}

/// Join an organization URL and an API path with exactly one slash.
fn api_url(organization_url: &str, path: &str) -> String {
    format!("{}{}", organization_url.trim_end_matches('/'), path)
}

/// Query string for one page of pull requests.
fn pull_request_query(status: PullRequestStatus, page: Page) -> Vec<(&'static str, String)> {
    vec![
        ("searchCriteria.status", status.as_query_value().to_string()),
        ("$top", page.top.to_string()),
        ("$skip", page.skip.to_string()),
        ("api-version", API_VERSION.to_string()),
    ]
}

/// Map a status code that is not a usable JSON response to an error.
///
/// Azure DevOps answers an anonymous or invalid credential on some routes
/// with `203 Non-Authoritative Information` and an HTML sign-in page instead
/// of `401`, so 203 counts as an authentication failure.
fn classify_status(status: StatusCode, endpoint: &str) -> Option<AuditError> {
    match status {
        StatusCode::NON_AUTHORITATIVE_INFORMATION => Some(AuditError::authentication(
            "The service returned a sign-in page; check the access token",
        )),
        StatusCode::UNAUTHORIZED => Some(AuditError::authentication(
            "Access token is invalid or expired",
        )),
        StatusCode::FORBIDDEN => Some(AuditError::authentication(format!(
            "Access token lacks permission for {endpoint}"
        ))),
        s if s.is_success() => None,
        StatusCode::NOT_FOUND => Some(AuditError::transport_full(
            "Resource not found",
            status.as_u16(),
            endpoint,
        )),
        StatusCode::TOO_MANY_REQUESTS => Some(AuditError::transport_full(
            "Rate limit exceeded",
            status.as_u16(),
            endpoint,
        )),
        _ => Some(AuditError::transport_full(
            format!("Request failed ({})", status.as_u16()),
            status.as_u16(),
            endpoint,
        )),
    }
}

/// Decode a successful response or turn it into an [`AuditError`].
async fn handle_response<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, AuditError> {
    let status = response.status();
    if let Some(err) = classify_status(status, endpoint) {
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), endpoint, body = %body, "Request rejected");
        return Err(err);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AuditError::transport(format!("Failed to parse response from {endpoint}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_with_single_slash() {
        assert_eq!(
            api_url("https://dev.azure.com/contoso/", "/_apis/git/repositories"),
            "https://dev.azure.com/contoso/_apis/git/repositories"
        );
        assert_eq!(
            api_url("https://dev.azure.com/contoso", "/_apis/connectionData"),
            "https://dev.azure.com/contoso/_apis/connectionData"
        );
    }

    #[test]
    fn pull_request_query_carries_status_and_paging() {
        let query = pull_request_query(
            PullRequestStatus::Completed,
            Page {
                top: 1000,
                skip: 2000,
            },
        );

        assert_eq!(
            query,
            vec![
                ("searchCriteria.status", "completed".to_string()),
                ("$top", "1000".to_string()),
                ("$skip", "2000".to_string()),
                ("api-version", "5.1".to_string()),
            ]
        );
    }

    #[test]
    fn success_statuses_are_not_errors() {
        assert!(classify_status(StatusCode::OK, "/x").is_none());
    }

    #[test]
    fn credential_rejections_are_authentication_failures() {
        for status in [
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NON_AUTHORITATIVE_INFORMATION,
        ] {
            let err = classify_status(status, "/_apis/connectionData").unwrap();
            assert!(
                matches!(err, AuditError::AuthenticationFailure { .. }),
                "{status} should be an authentication failure"
            );
        }
    }

    #[test]
    fn other_failures_are_transport_failures_with_status() {
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "/_apis/git/repositories")
            .unwrap();
        match err {
            AuditError::TransportFailure {
                status_code,
                endpoint,
                ..
            } => {
                assert_eq!(status_code, Some(500));
                assert_eq!(endpoint.as_deref(), Some("/_apis/git/repositories"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
