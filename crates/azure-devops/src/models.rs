//! Wire models for the Azure DevOps Git REST API (`api-version=5.1`).
//!
//! Only the fields the audit reads are declared; serde ignores the rest.
//! Conversions into the [`audit`] domain types live here so the domain crate
//! never sees camelCase JSON.

use serde::Deserialize;
use tracing::warn;

use audit::{
    CompletionOptions, PullRequest, PullRequestId, Repository, RepositoryId, RepositoryName,
    Reviewer, Timestamp, Vote,
};

/// Envelope of every list endpoint: `{ "count": n, "value": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub value: Vec<T>,
}

/// Response of `GET {org}/_apis/connectionData`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub authenticated_user: Option<Identity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub provider_display_name: Option<String>,
}

/// `GitRepository`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: String,
    pub name: String,
}

/// `GitPullRequest`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequest {
    pub pull_request_id: u64,
    pub completion_options: Option<GitPullRequestCompletionOptions>,
    pub closed_date: Option<String>,
    #[serde(default)]
    pub reviewers: Vec<IdentityRefWithVote>,
}

/// `GitPullRequestCompletionOptions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequestCompletionOptions {
    #[serde(default)]
    pub bypass_policy: bool,
    pub bypass_reason: Option<String>,
}

/// `IdentityRefWithVote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRefWithVote {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub vote: i32,
}

impl GitRepository {
    /// Returns `None` for a repository with an empty id or name.
    pub fn into_domain(self) -> Option<Repository> {
        Some(Repository {
            id: RepositoryId::new(self.id)?,
            name: RepositoryName::new(self.name)?,
        })
    }
}

impl From<GitPullRequest> for PullRequest {
    fn from(pr: GitPullRequest) -> Self {
        let closed_date = pr.closed_date.as_deref().and_then(|raw| {
            let parsed = Timestamp::parse(raw);
            if parsed.is_none() {
                warn!(id = pr.pull_request_id, raw, "Unparsable closedDate; Closed Date left empty");
            }
            parsed
        });

        PullRequest {
            id: PullRequestId::new(pr.pull_request_id),
            completion_options: pr.completion_options.map(|o| CompletionOptions {
                bypass_policy: o.bypass_policy,
                bypass_reason: o.bypass_reason,
            }),
            closed_date,
            reviewers: pr
                .reviewers
                .into_iter()
                .map(|r| Reviewer {
                    display_name: r.display_name,
                    vote: Vote::new(r.vote),
                })
                .collect(),
        }
    }
}
