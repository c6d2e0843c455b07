//! Port trait for the hosting service.
//!
//! The scanner and resolver only ever talk to a [`DevOpsSession`]. The
//! `azure-devops` crate supplies the HTTP implementation; tests supply an
//! in-memory one.

use async_trait::async_trait;

use crate::{AuditError, PullRequest, PullRequestStatus, Repository, RepositoryId};

/// One page request: at most `top` records after skipping `skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub top: u64,
    pub skip: u64,
}

/// An authenticated session against the hosting service.
///
/// Every call is a single request. Implementations must not retry; a failure
/// is returned as [`AuditError::TransportFailure`] or
/// [`AuditError::AuthenticationFailure`] and ends the run.
#[async_trait]
pub trait DevOpsSession: Send + Sync {
    /// List every repository the session can see.
    ///
    /// Implementations backed by a paginated endpoint must consume all pages
    /// before returning.
    async fn list_repositories(&self) -> Result<Vec<Repository>, AuditError>;

    /// Fetch one page of pull requests with the given status, in the order
    /// the service emits them.
    async fn list_pull_requests(
        &self,
        repository: &RepositoryId,
        status: PullRequestStatus,
        page: Page,
    ) -> Result<Vec<PullRequest>, AuditError>;
}
