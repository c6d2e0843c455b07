//! Repository resolution and the bypassed pull request scan.

use tracing::{debug, info};

use crate::session::{DevOpsSession, Page};
use crate::{
    AuditError, BypassedPullRequest, PullQuantity, PullRequestStatus, Repository, RepositoryName,
};

/// Number of pull requests requested per page.
pub const PAGE_SIZE: u64 = 1000;

// ---------------------------------------------------------------------------
// Page plan
// ---------------------------------------------------------------------------

/// The fixed sequence of pages a scan issues for a given quantity.
///
/// A quantity `q` yields `ceil(q / 1000) + 1` pages. The trailing page is
/// intentional: it keeps a margin when the configured quantity is slightly
/// lower than the real number of completed pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pages: u64,
}

impl PagePlan {
    /// Plan covering `quantity` pull requests plus one extra page.
    pub fn for_quantity(quantity: PullQuantity) -> Self {
        Self {
            pages: quantity.as_u64().div_ceil(PAGE_SIZE) + 1,
        }
    }

    /// Number of page requests the plan issues.
    pub fn len(&self) -> u64 {
        self.pages
    }

    /// Never true for a plan built from a [`PullQuantity`].
    pub fn is_empty(&self) -> bool {
        self.pages == 0
    }

    /// Pages in request order: skips `0, 1000, 2000, ...`.
    pub fn pages(&self) -> impl Iterator<Item = Page> {
        (0..self.pages).map(|index| Page {
            top: PAGE_SIZE,
            skip: index * PAGE_SIZE,
        })
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Find the repository whose name equals `name` exactly.
///
/// # Errors
///
/// [`AuditError::RepositoryNotFound`] when no visible repository matches, or
/// whatever the session returned while listing.
pub async fn resolve_repository(
    session: &dyn DevOpsSession,
    name: &RepositoryName,
) -> Result<Repository, AuditError> {
    let repositories = session.list_repositories().await?;
    debug!(count = repositories.len(), "Listed repositories");

    repositories
        .into_iter()
        .find(|repo| repo.name == *name)
        .ok_or_else(|| AuditError::RepositoryNotFound {
            name: name.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Scan completed pull requests of `repository` and keep the bypassed ones.
///
/// Pages are requested strictly in sequence. Retained records keep the order
/// in which the service emitted them; overlapping pages are not deduplicated.
///
/// # Errors
///
/// The first failed page aborts the scan and its error is returned; nothing
/// collected so far is returned.
pub async fn scan_bypassed(
    session: &dyn DevOpsSession,
    repository: &Repository,
    quantity: PullQuantity,
) -> Result<Vec<BypassedPullRequest>, AuditError> {
    let plan = PagePlan::for_quantity(quantity);
    info!("Scanning PRs...");
    debug!(
        repository = %repository.name,
        quantity = %quantity,
        pages = plan.len(),
        "Scan plan"
    );

    let mut bypassed = Vec::new();
    for (index, page) in plan.pages().enumerate() {
        let pull_requests = session
            .list_pull_requests(&repository.id, PullRequestStatus::Completed, page)
            .await?;
        debug!(
            page = index,
            skip = page.skip,
            returned = pull_requests.len(),
            "Fetched page"
        );

        for pr in &pull_requests {
            debug!(id = %pr.id, completion_options = ?pr.completion_options);
            if let Some(record) = BypassedPullRequest::from_pull_request(pr) {
                bypassed.push(record);
            }
        }
    }

    Ok(bypassed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skips(quantity: u64) -> Vec<u64> {
        PagePlan::for_quantity(PullQuantity::new(quantity).unwrap())
            .pages()
            .map(|p| p.skip)
            .collect()
    }

    #[test]
    fn quantity_2500_issues_four_pages() {
        assert_eq!(skips(2500), vec![0, 1000, 2000, 3000]);
    }

    #[test]
    fn exact_multiple_still_gets_one_extra_page() {
        assert_eq!(skips(1000), vec![0, 1000]);
        assert_eq!(skips(3000), vec![0, 1000, 2000, 3000]);
    }

    #[test]
    fn smallest_quantity_issues_two_pages() {
        assert_eq!(skips(1), vec![0, 1000]);
    }

    #[test]
    fn every_page_requests_the_full_page_size() {
        let plan = PagePlan::for_quantity(PullQuantity::DEFAULT);
        assert_eq!(plan.len(), 11);
        assert!(!plan.is_empty());
        assert!(plan.pages().all(|p| p.top == PAGE_SIZE));
    }
}
