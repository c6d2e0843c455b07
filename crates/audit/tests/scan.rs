//! Resolver and scanner behaviour against an in-memory session.
//!
//! The fake serves pull requests from a flat list, slicing it by each page's
//! `skip`/`top`, and records every page it was asked for so the tests can
//! check the request sequence as well as the result.

use std::sync::Mutex;

use async_trait::async_trait;

use audit::{
    resolve_repository, scan_bypassed, AuditError, CompletionOptions, DevOpsSession, Page,
    PullQuantity, PullRequest, PullRequestId, PullRequestStatus, Repository, RepositoryId,
    RepositoryName, Reviewer, Timestamp, Vote,
};

struct FakeSession {
    repositories: Vec<Repository>,
    pull_requests: Vec<PullRequest>,
    /// Fail the request whose skip equals this value.
    fail_at_skip: Option<u64>,
    requests: Mutex<Vec<(PullRequestStatus, Page)>>,
}

impl FakeSession {
    fn with_pull_requests(pull_requests: Vec<PullRequest>) -> Self {
        Self {
            repositories: vec![repo("1111", "Platform")],
            pull_requests,
            fail_at_skip: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requested_skips(&self) -> Vec<u64> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, page)| page.skip)
            .collect()
    }
}

#[async_trait]
impl DevOpsSession for FakeSession {
    async fn list_repositories(&self) -> Result<Vec<Repository>, AuditError> {
        Ok(self.repositories.clone())
    }

    async fn list_pull_requests(
        &self,
        _repository: &RepositoryId,
        status: PullRequestStatus,
        page: Page,
    ) -> Result<Vec<PullRequest>, AuditError> {
        self.requests.lock().unwrap().push((status, page));
        if self.fail_at_skip == Some(page.skip) {
            return Err(AuditError::transport("connection reset by peer"));
        }
        Ok(self
            .pull_requests
            .iter()
            .skip(page.skip as usize)
            .take(page.top as usize)
            .cloned()
            .collect())
    }
}

fn repo(id: &str, name: &str) -> Repository {
    Repository {
        id: RepositoryId::new(id).unwrap(),
        name: RepositoryName::new(name).unwrap(),
    }
}

fn pr(id: u64, options: Option<CompletionOptions>) -> PullRequest {
    PullRequest {
        id: PullRequestId::new(id),
        completion_options: options,
        closed_date: Timestamp::parse("2020-01-01T12:00:00Z"),
        reviewers: vec![
            Reviewer {
                display_name: "Alice".into(),
                vote: Vote::APPROVED,
            },
            Reviewer {
                display_name: "Bob".into(),
                vote: Vote::REJECTED,
            },
        ],
    }
}

fn bypassed(id: u64) -> PullRequest {
    pr(
        id,
        Some(CompletionOptions {
            bypass_policy: true,
            bypass_reason: Some(format!("hotfix {id}")),
        }),
    )
}

fn merged_normally(id: u64) -> PullRequest {
    pr(
        id,
        Some(CompletionOptions {
            bypass_policy: false,
            bypass_reason: None,
        }),
    )
}

fn quantity(n: u64) -> PullQuantity {
    PullQuantity::new(n).unwrap()
}

#[tokio::test]
async fn retains_exactly_the_bypassed_records_in_order() {
    let session = FakeSession::with_pull_requests(vec![
        merged_normally(1),
        bypassed(2),
        pr(3, None),
        bypassed(4),
        merged_normally(5),
        bypassed(6),
    ]);
    let repository = repo("1111", "Platform");

    let found = scan_bypassed(&session, &repository, quantity(6)).await.unwrap();

    let ids: Vec<u64> = found.iter().map(|r| r.id.as_u64()).collect();
    assert_eq!(ids, vec![2, 4, 6]);
    assert_eq!(found[0].reason, "hotfix 2");
    assert_eq!(found[0].approvers, vec!["Alice".to_string()]);
    assert_eq!(found[0].closed_date.unwrap().date_string(), "2020-01-01");
}

#[tokio::test]
async fn records_without_completion_options_are_never_retained() {
    let session = FakeSession::with_pull_requests((1..=20).map(|id| pr(id, None)).collect());
    let repository = repo("1111", "Platform");

    let found = scan_bypassed(&session, &repository, quantity(20)).await.unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn quantity_2500_requests_four_completed_pages() {
    let session = FakeSession::with_pull_requests(vec![]);
    let repository = repo("1111", "Platform");

    scan_bypassed(&session, &repository, quantity(2500)).await.unwrap();

    assert_eq!(session.requested_skips(), vec![0, 1000, 2000, 3000]);
    let requests = session.requests.lock().unwrap();
    assert!(requests
        .iter()
        .all(|(status, page)| *status == PullRequestStatus::Completed && page.top == 1000));
}

#[tokio::test]
async fn records_across_pages_accumulate_in_emission_order() {
    let mut pull_requests: Vec<PullRequest> = (0..2100).map(merged_normally).collect();
    pull_requests[5] = bypassed(5);
    pull_requests[1500] = bypassed(1500);
    pull_requests[2050] = bypassed(2050);
    let session = FakeSession::with_pull_requests(pull_requests);
    let repository = repo("1111", "Platform");

    let found = scan_bypassed(&session, &repository, quantity(1200)).await.unwrap();

    // 1200 → three pages (0, 1000, 2000), so the record at 2050 is reached
    // through the extra page.
    let ids: Vec<u64> = found.iter().map(|r| r.id.as_u64()).collect();
    assert_eq!(ids, vec![5, 1500, 2050]);
}

#[tokio::test]
async fn failed_page_aborts_the_scan() {
    let mut session = FakeSession::with_pull_requests((0..3000).map(bypassed).collect());
    session.fail_at_skip = Some(1000);
    let repository = repo("1111", "Platform");

    let err = scan_bypassed(&session, &repository, quantity(3000))
        .await
        .unwrap_err();

    assert!(matches!(err, AuditError::TransportFailure { .. }));
    assert_eq!(session.requested_skips(), vec![0, 1000]);
}

#[tokio::test]
async fn resolver_returns_the_exact_match() {
    let mut session = FakeSession::with_pull_requests(vec![]);
    session.repositories = vec![repo("1111", "Platform"), repo("2222", "Tooling")];

    let found = resolve_repository(&session, &RepositoryName::new("Tooling").unwrap())
        .await
        .unwrap();

    assert_eq!(found.id.as_str(), "2222");
}

#[tokio::test]
async fn resolver_is_case_sensitive() {
    let session = FakeSession::with_pull_requests(vec![]);

    let err = resolve_repository(&session, &RepositoryName::new("platform").unwrap())
        .await
        .unwrap_err();

    match err {
        AuditError::RepositoryNotFound { name } => assert_eq!(name, "platform"),
        other => panic!("unexpected error: {other:?}"),
    }
}

/// Serves the same pull requests on every page, as a service does when its
/// listing shifts between requests.
struct RepeatingSession {
    page: Vec<PullRequest>,
}

#[async_trait]
impl DevOpsSession for RepeatingSession {
    async fn list_repositories(&self) -> Result<Vec<Repository>, AuditError> {
        Ok(vec![repo("1111", "Platform")])
    }

    async fn list_pull_requests(
        &self,
        _repository: &RepositoryId,
        _status: PullRequestStatus,
        _page: Page,
    ) -> Result<Vec<PullRequest>, AuditError> {
        Ok(self.page.clone())
    }
}

#[tokio::test]
async fn overlapping_pages_keep_every_copy() {
    let session = RepeatingSession {
        page: vec![merged_normally(8), bypassed(9)],
    };
    let repository = repo("1111", "Platform");

    let found = scan_bypassed(&session, &repository, quantity(1000)).await.unwrap();

    let ids: Vec<u64> = found.iter().map(|r| r.id.as_u64()).collect();
    assert_eq!(ids, vec![9, 9]);
    assert_eq!(found[0], found[1]);
}
