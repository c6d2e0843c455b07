//! Shared value types for the audit domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (the scan quantity is strictly positive, the access
//! token never appears in logs) or describe the records the scanner inspects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PullRequestId, RepositoryId, RepositoryName};

// ---------------------------------------------------------------------------
// Credentials and configuration values
// ---------------------------------------------------------------------------

/// Personal access token used to authenticate against the hosting service.
///
/// `Debug` and `Display` are redacted so a configuration can be logged at
/// debug level without leaking the credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates an [`AccessToken`], returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw secret. Only transport code should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

// ---------------------------------------------------------------------------

/// Number of completed pull requests the scanner should cover.
///
/// Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PullQuantity(u64);

impl PullQuantity {
    /// Quantity written into a configuration file created interactively.
    pub const DEFAULT: PullQuantity = PullQuantity(10_000);

    /// Creates a [`PullQuantity`], returning `None` for zero.
    #[must_use]
    pub fn new(value: u64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying integer.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// A repository visible to the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Service-assigned identifier.
    pub id: RepositoryId,
    /// Display name; what the configuration refers to.
    pub name: RepositoryName,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// Status filter applied to pull request queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PullRequestStatus {
    Completed,
}

impl PullRequestStatus {
    /// Value of the `searchCriteria.status` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

// ---------------------------------------------------------------------------

/// A reviewer's vote on a pull request.
///
/// The service records votes as small signed integers; only
/// [`Vote::APPROVED`] counts as an approval for reporting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote(i32);

impl Vote {
    pub const APPROVED: Vote = Vote(10);
    pub const APPROVED_WITH_SUGGESTIONS: Vote = Vote(5);
    pub const NO_VOTE: Vote = Vote(0);
    pub const WAITING_FOR_AUTHOR: Vote = Vote(-5);
    pub const REJECTED: Vote = Vote(-10);

    /// Wraps a raw vote value. Unknown values are kept as-is.
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// `true` only for an explicit approval (vote 10).
    pub fn is_approval(self) -> bool {
        self == Self::APPROVED
    }
}

impl Default for Vote {
    fn default() -> Self {
        Self::NO_VOTE
    }
}

/// A reviewer entry on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub display_name: String,
    pub vote: Vote,
}

/// How a pull request was completed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// `true` when branch policies were overridden to complete the pull request.
    pub bypass_policy: bool,
    /// Free-text justification entered by whoever bypassed the policies.
    pub bypass_reason: Option<String>,
}

/// A pull request as returned by the hosting service, reduced to the fields
/// the audit needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: PullRequestId,
    /// `None` when the service recorded no completion options.
    pub completion_options: Option<CompletionOptions>,
    pub closed_date: Option<Timestamp>,
    pub reviewers: Vec<Reviewer>,
}

impl PullRequest {
    /// Returns the completion options if, and only if, they record a policy
    /// bypass.
    pub fn bypass(&self) -> Option<&CompletionOptions> {
        self.completion_options
            .as_ref()
            .filter(|options| options.bypass_policy)
    }

    /// Display names of reviewers whose vote is an approval, in API order.
    pub fn approvers(&self) -> Vec<String> {
        self.reviewers
            .iter()
            .filter(|r| r.vote.is_approval())
            .map(|r| r.display_name.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------

/// A pull request that was completed by bypassing branch policies.
///
/// This is the only shape the report emitter sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassedPullRequest {
    pub id: PullRequestId,
    /// Empty when the service omitted the reason.
    pub reason: String,
    pub closed_date: Option<Timestamp>,
    /// Display names of approving reviewers, in API order.
    pub approvers: Vec<String>,
}

impl BypassedPullRequest {
    /// Projects a pull request into the report shape.
    ///
    /// Returns `None` when the pull request was not bypassed.
    pub fn from_pull_request(pr: &PullRequest) -> Option<Self> {
        let options = pr.bypass()?;
        Some(Self {
            id: pr.id,
            reason: options.bypass_reason.clone().unwrap_or_default(),
            closed_date: pr.closed_date,
            approvers: pr.approvers(),
        })
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parses the date formats the service emits.
    ///
    /// Accepts RFC 3339 (`"2020-01-01T10:20:30.123Z"`), a date-time without
    /// offset (read as UTC) and a bare date (read as midnight UTC).
    pub fn parse(value: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self(naive.and_utc()));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
    }

    /// Calendar date in UTC, formatted `YYYY-MM-DD`.
    pub fn date_string(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
