//! Core domain for the bypassed pull request audit.
//!
//! This crate holds every domain type, the error taxonomy, the port trait the
//! hosting service is reached through, and the two pieces of logic that sit
//! on top of it: repository resolution and the bypass scan. Infrastructure
//! crates implement [`DevOpsSession`]; they never add audit rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** No I/O dependencies. It defines
//! *what* is queried; `azure-devops` defines *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PullRequestId`, `RepositoryId`, ...) |
//! | [`types`] | Value types (`AccessToken`, `PullQuantity`, `PullRequest`, ...) |
//! | [`errors`] | [`AuditError`] |
//! | [`session`] | [`DevOpsSession`] port and [`Page`] |
//! | [`scanner`] | [`resolve_repository`], [`scan_bypassed`], [`PagePlan`] |

pub mod errors;
pub mod identifiers;
pub mod scanner;
pub mod session;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::AuditError;
pub use identifiers::{OrganizationUrl, PullRequestId, RepositoryId, RepositoryName};
pub use scanner::{resolve_repository, scan_bypassed, PagePlan, PAGE_SIZE};
pub use session::{DevOpsSession, Page};
pub use types::{
    AccessToken, BypassedPullRequest, CompletionOptions, PullQuantity, PullRequest,
    PullRequestStatus, Repository, Reviewer, Timestamp, Vote,
};
