//! Azure DevOps infrastructure adapter.
//!
//! Implements [`audit::DevOpsSession`] over the Azure DevOps Git REST API
//! using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Authentication, URL construction, query parameters,
//! status-code classification and JSON decoding live here. The [`audit`]
//! crate sees only [`audit::DevOpsSession`] and its own domain types.
//!
//! ## Endpoints
//!
//! | Purpose | Request |
//! |---------|---------|
//! | Validate credentials | `GET {org}/_apis/connectionData` |
//! | List repositories | `GET {org}/_apis/git/repositories` |
//! | List pull requests | `GET {org}/_apis/git/repositories/{id}/pullrequests?searchCriteria.status=completed&$top=&$skip=` |
//!
//! Requests are never retried.

mod client;
pub mod models;

pub use client::{AzureDevOpsClient, API_VERSION};
