//! Error taxonomy for the audit run.
//!
//! Every failure an audit run can hit is one [`AuditError`] variant. Helpers
//! return it with `?`; only the binary's `main` turns it into a process exit
//! status.
//!
//! Nothing is retried. The single recoverable condition is a missing
//! configuration file, which the loader answers by offering to create one.

use thiserror::Error;

/// Errors that end (or, for a missing config file, divert) an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The configuration file does not exist.
    ///
    /// Recoverable: the loader offers to create it interactively.
    #[error("Config file not found: {path}")]
    ConfigurationMissing {
        /// Path that was looked up.
        path: String,
    },

    /// The configuration file was missing and the user declined to create one.
    #[error("Config file not created: {path}")]
    ConfigurationDeclined {
        /// Path that would have been written.
        path: String,
    },

    /// The configuration file exists but cannot be used.
    ///
    /// Produced for unparsable JSON, missing or mistyped keys, and a
    /// non-numeric or non-positive pull quantity. No default is substituted.
    #[error("Invalid config file {path}: {message}")]
    ConfigurationInvalid {
        /// Path of the offending file.
        path: String,
        /// Description of the problem.
        message: String,
    },

    /// The hosting service rejected the credentials.
    #[error("Authentication error: {message}")]
    AuthenticationFailure {
        /// Description of the rejection.
        message: String,
    },

    /// A request could not be completed or returned an unexpected status.
    #[error("Client request error: {message}")]
    TransportFailure {
        /// Description of the failure.
        message: String,
        /// HTTP status code, when a response was received.
        status_code: Option<u16>,
        /// Endpoint path that was requested.
        endpoint: Option<String>,
    },

    /// No repository visible to the session has the configured name.
    #[error("Repository {name} not found.")]
    RepositoryNotFound {
        /// Name that was searched for.
        name: String,
    },

    /// The CSV report could not be written.
    #[error("Report error: {message}")]
    ReportFailure {
        /// Description of the failure.
        message: String,
    },
}

impl AuditError {
    /// Create a transport error without response details.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            message: message.into(),
            status_code: None,
            endpoint: None,
        }
    }

    /// Create a transport error with status code and endpoint.
    pub fn transport_full(
        message: impl Into<String>,
        status_code: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::TransportFailure {
            message: message.into(),
            status_code: Some(status_code),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationFailure {
            message: message.into(),
        }
    }

    /// Create a configuration error for the file at `path`.
    pub fn invalid_config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error.
    pub fn report(message: impl Into<String>) -> Self {
        Self::ReportFailure {
            message: message.into(),
        }
    }

    /// `true` only for conditions the run can recover from without the user
    /// re-launching it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConfigurationMissing { .. })
    }

    /// Process exit status for this error when it reaches the top level.
    pub fn exit_status(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_configuration_is_recoverable() {
        let missing = AuditError::ConfigurationMissing {
            path: "config.json".into(),
        };
        assert!(missing.is_recoverable());

        let fatal = [
            AuditError::ConfigurationDeclined {
                path: "config.json".into(),
            },
            AuditError::invalid_config("config.json", "bad"),
            AuditError::authentication("denied"),
            AuditError::transport("connection reset"),
            AuditError::RepositoryNotFound {
                name: "Platform".into(),
            },
            AuditError::report("disk full"),
        ];
        for err in &fatal {
            assert!(!err.is_recoverable(), "{err} should be fatal");
            assert_eq!(err.exit_status(), 1);
        }
    }

    #[test]
    fn repository_not_found_names_the_repository() {
        let err = AuditError::RepositoryNotFound {
            name: "Platform".into(),
        };
        assert_eq!(err.to_string(), "Repository Platform not found.");
    }

    #[test]
    fn transport_full_keeps_status_and_endpoint() {
        match AuditError::transport_full("Request failed", 500, "/_apis/git/repositories") {
            AuditError::TransportFailure {
                status_code,
                endpoint,
                ..
            } => {
                assert_eq!(status_code, Some(500));
                assert_eq!(endpoint.as_deref(), Some("/_apis/git/repositories"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
