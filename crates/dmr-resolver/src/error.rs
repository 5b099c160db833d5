use thiserror::Error;

use crate::{extract::ExtractError, fetch::FetchError, messages};

#[derive(Debug, Error)]
#[error("{}{kind}", messages::generic_resolver_error(.dtmi))]
/// Outward-facing failure of a resolution call.
///
/// `dtmi` is the identifier being resolved when the failure happened; for
/// failures inside a discovered dependency it is the model that referenced it.
pub struct ResolverError {
    pub dtmi: String,
    pub kind: ResolverErrorKind,
}

impl ResolverError {
    pub fn new(dtmi: impl Into<String>, kind: ResolverErrorKind) -> Self {
        Self {
            dtmi: dtmi.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &ResolverErrorKind {
        &self.kind
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `ResolverErrorKind` values.
pub enum ResolverErrorKind {
    #[error("{}", messages::invalid_dtmi_format(.dtmi))]
    InvalidDtmiFormat { dtmi: String },
    #[error("{}", messages::incorrect_dtmi_casing(.requested, .actual))]
    IncorrectDtmiCasing { requested: String, actual: String },
    #[error("{}", messages::content_not_found(.path))]
    ContentNotFound { path: String },
    #[error(transparent)]
    DependencyResolution(DependencyFailure),
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("Retrieved model content is invalid: {reason}. ")]
    InvalidContent { reason: String },
}

impl ResolverErrorKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolverErrorKind::InvalidDtmiFormat { .. } => "invalid_dtmi_format",
            ResolverErrorKind::IncorrectDtmiCasing { .. } => "incorrect_dtmi_casing",
            ResolverErrorKind::ContentNotFound { .. } => "content_not_found",
            ResolverErrorKind::DependencyResolution(_) => "dependency_resolution",
            ResolverErrorKind::Fetch(_) => "fetch",
            ResolverErrorKind::InvalidContent { .. } => "invalid_content",
        }
    }

    /// Whether retrying the same call could succeed: transient transport
    /// faults, server-side statuses and timeouts.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ResolverErrorKind::Fetch(error) => matches!(
                error,
                FetchError::Transport { .. }
                    | FetchError::TimedOut { .. }
                    | FetchError::HttpStatus { status: 500..=599, .. }
            ),
            ResolverErrorKind::DependencyResolution(DependencyFailure::Unresolvable {
                cause,
                ..
            }) => cause.is_recoverable(),
            _ => false,
        }
    }

    /// Transport faults and cancellation keep their own kind even when they
    /// happen while fetching a discovered dependency.
    pub(crate) fn wraps_as_dependency(&self) -> bool {
        !matches!(self, ResolverErrorKind::Fetch(_))
    }
}

impl From<ExtractError> for ResolverErrorKind {
    fn from(error: ExtractError) -> Self {
        ResolverErrorKind::DependencyResolution(DependencyFailure::Extraction(error))
    }
}

#[derive(Debug, Error)]
/// Why a model's dependency set could not be resolved.
pub enum DependencyFailure {
    #[error(transparent)]
    Extraction(ExtractError),
    #[error("{}{cause}", messages::failed_dependency(.dependency))]
    Unresolvable {
        dependency: String,
        cause: Box<ResolverErrorKind>,
    },
}

#[cfg(test)]
mod tests {
    use super::{DependencyFailure, ResolverError, ResolverErrorKind};
    use crate::{extract::ExtractError, fetch::FetchError};

    #[test]
    fn unit_invalid_format_message_is_prefix_plus_cause() {
        let error = ResolverError::new(
            "dtmi:com:example::Thermostat;1",
            ResolverErrorKind::InvalidDtmiFormat {
                dtmi: "dtmi:com:example::Thermostat;1".to_string(),
            },
        );
        assert_eq!(
            error.to_string(),
            "Unable to resolve \"dtmi:com:example::Thermostat;1\". Invalid DTMI format \"dtmi:com:example::Thermostat;1\". "
        );
        assert_eq!(error.kind().kind_name(), "invalid_dtmi_format");
    }

    #[test]
    fn unit_dependency_failure_nests_cause_message() {
        let error = ResolverError::new(
            "dtmi:com:example:invalidmodel;1",
            ResolverErrorKind::DependencyResolution(DependencyFailure::Unresolvable {
                dependency: "dtmi:com:example:Thermojax;999".to_string(),
                cause: Box::new(ResolverErrorKind::ContentNotFound {
                    path: "/repo/dtmi/com/example/thermojax-999.json".to_string(),
                }),
            }),
        );
        let message = error.to_string();
        assert!(message.starts_with("Unable to resolve \"dtmi:com:example:invalidmodel;1\". "));
        assert!(message.contains("Failed to resolve dependency \"dtmi:com:example:Thermojax;999\". "));
        assert!(message.ends_with("\"/repo/dtmi/com/example/thermojax-999.json\" was not found in the target repository. "));
    }

    #[test]
    fn unit_only_non_transport_failures_wrap_as_dependency() {
        assert!(ResolverErrorKind::ContentNotFound {
            path: "x".to_string()
        }
        .wraps_as_dependency());
        assert!(!ResolverErrorKind::Fetch(FetchError::Cancelled).wraps_as_dependency());
        let extraction: ResolverErrorKind =
            ExtractError::MalformedJson("expected value".to_string()).into();
        assert_eq!(extraction.kind_name(), "dependency_resolution");
    }

    #[test]
    fn unit_only_transient_fetch_faults_are_recoverable() {
        let unavailable = ResolverErrorKind::Fetch(FetchError::HttpStatus {
            url: "https://repo.example/dtmi/a-1.json".to_string(),
            status: 503,
        });
        assert!(unavailable.is_recoverable());
        assert!(!ResolverErrorKind::Fetch(FetchError::HttpStatus {
            url: "https://repo.example/dtmi/a-1.json".to_string(),
            status: 403,
        })
        .is_recoverable());
        assert!(!ResolverErrorKind::Fetch(FetchError::Cancelled).is_recoverable());
        assert!(ResolverErrorKind::DependencyResolution(DependencyFailure::Unresolvable {
            dependency: "dtmi:a;1".to_string(),
            cause: Box::new(unavailable),
        })
        .is_recoverable());
        assert!(!ResolverErrorKind::IncorrectDtmiCasing {
            requested: "dtmi:a;1".to_string(),
            actual: "dtmi:A;1".to_string(),
        }
        .is_recoverable());
    }
}
