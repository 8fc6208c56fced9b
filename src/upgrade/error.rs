// ABOUTME: Error types for upgrade admission/dispatch and for the full request path.
// ABOUTME: SystemUpgradeError unifies the stages with SNAFU and exposes a kind for callers.

use snafu::Snafu;

use super::state::UpgradeTicket;
use super::strategy::StrategyError;
use crate::endpoint::{EndpointId, EndpointType, ResolveError, StoreError};
use crate::platform::{DetectionError, Platform};
use crate::types::LicenseError;

/// Errors from [`UpgradeCoordinator::upgrade`](super::UpgradeCoordinator::upgrade).
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    #[error("unsupported platform {0}")]
    UnsupportedPlatform(Platform),

    #[error("endpoint {endpoint} ({endpoint_type}) is not a local endpoint on {platform}")]
    EndpointPlatformMismatch {
        endpoint: EndpointId,
        endpoint_type: EndpointType,
        platform: Platform,
    },

    #[error("an upgrade is already in progress (started on {} by pid {} at {})", .0.holder, .0.pid, .0.started_at)]
    UpgradeAlreadyInProgress(UpgradeTicket),

    /// Strategy errors pass through unchanged.
    #[error(transparent)]
    Strategy(StrategyError),
}

/// Error for the whole upgrade request, one variant per stage.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SystemUpgradeError {
    #[snafu(display("invalid request payload: {source}"))]
    InvalidRequest { source: LicenseError },

    #[snafu(display("failed to determine container platform: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("failed to retrieve endpoints: {source}"))]
    Store { source: StoreError },

    #[snafu(display("failed to guess local endpoint: {source}"))]
    Resolve { source: ResolveError },

    #[snafu(display("failed to upgrade: {source}"))]
    Dispatch { source: UpgradeError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemUpgradeErrorKind {
    MissingLicense,
    InvalidLicenseFormat,
    PlatformUndetermined,
    StoreUnavailable,
    UnsupportedPlatform,
    LocalEndpointNotFound,
    /// The endpoint handed to dispatch does not belong to the coordinator's platform.
    EndpointPlatformMismatch,
    UpgradeAlreadyInProgress,
    /// The strategy was dispatched and failed.
    StrategyFailed,
}

impl SystemUpgradeErrorKind {
    /// Whether resubmitting a different payload could fix the request.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            SystemUpgradeErrorKind::MissingLicense | SystemUpgradeErrorKind::InvalidLicenseFormat
        )
    }
}

impl SystemUpgradeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> SystemUpgradeErrorKind {
        match self {
            SystemUpgradeError::InvalidRequest { source } => match source {
                LicenseError::MissingLicense => SystemUpgradeErrorKind::MissingLicense,
                LicenseError::InvalidLicenseFormat => SystemUpgradeErrorKind::InvalidLicenseFormat,
            },
            SystemUpgradeError::Detection { .. } => SystemUpgradeErrorKind::PlatformUndetermined,
            SystemUpgradeError::Store { .. } => SystemUpgradeErrorKind::StoreUnavailable,
            SystemUpgradeError::Resolve { source } => match source {
                ResolveError::UnsupportedPlatform(_) => SystemUpgradeErrorKind::UnsupportedPlatform,
                ResolveError::LocalEndpointNotFound => SystemUpgradeErrorKind::LocalEndpointNotFound,
            },
            SystemUpgradeError::Dispatch { source } => match source {
                UpgradeError::UnsupportedPlatform(_) => SystemUpgradeErrorKind::UnsupportedPlatform,
                UpgradeError::EndpointPlatformMismatch { .. } => {
                    SystemUpgradeErrorKind::EndpointPlatformMismatch
                }
                UpgradeError::UpgradeAlreadyInProgress(_) => {
                    SystemUpgradeErrorKind::UpgradeAlreadyInProgress
                }
                UpgradeError::Strategy(_) => SystemUpgradeErrorKind::StrategyFailed,
            },
        }
    }

    /// Returns the strategy error if dispatch reached a strategy.
    pub fn strategy_error(&self) -> Option<&StrategyError> {
        match self {
            SystemUpgradeError::Dispatch {
                source: UpgradeError::Strategy(e),
            } => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_errors_are_client_errors() {
        let err = SystemUpgradeError::InvalidRequest {
            source: LicenseError::InvalidLicenseFormat,
        };
        assert_eq!(err.kind(), SystemUpgradeErrorKind::InvalidLicenseFormat);
        assert!(err.kind().is_client_error());
    }

    #[test]
    fn precondition_errors_are_server_errors() {
        let errors = [
            SystemUpgradeError::Detection {
                source: DetectionError::NoSignal,
            },
            SystemUpgradeError::Resolve {
                source: ResolveError::LocalEndpointNotFound,
            },
            SystemUpgradeError::Dispatch {
                source: UpgradeError::UpgradeAlreadyInProgress(UpgradeTicket::new(EndpointId(1))),
            },
        ];
        for err in errors {
            assert!(!err.kind().is_client_error(), "{err} should be a server error");
        }
    }

    #[test]
    fn strategy_error_is_exposed_verbatim() {
        let err = SystemUpgradeError::Dispatch {
            source: UpgradeError::Strategy(StrategyError::NotReplaced),
        };
        assert_eq!(err.kind(), SystemUpgradeErrorKind::StrategyFailed);
        assert!(matches!(err.strategy_error(), Some(StrategyError::NotReplaced)));
        assert_eq!(
            err.to_string(),
            "failed to upgrade: upgrade failed: server should have been restarted by the updater"
        );
    }
}
