// ABOUTME: Process-lifetime upgrade state: Idle until the first admitted upgrade, then InProgress.
// ABOUTME: The ticket records who started the upgrade, in the manner of a lock holder record.

use crate::endpoint::EndpointId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Upgrade lifecycle as seen by one coordinator.
///
/// This is a one-shot latch, not a lock. Once `InProgress` it never goes
/// back to `Idle`, whether the strategy succeeded, failed or never returned:
/// a control plane that began upgrading is expected to be replaced, and a
/// retry against a half-upgraded instance is unsafe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UpgradeState {
    #[default]
    Idle,
    InProgress(UpgradeTicket),
}

impl UpgradeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, UpgradeState::Idle)
    }
}

/// Who admitted the in-flight upgrade, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeTicket {
    /// Hostname of the machine running the coordinator.
    pub holder: String,
    /// Process ID of the coordinator.
    pub pid: u32,
    /// When the upgrade was admitted.
    pub started_at: DateTime<Utc>,
    /// The local endpoint being upgraded.
    pub endpoint: EndpointId,
}

impl UpgradeTicket {
    /// Create a ticket for the current process.
    pub fn new(endpoint: EndpointId) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            endpoint,
        }
    }
}
