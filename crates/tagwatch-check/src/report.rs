//! Collected scan results

use crate::outcome::CheckOutcome;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tagwatch_docker::ComposeInventory;
use tagwatch_image::UpdateStatus;

/// Outcome counts for a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total: usize,
    pub updates_available: usize,
    pub up_to_date: usize,
    pub unverifiable: usize,
}

/// Everything one scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub scanned_at: DateTime<Local>,
    pub outcomes: Vec<CheckOutcome>,
    /// Compose files found, when discovery ran
    pub compose: Option<ComposeInventory>,
}

impl ScanReport {
    pub fn new(outcomes: Vec<CheckOutcome>, compose: Option<ComposeInventory>) -> Self {
        Self {
            scanned_at: Local::now(),
            outcomes,
            compose,
        }
    }

    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary {
            total: self.outcomes.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                UpdateStatus::UpdateAvailable => summary.updates_available += 1,
                UpdateStatus::UpToDate => summary.up_to_date += 1,
                UpdateStatus::Unverifiable => summary.unverifiable += 1,
            }
        }
        summary
    }

    pub fn has_updates(&self) -> bool {
        self.outcomes.iter().any(CheckOutcome::has_update)
    }

    /// 1 when any update is available; unverifiable checks alone do not fail the scan
    pub fn exit_code(&self) -> i32 {
        if self.has_updates() {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tagwatch_image::{DigestSource, DigestValue};

    pub(crate) fn outcome(name: &str, image: &str, status: UpdateStatus) -> CheckOutcome {
        let (local, remote, reason) = match status {
            UpdateStatus::UpToDate => (Some("sha256:aaaa"), Some("sha256:aaaa"), None),
            UpdateStatus::UpdateAvailable => (Some("sha256:1111"), Some("sha256:2222"), None),
            UpdateStatus::Unverifiable => (None, Some("sha256:aaaa"), Some("no local digest")),
        };
        CheckOutcome {
            container_name: name.to_string(),
            image: image.to_string(),
            image_reference: format!("docker.io/library/{}", image),
            local_digest: local.map(DigestValue::new),
            remote_digest: remote.map(DigestValue::new),
            status,
            reason: reason.map(str::to_string),
            detail: None,
            digest_source: remote.map(|_| DigestSource::Header),
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = ScanReport::new(
            vec![
                outcome("web", "nginx:latest", UpdateStatus::UpToDate),
                outcome("db", "postgres:16", UpdateStatus::UpdateAvailable),
                outcome("cache", "redis:7", UpdateStatus::Unverifiable),
                outcome("proxy", "traefik:3", UpdateStatus::UpToDate),
            ],
            None,
        );

        assert_eq!(
            report.summary(),
            ScanSummary {
                total: 4,
                updates_available: 1,
                up_to_date: 2,
                unverifiable: 1,
            }
        );
        assert!(report.has_updates());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_unverifiable_alone_exits_zero() {
        let report = ScanReport::new(
            vec![
                outcome("web", "nginx:latest", UpdateStatus::UpToDate),
                outcome("cache", "redis:7", UpdateStatus::Unverifiable),
            ],
            None,
        );
        assert!(!report.has_updates());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_empty_report() {
        let report = ScanReport::new(Vec::new(), None);
        assert_eq!(report.summary(), ScanSummary::default());
        assert_eq!(report.exit_code(), 0);
    }
}
