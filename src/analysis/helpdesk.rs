//! Helpdesk tallies for device requests and issue reports.

use crate::models::{DeviceRequest, IssueReport, IssueSeverity, IssueStatus, RequestStatus};
use serde::Serialize;

/// Counts of device requests by review status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl RequestStats {
    pub fn from_requests(requests: &[DeviceRequest]) -> Self {
        let mut stats = Self {
            total: requests.len(),
            ..Self::default()
        };

        for request in requests {
            match request.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Rejected => stats.rejected += 1,
                RequestStatus::Other(_) => {}
            }
        }

        stats
    }
}

/// Counts of issue reports by progress, plus unresolved critical issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub critical_open: usize,
}

impl IssueStats {
    pub fn from_issues(issues: &[IssueReport]) -> Self {
        let mut stats = Self {
            total: issues.len(),
            ..Self::default()
        };

        for issue in issues {
            match issue.status {
                IssueStatus::Pending => stats.pending += 1,
                IssueStatus::InProgress => stats.in_progress += 1,
                IssueStatus::Resolved => stats.resolved += 1,
                IssueStatus::Closed => stats.closed += 1,
                IssueStatus::Other(_) => {}
            }

            // closed issues still count: only "resolved" clears a critical
            if issue.severity == IssueSeverity::Critical && issue.status != IssueStatus::Resolved {
                stats.critical_open += 1;
            }
        }

        stats
    }
}
