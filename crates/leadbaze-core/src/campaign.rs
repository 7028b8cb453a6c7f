//! Display projection of a WhatsApp campaign's server-side state.
//!
//! Dispatch itself runs on the backend; this module only derives the numbers
//! a progress view shows: percent complete, elapsed time and a performance
//! label.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Pending,
    Sending,
    Completed,
    Failed,
    Cancelled,
}

impl CampaignStatus {
    /// Statuses during which the elapsed clock keeps ticking.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Sending)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Sending => "sending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Performance {
    /// Bands over a success rate in percent: `>= 90`, `>= 70`, below.
    #[must_use]
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            Self::Excellent
        } else if rate >= 70.0 {
            Self::Good
        } else {
            Self::NeedsImprovement
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsImprovement => "needs improvement",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignProgress {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default, alias = "sent_count")]
    pub success_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default, alias = "total")]
    pub total_leads: u32,
    /// Name or phone of the lead being messaged right now.
    #[serde(default)]
    pub current_lead: Option<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl CampaignProgress {
    #[must_use]
    pub fn processed(&self) -> u32 {
        self.success_count.saturating_add(self.failed_count)
    }

    /// Share of leads processed, in percent. Zero when the campaign has no
    /// leads; capped at 100 if the backend over-reports.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.total_leads == 0 {
            return 0.0;
        }
        (f64::from(self.processed()) * 100.0 / f64::from(self.total_leads)).min(100.0)
    }

    /// Successful sends over processed leads, in percent. `None` until the
    /// first lead is processed.
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        let processed = self.processed();
        if processed == 0 {
            return None;
        }
        Some(f64::from(self.success_count) * 100.0 / f64::from(processed))
    }

    #[must_use]
    pub fn performance(&self) -> Option<Performance> {
        self.success_rate().map(Performance::from_success_rate)
    }

    /// Time since `started_at`, clamped at zero for clock skew.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.started_at
            .map(|start| (now - start).max(TimeDelta::zero()))
    }
}

/// Renders `MM:SS`, or `H:MM:SS` once an hour has passed.
#[must_use]
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
