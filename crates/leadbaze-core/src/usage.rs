use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A metered resource on the subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quota {
    Leads,
    Campaigns,
    Messages,
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quota::Leads => write!(f, "leads"),
            Quota::Campaigns => write!(f, "campaigns"),
            Quota::Messages => write!(f, "messages"),
        }
    }
}

/// Plan limits per billing period. `None` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub name: String,
    #[serde(default)]
    pub leads_limit: Option<u32>,
    #[serde(default)]
    pub campaigns_limit: Option<u32>,
    #[serde(default)]
    pub messages_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    #[serde(default)]
    pub leads_generated: u32,
    #[serde(default)]
    pub campaigns_created: u32,
    #[serde(default)]
    pub messages_sent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// Whole days until the period ends, rounded up; 0 once it has ended.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let secs = (self.end - now).num_seconds();
        if secs <= 0 {
            0
        } else {
            (secs + 86_399) / 86_400
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub plan: SubscriptionPlan,
    #[serde(default)]
    pub usage: UsageCounters,
    pub period: BillingPeriod,
}

impl UsageSnapshot {
    #[must_use]
    pub fn limit(&self, quota: Quota) -> Option<u32> {
        match quota {
            Quota::Leads => self.plan.leads_limit,
            Quota::Campaigns => self.plan.campaigns_limit,
            Quota::Messages => self.plan.messages_limit,
        }
    }

    #[must_use]
    pub fn used(&self, quota: Quota) -> u32 {
        match quota {
            Quota::Leads => self.usage.leads_generated,
            Quota::Campaigns => self.usage.campaigns_created,
            Quota::Messages => self.usage.messages_sent,
        }
    }

    /// Remaining allowance, `None` when unlimited.
    #[must_use]
    pub fn remaining(&self, quota: Quota) -> Option<u32> {
        self.limit(quota)
            .map(|limit| limit.saturating_sub(self.used(quota)))
    }

    /// Consumption in percent of the limit, `None` when unlimited. A zero
    /// limit reads as fully used.
    #[must_use]
    pub fn percent_used(&self, quota: Quota) -> Option<f64> {
        self.limit(quota).map(|limit| {
            if limit == 0 {
                100.0
            } else {
                (f64::from(self.used(quota)) * 100.0 / f64::from(limit)).min(100.0)
            }
        })
    }

    #[must_use]
    pub fn can_consume(&self, quota: Quota, amount: u32) -> bool {
        self.remaining(quota).is_none_or(|left| amount <= left)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::QuotaExceeded`] when `amount` is more than what
    /// is left of `quota` this period.
    pub fn check_consume(&self, quota: Quota, amount: u32) -> Result<(), CoreError> {
        match self.remaining(quota) {
            Some(remaining) if amount > remaining => Err(CoreError::QuotaExceeded {
                quota,
                requested: amount,
                remaining,
            }),
            _ => Ok(()),
        }
    }
}
