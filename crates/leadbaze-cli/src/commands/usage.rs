//! `usage`: plan limits and consumption for the current billing period.

use chrono::{DateTime, Utc};
use leadbaze_client::BackendClient;
use leadbaze_core::{AppConfig, Quota, UsageSnapshot};

use super::require_user_id;

/// # Errors
///
/// Returns an error if the user id is missing or the backend call fails.
pub(crate) async fn run_usage(config: &AppConfig) -> anyhow::Result<()> {
    let backend = BackendClient::from_config(config)?;
    let snapshot = backend.usage_snapshot(require_user_id(config)?).await?;
    println!("{}", render_usage(&snapshot, Utc::now()));
    Ok(())
}

fn quota_line(snapshot: &UsageSnapshot, quota: Quota) -> String {
    let used = snapshot.used(quota);
    match (snapshot.limit(quota), snapshot.remaining(quota), snapshot.percent_used(quota)) {
        (Some(limit), Some(remaining), Some(percent)) => format!(
            "{:<11}{used:>7} / {limit:<7} {percent:>5.1}%  {remaining} left",
            quota.to_string()
        ),
        _ => format!("{:<11}{used:>7} / unlimited", quota.to_string()),
    }
}

fn render_usage(snapshot: &UsageSnapshot, now: DateTime<Utc>) -> String {
    let mut lines = vec![format!(
        "plan {} \u{b7} period {} to {} ({} days left)",
        snapshot.plan.name,
        snapshot.period.start.format("%Y-%m-%d"),
        snapshot.period.end.format("%Y-%m-%d"),
        snapshot.period.days_remaining(now),
    )];
    lines.extend(
        [Quota::Leads, Quota::Campaigns, Quota::Messages]
            .into_iter()
            .map(|q| quota_line(snapshot, q)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use leadbaze_core::{BillingPeriod, SubscriptionPlan, UsageCounters};

    use super::*;

    fn snapshot() -> UsageSnapshot {
        UsageSnapshot {
            plan: SubscriptionPlan {
                name: "start".to_owned(),
                leads_limit: Some(500),
                campaigns_limit: Some(5),
                messages_limit: None,
            },
            usage: UsageCounters {
                leads_generated: 120,
                campaigns_created: 5,
                messages_sent: 3_400,
            },
            period: BillingPeriod {
                start: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    #[test]
    fn limited_quota_shows_percent_and_remaining() {
        let line = quota_line(&snapshot(), Quota::Leads);
        assert!(line.starts_with("leads"), "{line}");
        assert!(line.contains("120 / 500"), "{line}");
        assert!(line.contains("24.0%"), "{line}");
        assert!(line.ends_with("380 left"), "{line}");
    }

    #[test]
    fn unlimited_quota_says_so() {
        let line = quota_line(&snapshot(), Quota::Messages);
        assert!(line.ends_with("3400 / unlimited"), "{line}");
    }

    #[test]
    fn header_counts_days_left() {
        let now = Utc.with_ymd_and_hms(2026, 3, 30, 12, 0, 0).unwrap();
        let text = render_usage(&snapshot(), now);
        assert!(text.starts_with("plan start"), "{text}");
        assert!(text.contains("(2 days left)"), "{text}");
        assert_eq!(text.lines().count(), 4);
    }
}
