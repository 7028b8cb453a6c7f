//! `campaign watch`: live progress of a campaign being sent by the backend.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use leadbaze_client::{poll_resource, BackendClient, PollEvent, PollOptions};
use leadbaze_core::{format_elapsed, AppConfig, CampaignProgress};
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub(crate) enum CampaignCommands {
    /// Print progress until the campaign completes, fails or is cancelled
    Watch {
        id: Uuid,
        /// Poll interval in milliseconds (defaults to LEADBAZE_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

/// # Errors
///
/// Returns an error if the backend client cannot be built or the campaign
/// cannot be read at all (unknown id, rejected credentials). Transient poll
/// failures are logged and retried on the next tick.
pub(crate) async fn run_campaign(config: &AppConfig, command: CampaignCommands) -> anyhow::Result<()> {
    match command {
        CampaignCommands::Watch { id, interval_ms } => {
            let interval = Duration::from_millis(interval_ms.unwrap_or(config.poll_interval_ms).max(100));
            watch(BackendClient::from_config(config)?, id, interval).await
        }
    }
}

async fn watch(backend: BackendClient, id: Uuid, interval: Duration) -> anyhow::Result<()> {
    let mut sub = poll_resource(
        PollOptions::every(interval),
        |p: &CampaignProgress| p.status.is_terminal(),
        move || {
            let backend = backend.clone();
            async move { backend.campaign_progress(id).await }
        },
    );

    let mut clock = tokio::time::interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut latest: Option<CampaignProgress> = None;
    let mut last_seq = 0u32;

    loop {
        tokio::select! {
            event = sub.next() => match event {
                Some(PollEvent::Update { seq, value }) => {
                    if seq > last_seq {
                        last_seq = seq;
                        println!("{}", progress_line(&value, Utc::now()));
                        latest = Some(value);
                    }
                }
                Some(PollEvent::Finished { value, .. }) => {
                    println!("{}", progress_line(&value, Utc::now()));
                    println!("{}", summary(&value));
                    return Ok(());
                }
                Some(PollEvent::Error { retriable: false, message, .. }) => {
                    sub.cancel();
                    anyhow::bail!("cannot watch campaign {id}: {message}");
                }
                Some(PollEvent::Error { attempt, message, .. }) => {
                    tracing::warn!(attempt, error = %message, campaign_id = %id, "progress fetch failed");
                }
                Some(PollEvent::Exhausted { .. }) | None => return Ok(()),
            },
            _ = clock.tick() => {
                if let Some(progress) = latest.as_ref().filter(|p| p.status.is_active()) {
                    if let Some(elapsed) = progress.elapsed(Utc::now()) {
                        eprint!("\relapsed {}", format_elapsed(elapsed));
                    }
                }
            }
            _ = &mut ctrl_c => {
                println!();
                println!("stopped watching; the campaign keeps running on the server");
                sub.cancel();
                return Ok(());
            }
        }
    }
}

fn progress_line(progress: &CampaignProgress, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "[{}] {}/{} ({:.1}%) \u{b7} sent {} \u{b7} failed {}",
        progress.status,
        progress.processed(),
        progress.total_leads,
        progress.progress_percent(),
        progress.success_count,
        progress.failed_count,
    );
    if let Some(elapsed) = progress.elapsed(now) {
        line.push_str(&format!(" \u{b7} {}", format_elapsed(elapsed)));
    }
    if let Some(current) = progress.current_lead.as_deref().filter(|c| !c.is_empty()) {
        line.push_str(&format!(" \u{b7} now: {current}"));
    }
    line
}

fn summary(progress: &CampaignProgress) -> String {
    match (progress.success_rate(), progress.performance()) {
        (Some(rate), Some(performance)) => format!(
            "campaign \"{}\" {}: {:.1}% delivered ({})",
            progress.name,
            progress.status,
            rate,
            performance.label()
        ),
        _ => format!(
            "campaign \"{}\" {} before any message was processed",
            progress.name, progress.status
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use leadbaze_core::{CampaignStatus, Performance};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn progress(status: CampaignStatus, success: u32, failed: u32) -> CampaignProgress {
        CampaignProgress {
            name: "Black Friday".to_owned(),
            status,
            success_count: success,
            failed_count: failed,
            total_leads: 50,
            started_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
            ..CampaignProgress::default()
        }
    }

    #[test]
    fn progress_line_shows_counts_and_elapsed() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 1, 5).unwrap();
        let mut p = progress(CampaignStatus::Sending, 20, 5);
        p.current_lead = Some("Padaria Central".to_owned());
        let line = progress_line(&p, now);
        assert!(line.starts_with("[sending] 25/50 (50.0%)"), "{line}");
        assert!(line.contains("01:05"), "{line}");
        assert!(line.ends_with("now: Padaria Central"), "{line}");
    }

    #[test]
    fn summary_reports_performance_band() {
        let text = summary(&progress(CampaignStatus::Completed, 45, 5));
        assert!(text.contains("90.0% delivered"), "{text}");
        assert!(text.contains(Performance::Excellent.label()), "{text}");
    }

    #[test]
    fn summary_without_processed_messages() {
        let text = summary(&progress(CampaignStatus::Cancelled, 0, 0));
        assert!(text.contains("before any message"), "{text}");
    }

    #[tokio::test]
    async fn watch_stops_on_unknown_campaign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let backend =
            BackendClient::with_base_url(&server.uri(), "anon-key", None, 5).expect("client");
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            watch(backend, Uuid::new_v4(), Duration::from_millis(500)),
        )
        .await
        .expect("watch should stop on its own");

        let err = result.expect_err("unknown campaign should be an error");
        assert!(err.to_string().contains("cannot watch campaign"), "{err}");
    }
}
