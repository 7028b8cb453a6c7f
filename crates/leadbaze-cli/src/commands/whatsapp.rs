//! `whatsapp`: link a number to an Evolution instance, check it and remove it.

use std::time::Duration;

use clap::Subcommand;
use leadbaze_client::{PollEvent, PollOptions, QrCode, WhatsappClient};
use leadbaze_core::AppConfig;

use crate::dialog::dialog_for;

#[derive(Debug, Subcommand)]
pub(crate) enum WhatsappCommands {
    /// Create an instance and link a phone by QR code or pairing code
    Connect {
        #[arg(long)]
        instance: String,
        /// Phone number (with country and area code) to get a pairing code
        /// instead of a QR code
        #[arg(long)]
        number: Option<String>,
        /// Reuse an instance that already exists instead of creating one
        #[arg(long)]
        existing: bool,
    },
    /// Show the connection state of an instance
    Status {
        #[arg(long)]
        instance: String,
    },
    /// Log the number out and delete the instance
    Disconnect {
        #[arg(long)]
        instance: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// # Errors
///
/// Returns an error if the Evolution API is not configured or a call fails.
pub(crate) async fn run_whatsapp(config: &AppConfig, command: WhatsappCommands) -> anyhow::Result<()> {
    let client = WhatsappClient::from_config(config)?;
    let interval = Duration::from_millis(config.poll_interval_ms);

    match command {
        WhatsappCommands::Connect {
            instance,
            number,
            existing,
        } => {
            let inline_qr = if existing {
                None
            } else {
                let info = client.create_instance(&instance).await?;
                println!("created instance {}", info.instance_name);
                info.qr
            };

            if let Some(number) = number {
                match client.pairing_code(&instance, &number).await? {
                    Some(code) => println!(
                        "pairing code: {code}\nWhatsApp > Linked devices > Link with phone number"
                    ),
                    None => anyhow::bail!("Evolution did not return a pairing code; try again"),
                }
            } else {
                let qr = match inline_qr {
                    Some(qr) => qr,
                    None => {
                        client
                            .wait_for_qr_code(&instance, config.qr_max_attempts, interval)
                            .await?
                    }
                };
                println!("{}", describe_qr(&qr));
            }

            let options = PollOptions::every(interval).with_max_attempts(config.qr_max_attempts);
            let mut sub = client.watch_connection(&instance, options);
            let mut last_state = None;
            while let Some(event) = sub.next().await {
                match event {
                    PollEvent::Update { value, .. } => {
                        if last_state != Some(value) {
                            println!("state: {value}");
                            last_state = Some(value);
                        }
                    }
                    PollEvent::Finished { .. } => {
                        println!("connected: {instance} is ready to send campaigns");
                        return Ok(());
                    }
                    PollEvent::Error {
                        retriable: false,
                        message,
                        ..
                    } => anyhow::bail!("cannot read connection state of {instance}: {message}"),
                    PollEvent::Error { attempt, message, .. } => {
                        tracing::warn!(attempt, error = %message, "connection state fetch failed");
                    }
                    PollEvent::Exhausted { .. } => break,
                }
            }
            println!("not connected yet; check again with `whatsapp status --instance {instance}`");
        }
        WhatsappCommands::Status { instance } => {
            let state = client.connection_state(&instance).await?;
            println!("{instance}: {state}");
        }
        WhatsappCommands::Disconnect { instance, yes } => {
            let prompt = format!("Disconnect and delete instance \"{instance}\"?");
            if !dialog_for(yes).confirm(&prompt)?.is_accepted() {
                println!("cancelled");
                return Ok(());
            }
            client.delete_instance(&instance).await?;
            println!("deleted instance {instance}");
        }
    }
    Ok(())
}

fn describe_qr(qr: &QrCode) -> String {
    let mut lines = vec!["scan with WhatsApp > Linked devices > Link a device".to_string()];
    if let Some(code) = qr.code.as_deref() {
        lines.push(format!("qr payload: {code}"));
    }
    if let Some(image) = qr.base64.as_deref() {
        lines.push(format!("qr image: data URL, {} bytes", image.len()));
    }
    if let Some(pairing) = qr.pairing_code.as_deref() {
        lines.push(format!("pairing code: {pairing}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_qr_lists_available_parts() {
        let text = describe_qr(&QrCode {
            base64: None,
            code: Some("2@abc".to_owned()),
            pairing_code: Some("WZYEH1YY".to_owned()),
        });
        assert!(text.contains("qr payload: 2@abc"));
        assert!(text.contains("pairing code: WZYEH1YY"));
        assert!(!text.contains("qr image"));
    }
}
