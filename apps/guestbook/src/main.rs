use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use client_core::{load_settings, GuestbookClient};
use shared::{
    domain::{format_age, GuestbookEntry},
    protocol::GuestbookEvent,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    message: Option<String>,
    /// Submit to this ledger instead of the simulated one.
    #[arg(long)]
    ledger: Option<String>,
    /// Start from an empty list instead of the demo entries.
    #[arg(long)]
    no_seed: bool,
    /// Connect as this local dev account when using a ledger.
    #[arg(long)]
    dev_account: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if args.ledger.is_some() {
        settings.database_url = args.ledger.clone();
    }
    if args.no_seed {
        settings.seed_mock_entries = false;
    }
    if let Some(index) = args.dev_account {
        settings.dev_account = index;
    }

    let client = GuestbookClient::from_settings(&settings).await?;
    let toasts = tokio::spawn(log_notifications(client.subscribe_events()));

    println!("World Chain Guestbook");
    println!("Connecting wallet...");
    let address = client.connect().await?;
    println!("Connected: {address} ({})", address.short());

    match (args.name.as_deref(), args.message.as_deref()) {
        (Some(name), Some(message)) => {
            client.set_draft_name(name).await?;
            client.set_draft_message(message).await?;
            println!("Adding message...");
            if let Err(error) = client.submit_draft().await {
                warn!(%error, "message was not added");
            }
        }
        (None, None) => {}
        _ => warn!("both --name and --message are needed to add a message"),
    }

    render_entries(&client.list().await, Utc::now());

    client.disconnect().await;
    drop(client);
    if let Err(error) = toasts.await {
        warn!(%error, "notification log task failed");
    }
    Ok(())
}

async fn log_notifications(mut events: tokio::sync::broadcast::Receiver<GuestbookEvent>) {
    loop {
        match events.recv().await {
            Ok(GuestbookEvent::Notification(toast)) if toast.is_destructive() => {
                warn!(title = %toast.title, "{}", toast.description)
            }
            Ok(GuestbookEvent::Notification(toast)) => {
                info!(title = %toast.title, "{}", toast.description)
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "notification log fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn render_entries(entries: &[GuestbookEntry], now: DateTime<Utc>) {
    println!();
    println!("Community Messages [{}]", entries.len());
    if entries.is_empty() {
        println!("No messages yet. Be the first to leave one!");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "({}) {}  {}  {}",
            entry.initial(),
            entry.name,
            entry.address,
            format_age(entry.timestamp, now)
        );
        println!("    {}", entry.message);
        if index + 1 < entries.len() {
            println!("    ---");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::Notification;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn notification_log_ends_cleanly_when_client_is_dropped() {
        let (events, receiver) = broadcast::channel(8);
        let task = tokio::spawn(log_notifications(receiver));
        events
            .send(GuestbookEvent::Notification(Notification::missing_information()))
            .expect("send");
        drop(events);
        task.await.expect("notification log task joins");
    }
}
