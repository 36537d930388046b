//! Notification commands.

use crate::app::AppContext;
use crate::output::{self, OutputFormat};
use anyhow::Result;

const ROUTE: &str = "/notifications";

/// List in-app notifications.
pub async fn notifications_list(ctx: &AppContext, unread: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;

    let inbox = ctx.inbox.refresh().await;
    let notifications: Vec<_> = inbox
        .notifications
        .iter()
        .filter(|n| !unread || !n.is_read)
        .collect();

    match format {
        OutputFormat::Text => {
            println!("{} unread", inbox.unread_count);
            if notifications.is_empty() {
                println!("No notifications");
                return Ok(());
            }
            println!("{:<8} {:<4} {:<20} {}", "ID", "New", "Sent", "Title");
            println!("{}", "-".repeat(80));
            for n in notifications {
                println!(
                    "{:<8} {:<4} {:<20} {}",
                    n.id,
                    if n.is_read { "" } else { "*" },
                    output::truncate(&n.sent_at, 20),
                    n.title
                );
            }
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "unread_count": inbox.unread_count,
            "notifications": notifications,
        }))?,
    }
    Ok(())
}

/// Mark one notification as read.
pub async fn notifications_read(ctx: &AppContext, id: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    ctx.client.notifications().mark_read(id).await?;
    output::print_success(&format!("Notification {} marked as read", id), format);
    Ok(())
}

/// Mark every notification as read.
pub async fn notifications_read_all(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    ctx.client.notifications().mark_all_read().await?;
    output::print_success("All notifications marked as read", format);
    Ok(())
}
