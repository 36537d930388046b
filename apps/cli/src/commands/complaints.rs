//! Complaint commands.

use super::parse_backend_enum;
use crate::app::AppContext;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use api_client::{
    Complaint, ComplaintFilter, ComplaintPriority, ComplaintStatus, FeedbackRequest, NewComplaint,
};
use toast_queue::Toast;

const ROUTE: &str = "/complaints";

/// List complaints visible to the signed-in user.
pub async fn complaints_list(
    ctx: &AppContext,
    status: Option<&str>,
    priority: Option<&str>,
    search: Option<String>,
    page: Option<u32>,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session(ROUTE).await?;

    let filter = ComplaintFilter {
        status: status
            .map(|s| parse_backend_enum(s, ComplaintStatus::Unknown, "status"))
            .transpose()?,
        priority: priority
            .map(|p| parse_backend_enum(p, ComplaintPriority::Unknown, "priority"))
            .transpose()?,
        search,
        page,
    };
    let complaints = ctx.client.complaints().list(&filter).await?;

    match format {
        OutputFormat::Text => {
            if complaints.is_empty() {
                println!("No complaints found");
                return Ok(());
            }
            println!(
                "{:<14} {:<32} {:<12} {:<9} {}",
                "Number", "Title", "Status", "Priority", "Assigned"
            );
            println!("{}", "-".repeat(90));
            for complaint in &complaints {
                let number = if complaint.complaint_number.is_empty() {
                    &complaint.id
                } else {
                    &complaint.complaint_number
                };
                println!(
                    "{:<14} {:<32} {:<12} {:<9} {}",
                    number,
                    output::truncate(&complaint.title, 32),
                    complaint.status.to_string(),
                    complaint.priority.to_string(),
                    complaint.assignee_label().unwrap_or_else(|| "-".to_string()),
                );
            }
        }
        OutputFormat::Json => output::print_json(&complaints)?,
    }
    Ok(())
}

/// Show one complaint with its comments.
pub async fn complaints_show(ctx: &AppContext, id: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    let complaint = ctx.client.complaints().get(id).await?;

    match format {
        OutputFormat::Text => print_complaint(&complaint),
        OutputFormat::Json => output::print_json(&complaint)?,
    }
    Ok(())
}

fn print_complaint(complaint: &Complaint) {
    output::print_heading(&complaint.title);
    output::print_row("ID", &complaint.id);
    output::print_row("Number", &complaint.complaint_number);
    output::print_row("Status", &complaint.status.to_string());
    output::print_row("Priority", &complaint.priority.to_string());
    output::print_row("Category", &complaint.category);
    output::print_row(
        "Assigned",
        &complaint.assignee_label().unwrap_or_else(|| "-".to_string()),
    );
    output::print_row("SLA deadline", complaint.sla_deadline.as_deref().unwrap_or("-"));
    if complaint.sla_breached {
        output::print_row("SLA", "breached");
    }
    output::print_row("Created", &complaint.created_at);
    output::print_row("Updated", &complaint.updated_at);
    if let Some(notes) = &complaint.resolution_notes {
        output::print_row("Resolution", notes);
    }

    if !complaint.description.is_empty() {
        println!("\n{}", complaint.description);
    }

    if !complaint.comments.is_empty() {
        output::print_heading("Comments");
        for comment in &complaint.comments {
            let author = comment
                .user
                .as_ref()
                .map(|u| u.full_name())
                .unwrap_or_else(|| "unknown".to_string());
            let internal = if comment.is_internal { " (internal)" } else { "" };
            println!("{} {}{}: {}", comment.created_at, author, internal, comment.content);
        }
    }
}

/// File a new complaint.
pub async fn complaints_create(
    ctx: &AppContext,
    complaint: NewComplaint,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    let created = ctx.client.complaints().create(&complaint).await?;
    ctx.toasts.add(Toast::success(
        "Complaint submitted",
        format!("{} is now {}", created.complaint_number, created.status),
    ));

    match format {
        OutputFormat::Text => output::print_success(&format!("Created complaint {}", created.id), format),
        OutputFormat::Json => output::print_json(&created)?,
    }
    Ok(())
}

/// Parse a priority flag for `complaints create`.
pub fn parse_priority(input: &str) -> Result<ComplaintPriority> {
    parse_backend_enum(input, ComplaintPriority::Unknown, "priority")
}

pub async fn complaints_assign(ctx: &AppContext, id: &str, agent: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    ctx.client.complaints().assign(id, agent).await?;
    output::print_success(&format!("Complaint {} assigned to {}", id, agent), format);
    Ok(())
}

pub async fn complaints_resolve(ctx: &AppContext, id: &str, notes: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    ctx.client.complaints().resolve(id, notes).await?;
    output::print_success(&format!("Complaint {} resolved", id), format);
    Ok(())
}

pub async fn complaints_close(ctx: &AppContext, id: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    ctx.client.complaints().close(id).await?;
    output::print_success(&format!("Complaint {} closed", id), format);
    Ok(())
}

pub async fn complaints_reopen(
    ctx: &AppContext,
    id: &str,
    reason: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    ctx.client.complaints().reopen(id, reason).await?;
    output::print_success(&format!("Complaint {} reopened", id), format);
    Ok(())
}

pub async fn complaints_comment(
    ctx: &AppContext,
    id: &str,
    content: &str,
    internal: bool,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session(ROUTE).await?;
    let comment = ctx.client.complaints().add_comment(id, content, internal).await?;

    match format {
        OutputFormat::Text => output::print_success(&format!("Comment {} added", comment.id), format),
        OutputFormat::Json => output::print_json(&comment)?,
    }
    Ok(())
}

pub async fn complaints_feedback(
    ctx: &AppContext,
    id: &str,
    feedback: FeedbackRequest,
    format: &OutputFormat,
) -> Result<()> {
    if !(1..=5).contains(&feedback.rating) {
        anyhow::bail!("rating must be between 1 and 5");
    }
    ctx.require_session(ROUTE).await?;
    ctx.client.complaints().add_feedback(id, &feedback).await?;
    ctx.toasts.add(Toast::success("Thank you", "Your feedback was recorded"));
    output::print_success(&format!("Feedback submitted for complaint {}", id), format);
    Ok(())
}
