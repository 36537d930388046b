//! CCSMS CLI - Command-line client for the complaint management dashboard.

mod app;
mod commands;
mod output;

use api_client::{FeedbackRequest, NewComplaint};
use clap::{Parser, Subcommand};
use client_config_and_utils::init_logging;
use tracing::debug;

/// CCSMS CLI - Work with complaints and notifications from the terminal.
#[derive(Parser)]
#[command(name = "ccsms")]
#[command(about = "CCSMS client for authentication, complaints and notifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Logout and clear session
    Logout,

    /// Show the local session
    Status,

    /// Show your profile
    Profile,

    /// Manage complaints
    Complaints {
        #[command(subcommand)]
        command: ComplaintCommands,
    },

    /// Manage notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
}

#[derive(Subcommand)]
enum ComplaintCommands {
    /// List complaints
    List {
        /// Filter by status (open, in_progress, resolved, closed, escalated, reopened)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by priority (low, medium, high, critical)
        #[arg(short, long)]
        priority: Option<String>,
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        /// Page number
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show complaint details
    Show {
        /// Complaint ID
        id: String,
    },
    /// File a new complaint
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long, default_value = "medium")]
        priority: String,
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Assign a complaint to an agent
    Assign {
        /// Complaint ID
        id: String,
        /// Agent user ID
        #[arg(short, long)]
        agent: String,
    },
    /// Resolve a complaint
    Resolve {
        /// Complaint ID
        id: String,
        /// Resolution notes
        #[arg(short, long)]
        notes: String,
    },
    /// Close a complaint
    Close {
        /// Complaint ID
        id: String,
    },
    /// Reopen a resolved complaint
    Reopen {
        /// Complaint ID
        id: String,
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Add a comment
    Comment {
        /// Complaint ID
        id: String,
        content: String,
        /// Only visible to staff
        #[arg(long)]
        internal: bool,
    },
    /// Rate how a complaint was handled
    Feedback {
        /// Complaint ID
        id: String,
        /// Overall rating, 1 to 5
        #[arg(short, long)]
        rating: u8,
        #[arg(long)]
        professionalism: Option<u8>,
        #[arg(long)]
        speed: Option<u8>,
        #[arg(short, long)]
        comment: Option<String>,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// List notifications
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,
    },
    /// Mark a notification as read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark all notifications as read
    ReadAll,
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Show the current theme
    Show,
    /// Set the theme (light or dark)
    Set { theme: String },
}

async fn run(cli: Cli, ctx: &app::AppContext) -> anyhow::Result<()> {
    let format = &cli.format;
    match cli.command {
        Commands::Login => commands::login(ctx, format).await,
        Commands::Logout => commands::logout(ctx, format).await,
        Commands::Status => commands::status(ctx, format).await,
        Commands::Profile => commands::profile(ctx, format).await,
        Commands::Complaints { command } => match command {
            ComplaintCommands::List {
                status,
                priority,
                search,
                page,
            } => {
                commands::complaints_list(
                    ctx,
                    status.as_deref(),
                    priority.as_deref(),
                    search,
                    page,
                    format,
                )
                .await
            }
            ComplaintCommands::Show { id } => commands::complaints_show(ctx, &id, format).await,
            ComplaintCommands::Create {
                title,
                description,
                category,
                priority,
                location,
            } => {
                let complaint = NewComplaint {
                    title,
                    description,
                    category,
                    priority: commands::parse_priority(&priority)?,
                    location,
                };
                commands::complaints_create(ctx, complaint, format).await
            }
            ComplaintCommands::Assign { id, agent } => {
                commands::complaints_assign(ctx, &id, &agent, format).await
            }
            ComplaintCommands::Resolve { id, notes } => {
                commands::complaints_resolve(ctx, &id, &notes, format).await
            }
            ComplaintCommands::Close { id } => commands::complaints_close(ctx, &id, format).await,
            ComplaintCommands::Reopen { id, reason } => {
                commands::complaints_reopen(ctx, &id, reason.as_deref(), format).await
            }
            ComplaintCommands::Comment {
                id,
                content,
                internal,
            } => commands::complaints_comment(ctx, &id, &content, internal, format).await,
            ComplaintCommands::Feedback {
                id,
                rating,
                professionalism,
                speed,
                comment,
            } => {
                let feedback = FeedbackRequest {
                    rating,
                    agent_professionalism_rating: professionalism,
                    resolution_speed_rating: speed,
                    comment,
                };
                commands::complaints_feedback(ctx, &id, feedback, format).await
            }
        },
        Commands::Notifications { command } => match command {
            NotificationCommands::List { unread } => {
                commands::notifications_list(ctx, unread, format).await
            }
            NotificationCommands::Read { id } => {
                commands::notifications_read(ctx, &id, format).await
            }
            NotificationCommands::ReadAll => commands::notifications_read_all(ctx, format).await,
        },
        Commands::Theme { command } => match command {
            ThemeCommands::Show => commands::theme_show(ctx, format),
            ThemeCommands::Set { theme } => commands::theme_set(ctx, &theme, format),
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging("cli", &cli.log_level, false);

    let format = cli.format;
    let ctx = match app::AppContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            output::print_error(&format!("{:#}", e), &format);
            std::process::exit(1);
        }
    };

    let result = run(cli, &ctx).await;
    output::print_toasts(&ctx.toasts.snapshot(), &format);

    if let Err(e) = result {
        debug!(error = %e, "Command failed");
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}
