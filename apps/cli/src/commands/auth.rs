//! Authentication commands.

use crate::app::AppContext;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, bail, Result};
use session_store::{role_home, User, UserPatch};
use std::io::{self, Write};

/// Login with email and password.
pub async fn login(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    ctx.mount("/login").await;

    let session = ctx.store.snapshot();
    if let (true, Some(user)) = (session.is_authenticated, session.user.as_ref()) {
        output::print_success(&format!("Already logged in as {}", user.email), format);
        return Ok(());
    }

    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim().to_string();
    if email.is_empty() {
        bail!("Email is required");
    }

    // Prompt for password (hidden)
    let password = rpassword::prompt_password("Password: ")?;

    let user = sign_in(ctx, &email, &password).await?;
    output::print_success(
        &format!("Logged in as {} ({})", user.email, user.role),
        format,
    );
    Ok(())
}

/// Authenticate and start push for the role's landing page.
async fn sign_in(ctx: &AppContext, email: &str, password: &str) -> Result<User> {
    if email.is_empty() {
        bail!("Email is required");
    }
    if password.is_empty() {
        bail!("Password is required");
    }

    let user = ctx
        .auth
        .login(email, password)
        .await
        .map_err(|e| anyhow!("Login failed: {}", e))?;
    ctx.push
        .initialize(&ctx.store.snapshot(), role_home(user.role))
        .await;
    Ok(user)
}

/// Logout and clear session.
pub async fn logout(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    ctx.mount("/login").await;

    if !ctx.store.is_authenticated() {
        output::print_success("Not logged in", format);
        return Ok(());
    }

    ctx.push.teardown().await;
    ctx.auth.logout().await;
    output::print_success("Logged out successfully", format);
    Ok(())
}

/// Show the local session.
pub async fn status(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    ctx.mount("/").await;
    let session = ctx.store.snapshot();
    let user = session.user.as_ref().filter(|_| session.is_authenticated);

    match format {
        OutputFormat::Text => {
            println!("API:      {}", ctx.config.api_url);
            match user {
                Some(user) => {
                    println!("Auth:     logged in");
                    println!("User:     {} <{}>", user.full_name(), user.email);
                    println!("Role:     {}", user.role);
                }
                None => println!("Auth:     not logged in"),
            }
            println!("Push:     {:?}", ctx.push.state());
            println!("Theme:    {}", ctx.theme.get());
            println!("Data dir: {}", ctx.paths.base_dir().display());
        }
        OutputFormat::Json => {
            output::print_json(&serde_json::json!({
                "api_url": ctx.config.api_url,
                "logged_in": user.is_some(),
                "user": user,
                "push_state": ctx.push.state(),
                "theme": ctx.theme.get(),
                "data_dir": ctx.paths.base_dir(),
            }))?;
        }
    }
    Ok(())
}

/// Fetch the current profile from the backend.
pub async fn profile(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    ctx.require_session("/profile").await?;
    let user = ctx.client.users().me().await?;
    ctx.store.update_user(UserPatch {
        email: Some(user.email.clone()),
        first_name: Some(user.first_name.clone()),
        last_name: Some(user.last_name.clone()),
        phone: Some(user.phone.clone()),
        role: Some(user.role),
        avatar: user.avatar.clone(),
        is_active: Some(user.is_active),
        last_login: user.last_login.clone(),
    });

    match format {
        OutputFormat::Text => {
            output::print_heading("Profile");
            output::print_row("ID", &user.id);
            output::print_row("Name", &user.full_name());
            output::print_row("Email", &user.email);
            output::print_row("Phone", if user.phone.is_empty() { "-" } else { &user.phone });
            output::print_row("Role", &user.role.to_string());
            output::print_row("Active", if user.is_active { "yes" } else { "no" });
            output::print_row("Joined", &user.date_joined);
            output::print_row("Last login", user.last_login.as_deref().unwrap_or("-"));
        }
        OutputFormat::Json => output::print_json(&user)?,
    }
    Ok(())
}
