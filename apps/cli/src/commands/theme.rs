//! Theme preference commands.

use crate::app::AppContext;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use session_store::Theme;

pub fn theme_show(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let theme = ctx.theme.get();
    match format {
        OutputFormat::Text => println!("{}", theme),
        OutputFormat::Json => output::print_json(&serde_json::json!({ "theme": theme }))?,
    }
    Ok(())
}

pub fn theme_set(ctx: &AppContext, theme: &str, format: &OutputFormat) -> Result<()> {
    let theme: Theme = theme.parse().map_err(anyhow::Error::msg)?;
    ctx.theme.set(theme);
    output::print_success(&format!("Theme set to {}", theme), format);
    Ok(())
}
