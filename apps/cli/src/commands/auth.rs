//! Authentication commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use api_client::User;
use auth_gate::AuthGateState;
use std::io::{self, Write};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn prompt_or(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(label),
    }
}

fn display_name(user: Option<&User>, email: &str) -> String {
    match user {
        Some(user) if !user.company_name.is_empty() => {
            format!("{} ({})", user.email, user.company_name)
        }
        Some(user) => user.email.clone(),
        None => email.to_string(),
    }
}

/// Login with email and password.
pub async fn login(ctx: &Context, email: Option<String>, format: &OutputFormat) -> Result<()> {
    if ctx.gate.initialize().await? == AuthGateState::Authenticated {
        let user = ctx.gate.user();
        let name = display_name(user.as_ref(), "unknown");
        output::print_success(&format!("Already logged in as {}", name), format);
        return Ok(());
    }

    let email = prompt_or(email, "Email")?;
    let password = rpassword::prompt_password("Password: ")?;

    if *format == OutputFormat::Text {
        println!("Logging in...");
    }

    match ctx.gate.login(&email, &password).await {
        Ok(user) => {
            let name = display_name(user.as_ref(), &email);
            output::print_success(&format!("Logged in as {}", name), format);
            Ok(())
        }
        Err(e) => anyhow::bail!("Login failed: {}", e.user_message("Invalid email or password")),
    }
}

/// Create an account and sign in.
pub async fn register(
    ctx: &Context,
    email: Option<String>,
    company: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let email = prompt_or(email, "Email")?;
    let company = prompt_or(company, "Company name")?;
    let password = rpassword::prompt_password("Password: ")?;

    match ctx.gate.register(&email, &password, &company).await {
        Ok(user) => {
            let name = display_name(user.as_ref(), &email);
            output::print_success(&format!("Account created. Logged in as {}", name), format);
            Ok(())
        }
        Err(e) => anyhow::bail!(
            "Registration failed: {}",
            e.user_message("Could not create account")
        ),
    }
}

/// Logout and clear session.
pub async fn logout(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.gate.logout()?;
    output::print_success("Logged out successfully", format);
    Ok(())
}

/// Check authentication status.
pub async fn status(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let state = ctx.gate.initialize().await?;
    let user = ctx.gate.user();

    match format {
        OutputFormat::Text => {
            output::print_row("Server", ctx.client().base_url().as_str());
            output::print_row("Config", &ctx.paths.config_file().display().to_string());
            if state.is_authenticated() {
                output::print_row("Auth", "logged in");
                if let Some(user) = &user {
                    output::print_row("Email", &user.email);
                    output::print_row("Company", &user.company_name);
                    output::print_row("User ID", &user.id);
                    if user.is_demo {
                        output::print_row("Account", "demo");
                    }
                }
            } else {
                output::print_row("Auth", "not logged in");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "server": ctx.client().base_url().as_str(),
                "state": state,
                "logged_in": state.is_authenticated(),
                "user": user,
            });
            output::print_json(&json);
        }
    }

    Ok(())
}
