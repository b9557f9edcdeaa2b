//! Authentication and profile commands.

use super::{prompt, prompt_password};
use crate::output::{self, OutputFormat};
use allowance_api::{AllowanceClient, AuthResponse, RegisterParentRequest, UpdateProfileRequest};
use anyhow::Result;

/// Which login endpoint to use.
#[derive(Debug, Clone, Copy)]
pub enum LoginAs {
    Parent,
    Child,
}

/// Sign in, prompting for missing credentials, and print the issued tokens.
///
/// Nothing is persisted; pass the tokens back with `--access-token` and
/// `--refresh-token` (or the matching environment variables).
pub async fn login(
    client: &AllowanceClient,
    role: LoginAs,
    email: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = prompt_password("Password: ")?;

    let auth = match role {
        LoginAs::Parent => client.login_parent(&email, &password).await?,
        LoginAs::Child => client.login_child(&email, &password).await?,
    };
    print_auth(&auth, format);
    Ok(())
}

/// Register a parent account, prompting for the password.
pub async fn register(
    client: &AllowanceClient,
    email: String,
    first_name: String,
    last_name: String,
    format: &OutputFormat,
) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let auth = client
        .register_parent(RegisterParentRequest {
            email,
            password,
            first_name,
            last_name,
        })
        .await?;
    print_auth(&auth, format);
    Ok(())
}

/// Revoke the refresh token and sign out.
pub async fn logout(client: &AllowanceClient, format: &OutputFormat) -> Result<()> {
    client.logout().await?;
    output::print_success("Logged out", format);
    Ok(())
}

/// Show the profile, updating it first when any field is given.
pub async fn me(
    client: &AllowanceClient,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let update = UpdateProfileRequest {
        first_name,
        last_name,
        email,
    };
    let profile = if update.is_empty() {
        client.get_profile().await?
    } else {
        client.update_profile(update).await?
    };

    match format {
        OutputFormat::Json => output::print_json(&profile),
        OutputFormat::Text => {
            output::print_heading(&profile.full_name);
            output::print_row("ID", &profile.id);
            output::print_row("Email", &profile.email);
            if let Some(allowance) = profile.monthly_allowance {
                output::print_row("Allowance", &output::money(allowance));
            }
            if let Some(balance) = profile.current_balance {
                output::print_row("Balance", &output::money(balance));
            }
            if let Some(points) = profile.points {
                output::print_row("Points", &points.to_string());
            }
        }
    }
    Ok(())
}

fn print_auth(auth: &AuthResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(auth),
        OutputFormat::Text => {
            println!("Logged in as {} ({})", auth.email, auth.role);
            output::print_row("Access token", &auth.token);
            if let Some(refresh_token) = &auth.refresh_token {
                output::print_row("Refresh token", refresh_token);
            }
            if let Some(expires_at) = &auth.refresh_token_expires_at {
                output::print_row("Refresh expires", expires_at);
            }
        }
    }
}
