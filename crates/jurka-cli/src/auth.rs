use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use secrecy::SecretString;
use tracing::warn;

use jurka_core::config::ConfigStore;
use jurka_core::credentials::{normalize_base_url, Credential};
use jurka_core::secrets::SecretStore;
use jurka_core::tracker::TrackerClient;
use jurka_core::CoreError;

use crate::context::Context;
use crate::render;

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Save the base URL and bearer token (token goes to the OS keyring)
    Login {
        /// Skip the /myself check after saving
        #[arg(long)]
        no_validate: bool,
    },
    /// Show the current base URL and validate the token
    Whoami,
    /// Forget the stored token for the current base URL
    Logout,
}

pub fn run(ctx: &Context, command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login { no_validate } => login(ctx, no_validate),
        AuthCommand::Whoami => whoami(ctx),
        AuthCommand::Logout => logout(ctx),
    }
}

fn prompt(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("{label} is required");
    }
    Ok(value)
}

/// Read the token without echo, asking twice on a terminal. Piped input is read once.
fn prompt_token() -> Result<SecretString> {
    if !io::stdin().is_terminal() {
        return prompt("Bearer token").map(SecretString::from);
    }
    let first = rpassword::prompt_password("Bearer token: ").context("read token")?;
    let second =
        rpassword::prompt_password("Repeat for confirmation: ").context("read token")?;
    confirm_token(first, second)
}

fn confirm_token(first: String, second: String) -> Result<SecretString> {
    let token = first.trim();
    if token.is_empty() {
        bail!("Bearer token is required");
    }
    if token != second.trim() {
        bail!("the two entered values do not match");
    }
    Ok(SecretString::from(token.to_string()))
}

fn login(ctx: &Context, no_validate: bool) -> Result<()> {
    let raw_url = match ctx.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => url.to_string(),
        None => prompt("Base URL (e.g. https://jira.example.com)")?,
    };
    let base_url = normalize_base_url(&raw_url)?;
    let token = match ctx.token.as_deref().filter(|token| !token.trim().is_empty()) {
        Some(token) => SecretString::from(token.trim().to_string()),
        None => prompt_token()?,
    };

    ctx.config.set(&base_url).context("save base URL")?;
    ctx.secrets
        .set(&base_url, &token)
        .context("store token in keyring")?;

    if no_validate {
        println!("Saved credentials for {base_url}.");
        return Ok(());
    }
    let credential = Credential::new(&base_url, token)?;
    match ctx.tracker()?.myself(&credential) {
        Ok(principal) => {
            println!("Login OK.");
            println!("User: {}", render::principal_line(&principal));
        }
        Err(err) => {
            warn!(base_url = %base_url, "token validation failed after login");
            println!("Saved, but token validation FAILED: {err}");
        }
    }
    Ok(())
}

fn whoami(ctx: &Context) -> Result<()> {
    let credential = ctx.credential()?;
    println!("Base URL: {}", credential.base_url());
    let principal = ctx
        .tracker()?
        .myself(&credential)
        .context("token validation failed")?;
    println!("Token: OK");
    println!("User: {}", render::principal_line(&principal));
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    let base_url = match ctx.base_url() {
        Ok((base_url, _)) => base_url,
        Err(err) => match err.downcast_ref::<CoreError>() {
            Some(CoreError::NoBaseUrl) => {
                println!("No base URL configured.");
                return Ok(());
            }
            _ => return Err(err),
        },
    };
    ctx.secrets
        .delete(&base_url)
        .context("remove token from keyring")?;
    println!("Token cleared for {base_url}");
    Ok(())
}
