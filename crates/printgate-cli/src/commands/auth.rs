use anyhow::{Context, Result};
use colored::Colorize;

use crate::auth::{self, StoredSession};
use crate::cli::LoginArgs;
use crate::client::PrintgateClient;
use crate::output::{print_error, print_success};

pub async fn login(server: &str, args: &LoginArgs, profile: &str) -> Result<()> {
    let client = PrintgateClient::new(server, None)?;
    let session = client.login(&args.username, &args.password).await?;

    let token = session
        .get("token")
        .and_then(|v| v.as_str())
        .context("Server returned no session token")?;
    let expires_at = session
        .get("expires_at")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    let stored = StoredSession {
        server: server.to_string(),
        username: args.username.clone(),
        token: token.to_string(),
        expires_at: expires_at.to_string(),
    };
    auth::save_session(profile, &stored)?;
    print_success(&format!(
        "Logged in to {} as {} (session expires {})",
        server.cyan(),
        args.username.cyan(),
        expires_at
    ));
    Ok(())
}

pub async fn logout(profile: &str) -> Result<()> {
    let Some(session) = auth::load_session(profile)? else {
        println!("No session found for profile \"{profile}\"");
        return Ok(());
    };

    let client = PrintgateClient::new(&session.server, Some(session.token.clone()))?;
    if let Err(e) = client.logout().await {
        // The local token is removed regardless; it expires server-side.
        print_error(&format!("Server logout failed: {e:#}"));
    }
    auth::remove_session(profile)?;
    print_success("Logged out (session removed)");
    Ok(())
}

pub fn whoami(profile: &str) -> Result<()> {
    match auth::load_session(profile)? {
        Some(session) => {
            println!("{}: {}", "Profile".cyan(), profile);
            println!("{}: {}", "Server".cyan(), session.server.cyan());
            println!("{}: {}", "User".cyan(), session.username);
            println!("{}: {}", "Token".cyan(), session.token_preview());
            println!("{}: {}", "Expires".cyan(), session.expires_at);
        }
        None => {
            print_error(&format!("Not logged in (profile: \"{profile}\")"));
        }
    }
    Ok(())
}
