use anyhow::Result;
use colored::Colorize;

use crate::cli::OutputFormat;
use crate::client::PrintgateClient;
use crate::output::{print_error, print_json, print_success};

/// Runs `start`, `stop` or `restart` against the service.
pub async fn control(client: &PrintgateClient, action: &str, format: OutputFormat) -> Result<()> {
    let state = client.service(action).await?;
    if format == OutputFormat::Json {
        return print_json(&state);
    }
    let message = match action {
        "start" => "Print service started",
        "stop" => "Print service stopped",
        "restart" => "Print service restarted, all queues cleared",
        _ => "Done",
    };
    print_success(message);
    Ok(())
}

pub async fn health(client: &PrintgateClient, server: &str) -> Result<()> {
    let (status, body) = client.health().await?;
    if (200..300).contains(&status) {
        print_success(&format!("Server {} is healthy ({})", server.cyan(), body.trim()));
    } else {
        print_error(&format!("Server {} returned HTTP {status}", server.cyan()));
        anyhow::bail!("Health check failed");
    }
    Ok(())
}
