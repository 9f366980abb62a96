mod auth;
mod cli;
mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;

use cli::{Cli, Commands, OutputFormat};
use client::PrintgateClient;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let profile = &cli.profile;
    let format = resolve_format(cli.format, profile)?;

    match &cli.command {
        Commands::Login(args) => {
            let server = config::resolve_server(&cli.server, profile)?;
            commands::auth::login(&server, args, profile).await?;
        }
        Commands::Logout => {
            commands::auth::logout(profile).await?;
        }
        Commands::Whoami => {
            commands::auth::whoami(profile)?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    cfg.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("table")
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                match set_args.key.as_str() {
                    "server" => cfg.server = Some(set_args.value.clone()),
                    "format" => {
                        parse_format(&set_args.value)?;
                        cfg.format = Some(set_args.value.clone());
                    }
                    other => {
                        anyhow::bail!("Unknown config key: {other}. Valid keys: server, format")
                    }
                }
                config::save_profile(profile, cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Health => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = make_client(&server, profile)?;
            commands::service::health(&client, &server).await?;
        }
        Commands::Print(args) => {
            let client = connect(&cli.server, profile)?;
            commands::queue::print(&client, &args.printer, &args.file, format).await?;
        }
        Commands::Queue(args) => {
            let client = connect(&cli.server, profile)?;
            commands::queue::queue(&client, &args.printer, format).await?;
        }
        Commands::TopQueue(args) => {
            let client = connect(&cli.server, profile)?;
            commands::queue::top_queue(&client, &args.printer, args.job).await?;
        }
        Commands::Status(args) => {
            let client = connect(&cli.server, profile)?;
            commands::queue::status(&client, &args.printer, format).await?;
        }
        Commands::Start => {
            let client = connect(&cli.server, profile)?;
            commands::service::control(&client, "start", format).await?;
        }
        Commands::Stop => {
            let client = connect(&cli.server, profile)?;
            commands::service::control(&client, "stop", format).await?;
        }
        Commands::Restart => {
            let client = connect(&cli.server, profile)?;
            commands::service::control(&client, "restart", format).await?;
        }
        Commands::ReadConfig(args) => {
            let client = connect(&cli.server, profile)?;
            commands::settings::read_config(&client, &args.key, format).await?;
        }
        Commands::SetConfig(args) => {
            let client = connect(&cli.server, profile)?;
            commands::settings::set_config(&client, &args.key, &args.value).await?;
        }
    }

    Ok(())
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(value, true)
        .map_err(|_| anyhow::anyhow!("Unknown output format: {value}. Valid formats: table, json"))
}

/// `--format` wins over the profile's stored format.
fn resolve_format(flag: Option<OutputFormat>, profile: &str) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match config::load_profile(profile)?.format {
        Some(stored) => parse_format(&stored),
        None => Ok(OutputFormat::default()),
    }
}

fn connect(cli_server: &Option<String>, profile: &str) -> Result<PrintgateClient> {
    let server = config::resolve_server(cli_server, profile)?;
    make_client(&server, profile)
}

fn make_client(server: &str, profile: &str) -> Result<PrintgateClient> {
    let token = auth::load_session(profile)?.map(|s| s.token);
    PrintgateClient::new(server, token)
}
