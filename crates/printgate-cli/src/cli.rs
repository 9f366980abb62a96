use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "printgate")]
#[command(about = "PrintGate CLI: submit and manage print jobs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL (overrides config and PRINTGATE_URL env var)
    #[arg(short, long, global = true, env = "PRINTGATE_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "PRINTGATE_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login(LoginArgs),
    /// End the session and remove the stored token
    Logout,
    /// Show the stored session
    Whoami,
    /// Submit a file to a printer's queue
    Print(PrintArgs),
    /// Show a printer's queue
    Queue(PrinterArgs),
    /// Move a job to the top of a printer's queue
    TopQueue(TopQueueArgs),
    /// Start accepting print jobs
    Start,
    /// Stop accepting print jobs
    Stop,
    /// Clear every queue and start again
    Restart,
    /// Show service state and queue length for a printer
    Status(PrinterArgs),
    /// Read a runtime setting
    ReadConfig(ReadConfigArgs),
    /// Change a runtime setting
    SetConfig(SetConfigArgs),
    /// Check server health
    Health,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long)]
    pub username: String,
    /// Password
    #[arg(long, env = "PRINTGATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct PrintArgs {
    /// Printer name
    pub printer: String,
    /// File to print
    pub file: String,
}

#[derive(clap::Args)]
pub struct PrinterArgs {
    /// Printer name
    pub printer: String,
}

#[derive(clap::Args)]
pub struct TopQueueArgs {
    /// Printer name
    pub printer: String,
    /// Job id
    pub job: u64,
}

#[derive(clap::Args)]
pub struct ReadConfigArgs {
    /// Setting name
    pub key: String,
}

#[derive(clap::Args)]
pub struct SetConfigArgs {
    /// Setting name
    pub key: String,
    /// New value
    pub value: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format)
    pub key: String,
    /// Value
    pub value: String,
}
