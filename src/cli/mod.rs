pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "keel")]
#[command(about = "Keel CLI - operations companion for the Keel API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check server health, exit 1 when unhealthy")]
    Health {
        #[arg(
            long,
            default_value = "http://localhost:3000",
            help = "Base URL of the running server"
        )]
        url: String,
    },

    #[command(about = "Create demo users")]
    Seed {
        #[arg(long, default_value_t = 5, help = "How many demo users to create")]
        count: u32,

        #[arg(
            long,
            default_value = "http://localhost:3000",
            help = "Base URL of the running server"
        )]
        url: String,

        #[arg(long, help = "Write straight to DATABASE_URL instead of going through the API")]
        direct: bool,
    },

    #[command(about = "Soft-delete every user in the store")]
    Clear {
        #[arg(long, help = "Confirm the wipe")]
        yes: bool,
    },

    #[command(about = "Print the API documentation")]
    Docs,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Health { url } => commands::health::handle(&url, output_format).await,
        Commands::Seed { count, url, direct } => {
            commands::seed::handle(count, &url, direct, output_format).await
        }
        Commands::Clear { yes } => commands::clear::handle(yes, output_format).await,
        Commands::Docs => commands::docs::handle(output_format).await,
    }
}
