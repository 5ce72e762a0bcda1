pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "frontdesk",
    about = "Front desk operator CLI",
    long_about = "Inspect configuration, check readiness, seed hotel data, and talk to the \
                  front desk agent from a terminal.",
    after_help = "Examples:\n  frontdesk doctor --json\n  frontdesk seed --force\n  \
                  frontdesk chat --message \"do you have a suite available\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, hotel data, and provider credentials")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write the demo hotel data file and verify its contents")]
    Seed {
        #[arg(long, help = "Overwrite an existing data file")]
        force: bool,
    },
    #[command(about = "Chat with the front desk agent against the configured hotel data")]
    Chat {
        #[arg(long, default_value = "cli", help = "Conversation session id")]
        session: String,
        #[arg(long, help = "Send one message and exit instead of reading stdin")]
        message: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Seed { force } => commands::seed::run(force),
        Command::Chat { session, message } => commands::chat::run(&session, message.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
