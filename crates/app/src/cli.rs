//! Command line definitions for the `quizbot` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quiz_core::model::QuestionId;

/// Run a question-by-question quiz over a messaging webhook.
#[derive(Parser)]
#[command(name = "quizbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "quizbot.toml")]
    pub config: PathBuf,

    /// SQLite URL for the question catalog (overrides the config file).
    #[arg(long, global = true, env = "QUIZBOT_DB_URL")]
    pub db: Option<String>,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the messaging webhook.
    Serve {
        #[arg(long, env = "QUIZBOT_HOST")]
        host: Option<String>,

        #[arg(long, env = "QUIZBOT_PORT")]
        port: Option<u16>,
    },

    /// Take the quiz from the terminal, one line per message.
    Chat {
        /// Sender id to play as.
        #[arg(long, default_value = "cli")]
        sender: String,
    },

    /// Append the questions from a TOML file to the catalog.
    Seed { file: PathBuf },

    /// Print the catalog in quiz order.
    #[command(alias = "ls")]
    List,

    /// Remove a question from the catalog.
    Delete { id: QuestionId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["quizbot", "-v", "serve", "--port", "8080"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::Serve { port: Some(8080), .. }
        ));
    }

    #[test]
    fn parses_delete_id() {
        let cli = Cli::try_parse_from(["quizbot", "delete", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { id } if id == QuestionId::new(7)));
        assert!(Cli::try_parse_from(["quizbot", "delete", "seven"]).is_err());
    }
}
