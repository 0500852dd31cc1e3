//! Configuration for fee-ledger
//!
//! CLI arguments with environment variable fallbacks (clap). A `.env` file is
//! loaded by the binaries before parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::DEFAULT_PASSWORD;
use crate::reminder::DEFAULT_WHATSAPP_NUMBER;
use crate::service::LedgerSettings;
use crate::store::DEFAULT_STORAGE_KEY;
use crate::student::default_class_options;

/// Settings shared by the dashboard and the API server.
#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    /// SQLite file holding the student collection
    #[arg(long, env = "FEE_LEDGER_DB", default_value = "fee-ledger.db")]
    pub db_path: PathBuf,

    /// Key of the storage slot the collection lives under
    #[arg(long, env = "FEE_LEDGER_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Shared operator password
    #[arg(long, env = "FEE_LEDGER_PASSWORD", default_value = DEFAULT_PASSWORD, hide_default_value = true)]
    pub password: String,

    /// WhatsApp number reminders are sent to (international format, no '+')
    #[arg(long, env = "FEE_LEDGER_WHATSAPP", default_value = DEFAULT_WHATSAPP_NUMBER)]
    pub whatsapp_number: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl LedgerArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        if self.storage_key.trim().is_empty() {
            return Err("storage key must not be empty".to_string());
        }
        if self.whatsapp_number.is_empty()
            || !self.whatsapp_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!(
                "WhatsApp number must be digits only without '+', got {:?}",
                self.whatsapp_number
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> LedgerSettings {
        LedgerSettings {
            class_options: default_class_options(),
            whatsapp_number: self.whatsapp_number.clone(),
        }
    }

    /// Log file used while the terminal dashboard owns the screen.
    pub fn log_path(&self) -> PathBuf {
        self.db_path.with_extension("log")
    }
}

/// fee-ledger - school fee tracking dashboard
#[derive(Parser, Debug)]
#[command(name = "fee-ledger")]
#[command(about = "Track school fees, dues and WhatsApp reminders")]
pub struct Cli {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Tui,

    /// Print totals and the per-class breakdown
    Stats,

    /// List students, optionally filtered
    List {
        /// Case-insensitive name search
        #[arg(long, short)]
        query: Option<String>,

        /// Only this class
        #[arg(long, short)]
        class: Option<String>,
    },

    /// List students with pending fees
    Due,

    /// Add a student
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        total: f64,
        #[arg(long)]
        paid: f64,
    },

    /// Replace a student's details
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        total: f64,
        #[arg(long)]
        paid: f64,
    },

    /// Remove a student
    Remove {
        #[arg(long)]
        id: String,
    },

    /// Print the WhatsApp reminder link
    Remind {
        /// Open the link with the system browser
        #[arg(long)]
        open: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["fee-ledger"]);

        assert_eq!(cli.command, None);
        assert_eq!(cli.ledger.db_path, PathBuf::from("fee-ledger.db"));
        assert_eq!(cli.ledger.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(cli.ledger.whatsapp_number, DEFAULT_WHATSAPP_NUMBER);
        assert_eq!(cli.ledger.log_path(), PathBuf::from("fee-ledger.log"));
        assert!(cli.ledger.validate().is_ok());
    }

    #[test]
    fn test_add_subcommand() {
        let cli = parse(&[
            "fee-ledger", "add", "--name", "Rahul Patil", "--class", "7th", "--total", "5000",
            "--paid", "3000",
        ]);

        assert_eq!(
            cli.command,
            Some(Command::Add {
                name: "Rahul Patil".to_string(),
                class: "7th".to_string(),
                total: 5000.0,
                paid: 3000.0,
            })
        );
    }

    #[test]
    fn test_validate_rejects_plus_prefixed_number() {
        let cli = parse(&["fee-ledger", "--whatsapp-number", "+919834252755"]);
        assert!(cli.ledger.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_password() {
        let cli = parse(&["fee-ledger", "--password", ""]);
        assert!(cli.ledger.validate().is_err());
    }

    #[test]
    fn test_settings_carry_number_and_classes() {
        let cli = parse(&["fee-ledger", "--whatsapp-number", "911234567890"]);
        let settings = cli.ledger.settings();

        assert_eq!(settings.whatsapp_number, "911234567890");
        assert_eq!(settings.class_options.len(), 6);
    }
}
