mod commands;
mod host;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rollcall-tool", version = "0.1.0")]
#[command(about = "Roster conversion, config encryption and pick simulation for Rollcall")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a spreadsheet export (CSV/TSV) into a roster document
    Convert {
        /// Input file with a header row
        input: PathBuf,
        /// Where to write the JSON document
        output: PathBuf,
        /// Title stored in the document
        #[arg(long, default_value = rollcall_core::constants::DEFAULT_TITLE)]
        title: String,
        /// Indentation width; 0 writes compact JSON
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },
    /// Seal a roster document into an encrypted envelope
    Encrypt {
        /// Plain JSON roster document
        input: PathBuf,
        /// Where to write the envelope
        output: PathBuf,
        /// Prompted for (twice) when omitted
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Open an encrypted envelope and print the document it holds
    Decrypt {
        input: PathBuf,
        /// Prompted for when omitted
        #[arg(long)]
        passphrase: Option<String>,
        /// Optional path to write the document instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run repeated picks against a config file and report pick frequencies
    Simulate {
        /// Plain or encrypted roster document
        config: PathBuf,
        /// Number of picks to perform
        #[arg(long, default_value_t = 1000)]
        picks: usize,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Allow entries to be picked again without clearing history
        #[arg(long)]
        allow_repeats: bool,
        /// Passphrase for encrypted configs
        #[arg(long)]
        passphrase: Option<String>,
        /// Restrict picks to one group
        #[arg(long)]
        group: Option<String>,
        /// Honour the pick delay between picks
        #[arg(long)]
        realtime: bool,
        /// Output report format
        #[arg(long, default_value = "console")]
        #[arg(value_parser = ["json", "console"])]
        report: String,
        /// Optional path to write the report output instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Convert {
            input,
            output,
            title,
            indent,
        } => commands::convert::run(&input, &output, &title, indent),
        Command::Encrypt {
            input,
            output,
            passphrase,
        } => {
            let passphrase = commands::crypt::resolve_passphrase(passphrase, true)?;
            commands::crypt::encrypt_file(&input, &output, &passphrase)
        }
        Command::Decrypt {
            input,
            passphrase,
            output,
        } => {
            let passphrase = commands::crypt::resolve_passphrase(passphrase, false)?;
            commands::crypt::decrypt_file(&input, &passphrase, output)
        }
        Command::Simulate {
            config,
            picks,
            seed,
            allow_repeats,
            passphrase,
            group,
            realtime,
            report,
            output,
        } => {
            if report == "console" && output.is_none() {
                announce_banner();
            }
            let options = commands::simulate::SimulateOptions {
                picks,
                seed,
                allow_repeats,
                passphrase,
                group,
                realtime,
            };
            commands::simulate::run(&config, &options, &report, output).await
        }
    }
}

fn announce_banner() {
    println!("{}", "🎲 Rollcall Pick Simulator".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}
