use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jurka_core::CoreError;

mod auth;
mod browser;
mod context;
mod editor;
mod issue;
mod render;

use context::Context;

#[derive(Parser)]
#[command(name = "jurka", version, about = "Jira CLI using bearer-token auth")]
struct Cli {
    /// Override the saved base URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override the stored bearer token
    #[arg(long, global = true)]
    token: Option<String>,
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: auth::AuthCommand,
    },
    /// Work with issues
    Issue {
        #[command(subcommand)]
        command: issue::IssueCommand,
    },
    /// Print version information
    Version,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("JURKA_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };
    match command {
        Command::Version => {
            println!("jurka {}", jurka_core::version());
            Ok(())
        }
        Command::Auth { command } => auth::run(&Context::new(cli.base_url, cli.token)?, command),
        Command::Issue { command } => {
            issue::run(&Context::new(cli.base_url, cli.token)?, command)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        if let Some(CoreError::AmbiguousIdentity { candidates, .. }) =
            err.downcast_ref::<CoreError>()
        {
            eprintln!("Refine the query, pass --account-id, or pass --first.");
            eprint!("{}", render::user_table(candidates));
        }
        std::process::exit(1);
    }
}
