//! `votelink`: wallet-contract session client for the Vote DApp.
//!
//! Provides four subcommands:
//!
//! - **`session`**: find a node, read its accounts, bind the voting contract
//!   and report whether the active account is the owner or a voter.
//! - **`call`**: establish a session, then run one read-only contract method.
//! - **`abi`**: list the functions of the bound interface.
//! - **`address`**: print the checksum and display forms of an address.
//!
//! # Environment variables
//!
//! See [`config::CliConfig`] for the full list. Log verbosity follows
//! `RUST_LOG` (default `votelink=info`); logs go to stderr.

mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use votelink::abi::mutability_name;
use votelink::artifacts::VOTING_ARTIFACT;
use votelink::{
    codec, display_address, Abi, AccountAddress, Address, DynSolValue, Session,
    SessionAssembler, SessionSummary,
};
use votelink_rpc::{client_with_timeout, HttpLocator};

use config::CliConfig;

/// votelink: wallet-contract session client
///
/// Resolve who is connected to the voting contract and what they may do.
#[derive(Parser)]
#[command(name = "votelink", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags that take precedence over the environment.
#[derive(Args)]
struct Overrides {
    /// JSON-RPC endpoint to probe. Repeat to give fallbacks, tried in order.
    #[arg(long = "rpc-url", value_name = "URL", global = true)]
    rpc_urls: Vec<String>,

    /// Address of the deployed voting contract.
    #[arg(long, value_name = "ADDRESS", global = true)]
    contract: Option<String>,

    /// Path to an ABI array or build artifact describing the contract.
    #[arg(long, value_name = "FILE", global = true)]
    abi: Option<PathBuf>,

    /// Seconds to wait for each JSON-RPC request.
    #[arg(long, value_name = "SECS", global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Establish a session and print who is connected.
    ///
    /// Exits 0 on success and 1 if any stage fails; the failure detail is
    /// logged to stderr.
    Session {
        /// Print the session as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Establish a session, then call one read-only contract method.
    ///
    /// Outputs are printed as a JSON array. Integers are decimal strings.
    ///
    /// Examples:
    ///   votelink call workflowStatus
    ///   votelink call getVoter 0x1111111111111111111111111111111111111111
    Call {
        /// Method name, e.g. `owner` or `getOneProposal`.
        method: String,

        /// Arguments in declaration order.
        args: Vec<String>,
    },

    /// List the functions of the contract interface.
    Abi {
        /// Read this ABI or artifact file instead of the configured one.
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Print the checksum and display forms of an address.
    Address {
        /// `0x` followed by 40 hex digits.
        address: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "votelink=info,votelink_rpc=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = apply(
        CliConfig::from_env().unwrap_or_else(|e| fatal(&e)),
        cli.overrides,
    );

    match cli.command {
        Command::Session { json } => {
            let session = establish(&config).await;
            let summary = session.summary();
            if json {
                println!("{}", to_pretty(&summary));
            } else {
                print!("{}", render_summary(&summary));
            }
        }

        Command::Call { method, args } => {
            let session = establish(&config).await;
            let values = parse_args(session.contract().abi(), &method, &args);
            match session.contract().call(&method, &values).await {
                Ok(outputs) => {
                    let json = Value::Array(outputs.iter().map(codec::to_json).collect());
                    println!("{}", to_pretty(&json));
                }
                Err(e) => {
                    tracing::warn!("call {method} failed: {e}");
                    eprintln!("votelink: call to {method} failed: {e}");
                    process::exit(1);
                }
            }
        }

        Command::Abi { file } => {
            let path = file.or(config.abi_path);
            let abi = Abi::from_json(&read_interface(path.as_deref()))
                .unwrap_or_else(|e| fatal(&format!("invalid interface: {e}")));
            print!("{}", render_functions(&abi));
        }

        Command::Address { address } => {
            let parsed = Address::parse(&address).unwrap_or_else(|e| fatal(&e.to_string()));
            println!("checksum  {parsed}");
            println!("display   {}", display_address(&AccountAddress::from(parsed)));
        }
    }
}

fn apply(mut config: CliConfig, overrides: Overrides) -> CliConfig {
    if !overrides.rpc_urls.is_empty() {
        config.rpc_urls = overrides.rpc_urls;
    }
    if let Some(contract) = overrides.contract {
        config.contract = contract;
    }
    if let Some(abi) = overrides.abi {
        config.abi_path = Some(abi);
    }
    if let Some(secs) = overrides.timeout_secs {
        config.timeout = std::time::Duration::from_secs(secs);
    }
    config
}

/// Run the session stages, or report the failure and exit 1.
async fn establish(config: &CliConfig) -> Session {
    let client: reqwest::Client = client_with_timeout(config.timeout)
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {e}")));
    let locator = HttpLocator::new(client, config.rpc_urls.iter().cloned());
    let assembler = SessionAssembler::from_json(
        Arc::new(locator),
        config.contract.clone(),
        read_interface(config.abi_path.as_deref()),
    );

    match assembler.establish().await {
        Ok(session) => session,
        Err(failure) => {
            // The assembler has already logged the kind and cause.
            eprintln!("{}", failure.user_message());
            process::exit(1);
        }
    }
}

/// Read the interface JSON at `path`, or the bundled artifact.
fn read_interface(path: Option<&Path>) -> String {
    match path {
        Some(path) => fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display()))),
        None => VOTING_ARTIFACT.to_string(),
    }
}

/// Parse `raw` against the inputs of `method` with that many arguments.
fn parse_args(abi: &Abi, method: &str, raw: &[String]) -> Vec<DynSolValue> {
    let function = abi.function(method, raw.len()).unwrap_or_else(|| {
        if abi.has_function(method) {
            fatal(&format!("{method} does not take {} argument(s)", raw.len()))
        } else {
            fatal(&format!("the interface has no method '{method}'"))
        }
    });
    codec::parse_args(function, raw).unwrap_or_else(|e| fatal(&e.to_string()))
}

fn render_summary(summary: &SessionSummary) -> String {
    let role = match summary.role {
        votelink::Role::Owner => "owner",
        votelink::Role::Voter => "voter",
    };
    let mut out = String::new();
    out.push_str(&format!(
        "account   {} ({})\n",
        summary.display_address, summary.active_account
    ));
    out.push_str(&format!("role      {role}\n"));
    out.push_str(&format!("contract  {}\n", summary.contract));
    out.push_str(&format!("provider  {}\n", summary.provider));
    if summary.accounts.len() > 1 {
        out.push_str(&format!("accounts  {} available\n", summary.accounts.len()));
    }
    out
}

fn render_functions(abi: &Abi) -> String {
    let mut out = String::new();
    for f in abi.functions() {
        out.push_str(&format!(
            "{}  {}  {}\n",
            f.selector(),
            f.signature(),
            mutability_name(f.state_mutability)
        ));
    }
    out
}

fn to_pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fatal(&e.to_string()))
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("votelink: {msg}");
    process::exit(2);
}
