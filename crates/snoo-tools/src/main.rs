//! Inspect and exercise the Reddit toolset from a shell.
//!
//! Reads credentials from the `REDDIT_CREDENTIALS` environment variable: a
//! JSON object with `client_id`, `client_secret`, `refresh_token`, and
//! `user_agent` (run `snoo creds` for the setup guide).
//!
//! # Examples
//!
//! ```sh
//! # List every tool definition as JSON
//! snoo tools
//!
//! # Call one tool with JSON arguments
//! snoo call reddit_search_posts --args '{"query": "borrow checker", "subreddit": "rust"}'
//!
//! # Verify the configured credentials
//! snoo check
//!
//! # Print the credential setup guide
//! snoo creds
//! ```

use clap::{Parser, Subcommand};
use snoo_tools::credentials::{CredentialSource, REDDIT_CREDENTIAL_SPEC};
use snoo_tools::reddit::client::{REDDIT_API_URL, REDDIT_TOKEN_URL};
use snoo_tools::reddit::RedditClient;
use snoo_tools::tools::core::{DEFAULT_TOOL_TIMEOUT, ToolSet};
use snoo_tools::tools::{RedditAccess, RedditToolsExt};
use std::process;
use tracing_subscriber::EnvFilter;

/// Reddit tools for LLM agents: list, call, and verify from the shell.
#[derive(Parser)]
#[command(name = "snoo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every tool definition as a JSON array
    Tools,
    /// Execute one tool and print its result
    Call {
        /// Tool name, e.g. reddit_search_posts
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Verify the configured credentials against the Reddit API
    Check,
    /// Print the credential setup guide
    Creds,
}

fn reddit_tool_set() -> ToolSet {
    ToolSet::new()
        .with_arg_validation(true)
        .with_default_timeout(Some(DEFAULT_TOOL_TIMEOUT))
        .with_reddit_tools(RedditAccess::new(CredentialSource::Env))
}

fn list_tools() -> Result<String, String> {
    let definitions = reddit_tool_set().definitions();
    serde_json::to_string_pretty(&definitions)
        .map_err(|e| format!("failed to serialize tool definitions: {e}"))
}

/// Run one tool the way a host harness would: schema validation, timeout,
/// and truncation all apply. The result string is the output, including
/// tool-level error maps.
async fn call_tool(name: &str, args: &str) -> Result<String, String> {
    Ok(reddit_tool_set().execute(name, args).await)
}

/// Resolve credentials and probe the identity endpoint.
async fn check_credentials() -> Result<String, String> {
    let credentials = CredentialSource::Env
        .resolve()
        .map_err(|e| format!("{e}. {}", e.help()))?;
    let client = RedditClient::login(&credentials, REDDIT_API_URL, REDDIT_TOKEN_URL)
        .await
        .map_err(|e| format!("authentication failed: {e}"))?;
    let me = client
        .me()
        .await
        .map_err(|e| format!("identity check failed: {e}"))?;
    Ok(format!("Credentials OK: authenticated as u/{}", me.name))
}

fn credential_guide() -> String {
    let spec = &REDDIT_CREDENTIAL_SPEC;
    format!(
        "{}\n\nEnvironment variable: {}\nRequired: {}\nHealth check: {} {}\nUsed by {} tools\n\n{}",
        spec.description,
        spec.env_var,
        if spec.required { "yes" } else { "no" },
        spec.health_check_method,
        spec.health_check_endpoint,
        spec.tools.len(),
        spec.setup_instructions,
    )
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Tools => list_tools(),
        Command::Call { name, args } => call_tool(&name, &args).await,
        Command::Check => check_credentials().await,
        Command::Creds => Ok(credential_guide()),
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
