//! Reddit tools for LLM function-calling agents.
//!
//! `snoo-tools` exposes Reddit's REST API as a set of agent tools: each tool
//! validates its inputs, authenticates against Reddit with OAuth 2.0 refresh
//! tokens, performs one API call, and returns a flat JSON object the model
//! can read back. The tools implement the [`Tool`](tools::core::Tool) trait
//! and are collected into a [`ToolSet`](tools::core::ToolSet) that handles
//! dispatch, JSON Schema argument validation, result truncation, and
//! timeouts.
//!
//! # Getting started
//!
//! Add `snoo-tools` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! snoo-tools = { path = "../snoo-tools" }
//! ```
//!
//! Then register the tools and execute calls:
//!
//! ```ignore
//! use snoo_tools::credentials::CredentialSource;
//! use snoo_tools::tools::{RedditAccess, RedditToolsExt};
//! use snoo_tools::tools::core::ToolSet;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Credentials come from the REDDIT_CREDENTIALS env var (a JSON
//!     // object) or from a CredentialStore your host already manages.
//!     let access = RedditAccess::new(CredentialSource::Env);
//!
//!     let tools = ToolSet::new()
//!         .with_arg_validation(true)
//!         .with_reddit_tools(access);
//!
//!     // Export definitions for the LLM API.
//!     let defs = tools.definitions();
//!
//!     // Dispatch a call the model made.
//!     let result = tools
//!         .execute("reddit_search_posts", r#"{"query": "borrow checker"}"#)
//!         .await;
//!     println!("{result}");
//! }
//! ```
//!
//! # Where to find things
//!
//! If you're looking for how to...
//!
//! - **Register the Reddit tools:** see
//!   [`RedditToolsExt::with_reddit_tools`](tools::RedditToolsExt) and the
//!   per-tool structs in [`tools::search`], [`tools::content`],
//!   [`tools::engagement`], and [`tools::moderation`].
//!
//! - **Configure credentials:** see
//!   [`CredentialSource`](credentials::CredentialSource) for env-var vs
//!   credential-store resolution, and
//!   [`REDDIT_CREDENTIAL_SPEC`](credentials::REDDIT_CREDENTIAL_SPEC) for the
//!   declarative requirements table (env var name, setup guide, health-check
//!   endpoint).
//!
//! - **Call Reddit directly:** see [`RedditClient`](reddit::client::RedditClient),
//!   the thin OAuth2 client the tools construct per invocation.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tools`] | [`Tool`](tools::core::Tool) trait, [`ToolSet`](tools::core::ToolSet), the 18 Reddit tools, registration extension |
//! | [`reddit`] | [`RedditClient`](reddit::client::RedditClient), wire models, result serializers |
//! | [`credentials`] | Credential spec, sources, and validation |
//!
//! # Design principles
//!
//! 1. **Tools are the unit of capability.** Every operation is a
//!    [`Tool`](tools::core::Tool) implementor with a JSON Schema definition
//!    and an async `execute` method. Adding a capability means implementing
//!    one trait.
//!
//! 2. **Validate before the network.** Length bounds and argument conflicts
//!    are checked before credentials are resolved and before any request is
//!    sent. Numeric limits are clamped into range, never rejected.
//!
//! 3. **Errors are results, not panics.** Every failure — bad input, missing
//!    credentials, upstream API error — comes back as a JSON object with an
//!    `error` field the model can read and act on.
//!
//! 4. **No hidden state.** A fresh [`RedditClient`](reddit::client::RedditClient)
//!    is constructed for every invocation; nothing is pooled, cached, or
//!    retried behind the caller's back.

pub mod credentials;
pub mod reddit;
pub mod tools;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Re-export the registration surface for convenience.
pub use tools::{RedditAccess, RedditToolsExt};

// Re-export schemars for downstream crates.
pub use schemars;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. This is the bridge between strong Rust types
/// and the `serde_json::Value` that the function-calling API expects.
///
/// # Example
///
/// ```
/// use snoo_tools::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct SearchArgs {
///     query: String,
///     #[serde(default)]
///     subreddit: Option<String>,
/// }
///
/// let schema = json_schema_for::<SearchArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"query".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Tool definition types ──────────────────────────────────────────

/// The type of a tool definition. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Tool definition sent to the LLM API (OpenAI function-calling format).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

impl ToolDef {
    /// Create a function-calling tool definition.
    ///
    /// This is the standard constructor — `ToolType` is always `Function` in
    /// the current API, so there's no reason to specify it manually.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}
