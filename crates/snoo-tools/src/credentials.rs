//! Credential requirements, sources, and validation.
//!
//! Every Reddit tool resolves credentials at invocation time from a
//! [`CredentialSource`]: either a host-managed [`CredentialStore`] (looked up
//! under the fixed id `"reddit"`) or the `REDDIT_CREDENTIALS` environment
//! variable holding a JSON object. Both paths yield the same four-field
//! [`RedditCredentials`]; nothing is cached between calls.
//!
//! [`REDDIT_CREDENTIAL_SPEC`] is the declarative requirements table a host
//! can surface to operators: which env var to set, which tools depend on it,
//! how to obtain credentials, and which endpoint verifies them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the JSON credential object.
pub const REDDIT_CREDENTIALS_ENV: &str = "REDDIT_CREDENTIALS";

/// Fixed id the tools use for credential-store lookups.
pub const REDDIT_CREDENTIAL_ID: &str = "reddit";

/// The four fields every credential object must carry.
pub const REQUIRED_FIELDS: &[&str] = &["client_id", "client_secret", "refresh_token", "user_agent"];

// ── Credential spec ────────────────────────────────────────────────

/// Declarative credential requirements: configuration, not runtime state.
///
/// Hosts use this to tell operators what to configure and to run a health
/// check before enabling the tools.
#[derive(Debug, Clone)]
pub struct CredentialSpec {
    /// Environment variable the credentials are read from.
    pub env_var: &'static str,
    /// Tools that require this credential.
    pub tools: &'static [&'static str],
    /// Whether the credential is required for the tools to function.
    pub required: bool,
    /// Whether the host must verify the credential at startup.
    pub startup_required: bool,
    /// Where to obtain credentials.
    pub help_url: &'static str,
    /// One-line description of the credential.
    pub description: &'static str,
    /// Step-by-step setup guide for operators.
    pub setup_instructions: &'static str,
    /// Endpoint a host can probe to verify the credential works.
    pub health_check_endpoint: &'static str,
    /// HTTP method for the health check.
    pub health_check_method: &'static str,
    /// Credential-store id the tools look up.
    pub credential_id: &'static str,
    /// Key under which the JSON credential object is stored.
    pub credential_key: &'static str,
}

/// Credential requirements for the Reddit toolset.
pub const REDDIT_CREDENTIAL_SPEC: CredentialSpec = CredentialSpec {
    env_var: REDDIT_CREDENTIALS_ENV,
    tools: crate::tools::ALL_TOOL_NAMES,
    required: true,
    startup_required: false,
    help_url: "https://www.reddit.com/prefs/apps",
    description: "Reddit API credentials (JSON object with OAuth 2.0 tokens)",
    setup_instructions: r#"To get Reddit API credentials:
1. Go to https://www.reddit.com/prefs/apps
2. Click "create another app..." at the bottom
3. Fill in the details:
   - Name: Your app name
   - App type: Select "script" for personal use or "web app" for production
   - Description: Brief description of your app
   - About URL: Optional URL
   - Redirect URI: http://localhost:8080 (for script type)
4. Click "create app"
5. Note your credentials:
   - client_id: The string under "personal use script"
   - client_secret: The "secret" value
6. Generate a refresh token:
   - For script apps: Use your Reddit username and password
   - For web apps: Implement the OAuth2 authorization-code flow
7. Set the environment variable as JSON:
   export REDDIT_CREDENTIALS='{"client_id":"YOUR_CLIENT_ID","client_secret":"YOUR_SECRET","refresh_token":"YOUR_REFRESH_TOKEN","user_agent":"YOUR_APP_NAME/1.0"}'

Required scopes: read, submit, vote, identity
Optional scopes (for moderation): modposts"#,
    health_check_endpoint: "https://oauth.reddit.com/api/v1/me",
    health_check_method: "GET",
    credential_id: REDDIT_CREDENTIAL_ID,
    credential_key: "credentials",
};

// ── Credentials ────────────────────────────────────────────────────

/// OAuth 2.0 refresh-token credentials for the Reddit API.
///
/// Read once per tool invocation from a [`CredentialSource`]; never mutated
/// or cached by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub user_agent: String,
}

impl RedditCredentials {
    /// Validate and convert a raw JSON credential object.
    ///
    /// Field presence is checked before deserialization so that the error
    /// names every missing field, not just the first one serde trips over.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CredentialError> {
        let obj = value.as_object().ok_or(CredentialError::InvalidFormat)?;
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !obj.contains_key(**field))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(CredentialError::MissingFields(missing.join(", ")));
        }
        serde_json::from_value(value).map_err(|_| CredentialError::InvalidFormat)
    }
}

// ── Credential store ───────────────────────────────────────────────

/// A host-managed secret store the tools can read credentials from.
///
/// Implementors return the raw JSON credential object stored under `id`
/// (the same four-field shape the env var holds), or `None` when nothing
/// is configured.
pub trait CredentialStore: Send + Sync {
    fn get(&self, id: &str) -> Option<serde_json::Value>;
}

/// In-memory [`CredentialStore`] for tests and embedders that manage
/// secrets themselves.
///
/// # Example
///
/// ```
/// use snoo_tools::credentials::{StaticCredentialStore, REDDIT_CREDENTIAL_ID};
///
/// let store = StaticCredentialStore::new().with(
///     REDDIT_CREDENTIAL_ID,
///     serde_json::json!({
///         "client_id": "id",
///         "client_secret": "secret",
///         "refresh_token": "token",
///         "user_agent": "MyBot/1.0",
///     }),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    entries: HashMap<String, serde_json::Value>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential object under `id` (builder pattern).
    pub fn with(mut self, id: impl Into<String>, value: serde_json::Value) -> Self {
        self.entries.insert(id.into(), value);
        self
    }
}

impl CredentialStore for StaticCredentialStore {
    fn get(&self, id: &str) -> Option<serde_json::Value> {
        self.entries.get(id).cloned()
    }
}

// ── Credential source ──────────────────────────────────────────────

/// Where a tool invocation reads its credentials from.
///
/// A `Store` source never consults the environment, so a host that manages
/// secrets centrally is not affected by whatever `REDDIT_CREDENTIALS`
/// happens to hold in the process environment.
#[derive(Clone)]
pub enum CredentialSource {
    /// Look up the credential object in a host-managed store under
    /// [`REDDIT_CREDENTIAL_ID`].
    Store(Arc<dyn CredentialStore>),
    /// Parse the [`REDDIT_CREDENTIALS_ENV`] environment variable as JSON.
    Env,
}

impl CredentialSource {
    /// Convenience constructor for store-backed sources.
    pub fn store(store: impl CredentialStore + 'static) -> Self {
        Self::Store(Arc::new(store))
    }

    /// Resolve credentials, validating the four required fields.
    ///
    /// Error precedence matches the configuration surface: nothing
    /// configured, then malformed JSON (env only), then missing fields.
    pub fn resolve(&self) -> Result<RedditCredentials, CredentialError> {
        match self {
            Self::Store(store) => {
                debug!("resolving Reddit credentials from store");
                let value = store
                    .get(REDDIT_CREDENTIAL_ID)
                    .ok_or(CredentialError::NotConfigured)?;
                RedditCredentials::from_value(value)
            }
            Self::Env => {
                debug!("resolving Reddit credentials from {REDDIT_CREDENTIALS_ENV}");
                let raw = std::env::var(REDDIT_CREDENTIALS_ENV)
                    .ok()
                    .filter(|s| !s.is_empty())
                    .ok_or(CredentialError::NotConfigured)?;
                let value: serde_json::Value =
                    serde_json::from_str(&raw).map_err(|_| CredentialError::InvalidFormat)?;
                RedditCredentials::from_value(value)
            }
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(_) => f.write_str("CredentialSource::Store(..)"),
            Self::Env => f.write_str("CredentialSource::Env"),
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Credential-configuration failures.
///
/// Every variant carries a [`help`](CredentialError::help) string the tools
/// surface alongside the error message so the operator knows what to fix.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No credentials found in the store or environment.
    #[error("REDDIT_CREDENTIALS not configured")]
    NotConfigured,

    /// The env var held something that is not a JSON object of strings.
    #[error("Invalid REDDIT_CREDENTIALS format")]
    InvalidFormat,

    /// The credential object is missing one or more required fields.
    #[error("Missing required credential fields: {0}")]
    MissingFields(String),
}

impl CredentialError {
    /// Operator-facing remediation hint for this failure.
    pub fn help(&self) -> &'static str {
        match self {
            Self::NotConfigured => "Get credentials at https://www.reddit.com/prefs/apps",
            Self::InvalidFormat => {
                "Must be valid JSON with client_id, client_secret, refresh_token, user_agent"
            }
            Self::MissingFields(_) => {
                "REDDIT_CREDENTIALS must include: client_id, client_secret, \
                 refresh_token, user_agent"
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn valid_creds_json() -> serde_json::Value {
        serde_json::json!({
            "client_id": "test_client_id",
            "client_secret": "test_client_secret",
            "refresh_token": "test_refresh_token",
            "user_agent": "TestBot/1.0",
        })
    }

    #[test]
    fn resolves_from_store() {
        let store =
            StaticCredentialStore::new().with(REDDIT_CREDENTIAL_ID, valid_creds_json());
        let source = CredentialSource::store(store);

        let creds = source.resolve().unwrap();
        assert_eq!(creds.client_id, "test_client_id");
        assert_eq!(creds.user_agent, "TestBot/1.0");
    }

    #[test]
    fn empty_store_is_not_configured() {
        let source = CredentialSource::store(StaticCredentialStore::new());
        let err = source.resolve().unwrap_err();
        assert_eq!(err.to_string(), "REDDIT_CREDENTIALS not configured");
        assert_eq!(err.help(), "Get credentials at https://www.reddit.com/prefs/apps");
    }

    #[test]
    fn store_reports_missing_fields() {
        let store = StaticCredentialStore::new().with(
            REDDIT_CREDENTIAL_ID,
            serde_json::json!({"client_id": "only_this"}),
        );
        let source = CredentialSource::store(store);

        let err = source.resolve().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required credential fields: client_secret, refresh_token, user_agent"
        );
        assert!(err.help().contains("must include"));
    }

    #[test]
    fn resolves_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var(REDDIT_CREDENTIALS_ENV, valid_creds_json().to_string());
        }

        let creds = CredentialSource::Env.resolve().unwrap();
        assert_eq!(creds.refresh_token, "test_refresh_token");

        unsafe {
            std::env::remove_var(REDDIT_CREDENTIALS_ENV);
        }
    }

    #[test]
    fn unset_env_is_not_configured() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var(REDDIT_CREDENTIALS_ENV);
        }

        let err = CredentialSource::Env.resolve().unwrap_err();
        assert!(matches!(err, CredentialError::NotConfigured));
    }

    #[test]
    fn malformed_env_json_is_invalid_format() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var(REDDIT_CREDENTIALS_ENV, "not valid json");
        }

        let err = CredentialSource::Env.resolve().unwrap_err();
        assert_eq!(err.to_string(), "Invalid REDDIT_CREDENTIALS format");
        assert_eq!(
            err.help(),
            "Must be valid JSON with client_id, client_secret, refresh_token, user_agent"
        );

        unsafe {
            std::env::remove_var(REDDIT_CREDENTIALS_ENV);
        }
    }

    #[test]
    fn store_source_ignores_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var(REDDIT_CREDENTIALS_ENV, "garbage that would fail to parse");
        }

        let store =
            StaticCredentialStore::new().with(REDDIT_CREDENTIAL_ID, valid_creds_json());
        let creds = CredentialSource::store(store).resolve().unwrap();
        assert_eq!(creds.client_id, "test_client_id");

        unsafe {
            std::env::remove_var(REDDIT_CREDENTIALS_ENV);
        }
    }

    #[test]
    fn non_object_credentials_are_invalid_format() {
        let err = RedditCredentials::from_value(serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CredentialError::InvalidFormat));
    }

    #[test]
    fn spec_covers_all_tools() {
        assert_eq!(REDDIT_CREDENTIAL_SPEC.env_var, "REDDIT_CREDENTIALS");
        assert_eq!(REDDIT_CREDENTIAL_SPEC.tools.len(), 18);
        assert!(REDDIT_CREDENTIAL_SPEC.tools.contains(&"reddit_search_posts"));
        assert!(REDDIT_CREDENTIAL_SPEC.tools.contains(&"reddit_ban_user"));
        assert_eq!(REDDIT_CREDENTIAL_SPEC.health_check_method, "GET");
        assert_eq!(
            REDDIT_CREDENTIAL_SPEC.health_check_endpoint,
            "https://oauth.reddit.com/api/v1/me"
        );
        assert!(REDDIT_CREDENTIAL_SPEC.setup_instructions.contains("refresh token"));
    }
}
