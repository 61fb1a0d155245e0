//! The Reddit toolset.
//!
//! Eighteen tools in four families, all following the same shape: validate
//! bounded inputs, resolve credentials, make one API call, return a flat
//! JSON object. Read tools report `cacheable`; write tools report
//! `is_mutation` so a host cache can invalidate on them.
//!
//! | Family | Tools |
//! |--------|-------|
//! | [`search`] | `reddit_search_posts`, `reddit_search_comments`, `reddit_get_subreddit_new`, `reddit_get_subreddit_hot`, `reddit_get_post`, `reddit_get_comments` |
//! | [`content`] | `reddit_submit_post`, `reddit_reply_to_post`, `reddit_reply_to_comment`, `reddit_edit_comment`, `reddit_delete_comment` |
//! | [`engagement`] | `reddit_get_user_profile`, `reddit_upvote`, `reddit_downvote`, `reddit_save_post` |
//! | [`moderation`] | `reddit_remove_post`, `reddit_approve_post`, `reddit_ban_user` |
//!
//! Register everything with [`RedditToolsExt::with_reddit_tools`], or pick
//! individual structs from the family modules.

pub mod content;
pub mod core;
pub mod engagement;
pub mod moderation;
pub mod search;
pub mod spec;

pub use core::{Tool, ToolFuture, ToolSet};

use crate::credentials::{CredentialError, CredentialSource};
use crate::reddit::client::{REDDIT_API_URL, REDDIT_TOKEN_URL, RedditClient, RedditError};

// ── Tool name constants ─────────────────────────────────────────────

pub const REDDIT_SEARCH_POSTS: &str = "reddit_search_posts";
pub const REDDIT_SEARCH_COMMENTS: &str = "reddit_search_comments";
pub const REDDIT_GET_SUBREDDIT_NEW: &str = "reddit_get_subreddit_new";
pub const REDDIT_GET_SUBREDDIT_HOT: &str = "reddit_get_subreddit_hot";
pub const REDDIT_GET_POST: &str = "reddit_get_post";
pub const REDDIT_GET_COMMENTS: &str = "reddit_get_comments";
pub const REDDIT_SUBMIT_POST: &str = "reddit_submit_post";
pub const REDDIT_REPLY_TO_POST: &str = "reddit_reply_to_post";
pub const REDDIT_REPLY_TO_COMMENT: &str = "reddit_reply_to_comment";
pub const REDDIT_EDIT_COMMENT: &str = "reddit_edit_comment";
pub const REDDIT_DELETE_COMMENT: &str = "reddit_delete_comment";
pub const REDDIT_GET_USER_PROFILE: &str = "reddit_get_user_profile";
pub const REDDIT_UPVOTE: &str = "reddit_upvote";
pub const REDDIT_DOWNVOTE: &str = "reddit_downvote";
pub const REDDIT_SAVE_POST: &str = "reddit_save_post";
pub const REDDIT_REMOVE_POST: &str = "reddit_remove_post";
pub const REDDIT_APPROVE_POST: &str = "reddit_approve_post";
pub const REDDIT_BAN_USER: &str = "reddit_ban_user";

/// Every tool name, in registration order. Referenced by the credential
/// spec so hosts can report which tools a missing credential disables.
pub const ALL_TOOL_NAMES: &[&str] = &[
    REDDIT_SEARCH_POSTS,
    REDDIT_SEARCH_COMMENTS,
    REDDIT_GET_SUBREDDIT_NEW,
    REDDIT_GET_SUBREDDIT_HOT,
    REDDIT_GET_POST,
    REDDIT_GET_COMMENTS,
    REDDIT_SUBMIT_POST,
    REDDIT_REPLY_TO_POST,
    REDDIT_REPLY_TO_COMMENT,
    REDDIT_EDIT_COMMENT,
    REDDIT_DELETE_COMMENT,
    REDDIT_GET_USER_PROFILE,
    REDDIT_UPVOTE,
    REDDIT_DOWNVOTE,
    REDDIT_SAVE_POST,
    REDDIT_REMOVE_POST,
    REDDIT_APPROVE_POST,
    REDDIT_BAN_USER,
];

// ── Shared access state ─────────────────────────────────────────────

/// Everything a tool needs to reach Reddit: a credential source and the
/// base URLs. Cloned into each tool at registration; credentials are
/// resolved per invocation, never held.
#[derive(Debug, Clone)]
pub struct RedditAccess {
    source: CredentialSource,
    api_base: String,
    token_url: String,
}

impl RedditAccess {
    pub fn new(source: CredentialSource) -> Self {
        Self {
            source,
            api_base: REDDIT_API_URL.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
        }
    }

    /// Point API calls at a different host (tests use a local mock server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Point the token exchange at a different endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Resolve credentials and build an authenticated client.
    ///
    /// The `Err` side is a ready-to-return tool result: a serialized error
    /// map describing the credential or authentication failure.
    pub async fn client(&self) -> Result<RedditClient, String> {
        let credentials = self.source.resolve().map_err(|e| credential_error_json(&e))?;
        RedditClient::login(&credentials, &self.api_base, &self.token_url)
            .await
            .map_err(|e| error_json(&format!("Failed to authenticate with Reddit: {e}")))
    }
}

// ── Validation & error maps ─────────────────────────────────────────

/// True when `s` is empty or longer than `max` characters. Bounds count
/// characters, not bytes.
pub(crate) fn out_of_bounds(s: &str, max: usize) -> bool {
    s.is_empty() || s.chars().count() > max
}

/// `{"error": message}` as a tool result string.
pub(crate) fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Credential failures carry a remediation hint alongside the message.
pub(crate) fn credential_error_json(err: &CredentialError) -> String {
    serde_json::json!({ "error": err.to_string(), "help": err.help() }).to_string()
}

/// Map an upstream failure: API error statuses get the "Reddit API error"
/// prefix, transport/decode/rejection failures get the tool's own prefix.
pub(crate) fn reddit_error_json(err: &RedditError, fallback_prefix: &str) -> String {
    match err {
        RedditError::Api { .. } => error_json(&format!("Reddit API error: {err}")),
        _ => error_json(&format!("{fallback_prefix}: {err}")),
    }
}

/// Moderation variant of [`reddit_error_json`]: missing mod permissions are
/// the overwhelmingly common cause of API errors here.
pub(crate) fn mod_error_json(err: &RedditError, fallback_prefix: &str) -> String {
    match err {
        RedditError::Api { .. } => error_json(&format!(
            "Reddit API error (check moderator permissions): {err}"
        )),
        _ => error_json(&format!("{fallback_prefix}: {err}")),
    }
}

// ── Extension trait ─────────────────────────────────────────────────

/// Extension trait for registering the full Reddit toolset on a [`ToolSet`].
///
/// # Example
///
/// ```ignore
/// use snoo_tools::credentials::CredentialSource;
/// use snoo_tools::tools::{RedditAccess, RedditToolsExt};
/// use snoo_tools::tools::core::ToolSet;
///
/// let tools = ToolSet::new()
///     .with_arg_validation(true)
///     .with_reddit_tools(RedditAccess::new(CredentialSource::Env));
/// ```
pub trait RedditToolsExt {
    fn with_reddit_tools(self, access: RedditAccess) -> Self;
}

impl RedditToolsExt for ToolSet {
    fn with_reddit_tools(self, access: RedditAccess) -> Self {
        self.with(search::SearchPosts::new(access.clone()))
            .with(search::SearchComments::new(access.clone()))
            .with(search::GetSubredditNew::new(access.clone()))
            .with(search::GetSubredditHot::new(access.clone()))
            .with(search::GetPost::new(access.clone()))
            .with(search::GetComments::new(access.clone()))
            .with(content::SubmitPost::new(access.clone()))
            .with(content::ReplyToPost::new(access.clone()))
            .with(content::ReplyToComment::new(access.clone()))
            .with(content::EditComment::new(access.clone()))
            .with(content::DeleteComment::new(access.clone()))
            .with(engagement::GetUserProfile::new(access.clone()))
            .with(engagement::Upvote::new(access.clone()))
            .with(engagement::Downvote::new(access.clone()))
            .with(engagement::SavePost::new(access.clone()))
            .with(moderation::RemovePost::new(access.clone()))
            .with(moderation::ApprovePost::new(access.clone()))
            .with(moderation::BanUser::new(access))
    }
}

// ── Tests ──────────────────────────────────────────────────────────
