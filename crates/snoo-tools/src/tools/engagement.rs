//! Engagement tools.
//!
//! Profile lookups plus the lightweight account actions: voting and saving.
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`GetUserProfile`] | `reddit_get_user_profile` | Public profile of a user |
//! | [`Upvote`] | `reddit_upvote` | Upvote a post or comment |
//! | [`Downvote`] | `reddit_downvote` | Downvote a post or comment |
//! | [`SavePost`] | `reddit_save_post` | Save a post to the account |

use super::{RedditAccess, error_json, out_of_bounds, reddit_error_json};
use crate::ToolDef;
use crate::reddit::models::serialize_redditor;
use crate::reddit::{RedditClient, RedditError};
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

// ── GetUserProfile ──────────────────────────────────────────────────

/// Arguments for `reddit_get_user_profile`.
#[derive(Deserialize, JsonSchema)]
pub struct GetUserProfileArgs {
    /// Reddit username without the u/ prefix.
    pub username: String,
}

/// Get a Reddit user's public profile.
pub struct GetUserProfile {
    access: RedditAccess,
}

impl GetUserProfile {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for GetUserProfile {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_GET_USER_PROFILE)
            .purpose("Get a Reddit user's public profile")
            .when_to_use(
                "When you need context about a user before engaging: karma, account \
                 age, moderator status",
            )
            .when_not_to_use(
                "When you want a user's posts or comments — those are not included, \
                 only profile metadata",
            )
            .parameters_for::<GetUserProfileArgs>()
            .example(
                r#"reddit_get_user_profile(username="spez")"#,
                "The account's karma totals, creation date, and flags",
            )
            .output_format(
                "JSON object with success and user (name, id, created_utc, link_karma, \
                 comment_karma, is_gold, is_mod, has_verified_email)",
            )
            .build()
            .to_tool_def()
    }

    fn cacheable(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let access = self.access.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: GetUserProfileArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.username, 50) {
                return error_json("Username must be 1-50 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.user_about(&args.username).await {
                Ok(user) => json!({
                    "success": true,
                    "user": serialize_redditor(&user),
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to get user profile"),
            }
        })
    }
}

// ── Voting ──────────────────────────────────────────────────────────

/// Vote on an item whose kind is unknown. IDs carry no type prefix, so posts
/// are tried first and comments second; the comment attempt's error is the
/// one reported.
async fn vote_with_fallback(
    client: &RedditClient,
    item_id: &str,
    direction: i32,
) -> Result<(), RedditError> {
    if client
        .vote(&format!("t3_{item_id}"), direction)
        .await
        .is_ok()
    {
        return Ok(());
    }
    client.vote(&format!("t1_{item_id}"), direction).await
}

/// Arguments for `reddit_upvote`.
#[derive(Deserialize, JsonSchema)]
pub struct UpvoteArgs {
    /// ID of the post or comment to upvote.
    pub item_id: String,
}

/// Upvote a Reddit post or comment.
pub struct Upvote {
    access: RedditAccess,
}

impl Upvote {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for Upvote {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_UPVOTE)
            .purpose("Upvote a Reddit post or comment")
            .when_to_use(
                "When the account should signal approval of a post or comment. The ID \
                 may belong to either kind; both are tried",
            )
            .when_not_to_use(
                "When you want to keep the item for later — use reddit_save_post. \
                 Votes are public account actions, not bookmarks",
            )
            .parameters_for::<UpvoteArgs>()
            .example(
                r#"reddit_upvote(item_id="abc123")"#,
                "Confirmation that the item was upvoted",
            )
            .output_format("JSON object with success, item_id, and message")
            .build()
            .to_tool_def()
    }

    fn is_mutation(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let access = self.access.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: UpvoteArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.item_id, 20) {
                return error_json("Item ID must be 1-20 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match vote_with_fallback(&client, &args.item_id, 1).await {
                Ok(()) => json!({
                    "success": true,
                    "item_id": args.item_id,
                    "message": "Upvoted successfully",
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to upvote"),
            }
        })
    }
}

/// Arguments for `reddit_downvote`.
#[derive(Deserialize, JsonSchema)]
pub struct DownvoteArgs {
    /// ID of the post or comment to downvote.
    pub item_id: String,
}

/// Downvote a Reddit post or comment.
pub struct Downvote {
    access: RedditAccess,
}

impl Downvote {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for Downvote {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_DOWNVOTE)
            .purpose("Downvote a Reddit post or comment")
            .when_to_use(
                "When the account should signal that a post or comment does not \
                 contribute to the discussion. The ID may belong to either kind",
            )
            .when_not_to_use(
                "When content breaks rules in a subreddit the account moderates — use \
                 reddit_remove_post instead of downvoting it",
            )
            .parameters_for::<DownvoteArgs>()
            .example(
                r#"reddit_downvote(item_id="abc123")"#,
                "Confirmation that the item was downvoted",
            )
            .output_format("JSON object with success, item_id, and message")
            .disambiguate(
                "Rule-breaking content in a moderated subreddit",
                super::REDDIT_REMOVE_POST,
                "downvotes rank content, they do not remove it",
            )
            .build()
            .to_tool_def()
    }

    fn is_mutation(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let access = self.access.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: DownvoteArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.item_id, 20) {
                return error_json("Item ID must be 1-20 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match vote_with_fallback(&client, &args.item_id, -1).await {
                Ok(()) => json!({
                    "success": true,
                    "item_id": args.item_id,
                    "message": "Downvoted successfully",
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to downvote"),
            }
        })
    }
}

// ── SavePost ────────────────────────────────────────────────────────

/// Arguments for `reddit_save_post`.
#[derive(Deserialize, JsonSchema)]
pub struct SavePostArgs {
    /// Reddit post ID to save.
    pub post_id: String,
}

/// Save a Reddit post to the account's saved list.
pub struct SavePost {
    access: RedditAccess,
}

impl SavePost {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for SavePost {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_SAVE_POST)
            .purpose("Save a Reddit post to the account's saved list")
            .when_to_use(
                "When a post should be bookmarked for follow-up, e.g. a report to \
                 answer after gathering more information",
            )
            .when_not_to_use(
                "When the goal is to boost the post's visibility — saving is private; \
                 use reddit_upvote for a public signal",
            )
            .parameters_for::<SavePostArgs>()
            .example(
                r#"reddit_save_post(post_id="abc123")"#,
                "Confirmation that the post was saved",
            )
            .output_format("JSON object with success, post_id, and message")
            .build()
            .to_tool_def()
    }

    fn is_mutation(&self) -> bool {
        true
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let access = self.access.clone();
        let arguments = arguments.to_string();
        Box::pin(async move {
            let args: SavePostArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.post_id, 20) {
                return error_json("Post ID must be 1-20 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.save(&format!("t3_{}", args.post_id)).await {
                Ok(()) => json!({
                    "success": true,
                    "post_id": args.post_id,
                    "message": "Post saved successfully",
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to save post"),
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────
