//! Content creation tools.
//!
//! Five tools that publish, edit, or retract content through the
//! authenticated account. All of them report [`Tool::is_mutation`], so hosts
//! can require confirmation before running them.
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`SubmitPost`] | `reddit_submit_post` | Submit a text or link post |
//! | [`ReplyToPost`] | `reddit_reply_to_post` | Top-level comment on a post |
//! | [`ReplyToComment`] | `reddit_reply_to_comment` | Nested reply to a comment |
//! | [`EditComment`] | `reddit_edit_comment` | Edit an own comment |
//! | [`DeleteComment`] | `reddit_delete_comment` | Delete an own comment |

use super::{RedditAccess, error_json, out_of_bounds, reddit_error_json};
use crate::ToolDef;
use crate::reddit::SubmitContent;
use crate::reddit::models::serialize_submission;
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

// ── SubmitPost ──────────────────────────────────────────────────────

/// Arguments for `reddit_submit_post`.
#[derive(Deserialize, JsonSchema)]
pub struct SubmitPostArgs {
    /// Subreddit to post in, without the r/ prefix.
    pub subreddit: String,
    /// Post title (1-300 characters).
    pub title: String,
    /// Body text for a text post. Mutually exclusive with url.
    #[serde(default)]
    pub content: String,
    /// Link target for a link post. Mutually exclusive with content.
    #[serde(default)]
    pub url: String,
    /// Flair template ID, for subreddits that require post flair.
    #[serde(default)]
    pub flair_id: String,
}

/// Submit a new post to a subreddit.
pub struct SubmitPost {
    access: RedditAccess,
}

impl SubmitPost {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for SubmitPost {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_SUBMIT_POST)
            .purpose("Submit a new post to a subreddit")
            .when_to_use(
                "When the account should start a new thread: a text post (content) or a \
                 link post (url), exactly one of the two",
            )
            .when_not_to_use(
                "When responding to an existing thread — use reddit_reply_to_post. \
                 Posting is rate-limited and visible to the whole community, so draft \
                 carefully before calling",
            )
            .parameters_for::<SubmitPostArgs>()
            .example(
                r#"reddit_submit_post(subreddit="rust", title="Announcing snoo-tools", content="Details inside...")"#,
                "The created post's id, permalink, and full details",
            )
            .example(
                r#"reddit_submit_post(subreddit="rust", title="Release notes", url="https://example.com/notes")"#,
                "A link post pointing at the URL",
            )
            .output_format("JSON object with success, post_id, permalink, and post")
            .disambiguate(
                "Commenting under an existing post",
                super::REDDIT_REPLY_TO_POST,
                "submitting creates a brand-new thread",
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
            let args: SubmitPostArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.subreddit, 50) {
                return error_json("Subreddit name must be 1-50 characters");
            }
            if out_of_bounds(&args.title, 300) {
                return error_json("Title must be 1-300 characters");
            }
            if args.content.is_empty() && args.url.is_empty() {
                return error_json("Must provide either content (text post) or url (link post)");
            }
            if !args.content.is_empty() && !args.url.is_empty() {
                return error_json("Cannot provide both content and url - choose one");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            let body = if args.url.is_empty() {
                SubmitContent::SelfText(&args.content)
            } else {
                SubmitContent::Link(&args.url)
            };
            let flair_id = (!args.flair_id.is_empty()).then_some(args.flair_id.as_str());

            let submitted = match client
                .submit(&args.subreddit, &args.title, body, flair_id)
                .await
            {
                Ok(s) => s,
                Err(e) => return reddit_error_json(&e, "Failed to submit post"),
            };

            // The submit endpoint only returns identifiers; fetch the new
            // post so the result carries its full details.
            match client.submission(submitted.post_id()).await {
                Ok(post) => {
                    let serialized = serialize_submission(&post);
                    json!({
                        "success": true,
                        "post_id": post.id,
                        "permalink": serialized["permalink"],
                        "post": serialized,
                    })
                    .to_string()
                }
                Err(e) => reddit_error_json(&e, "Failed to submit post"),
            }
        })
    }
}

// ── ReplyToPost ─────────────────────────────────────────────────────

/// Arguments for `reddit_reply_to_post`.
#[derive(Deserialize, JsonSchema)]
pub struct ReplyToPostArgs {
    /// Reddit post ID to reply to (e.g. "abc123", without the t3_ prefix).
    pub post_id: String,
    /// Reply text (1-10000 characters, markdown supported).
    pub text: String,
}

/// Reply to a Reddit post with a top-level comment.
pub struct ReplyToPost {
    access: RedditAccess,
}

impl ReplyToPost {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for ReplyToPost {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_REPLY_TO_POST)
            .purpose("Reply to a Reddit post with a top-level comment")
            .when_to_use(
                "When the account should join the discussion under a post, e.g. \
                 answering a question or responding to a mention",
            )
            .when_not_to_use(
                "When responding to a specific comment inside the thread — use \
                 reddit_reply_to_comment so the reply nests correctly",
            )
            .parameters_for::<ReplyToPostArgs>()
            .example(
                r#"reddit_reply_to_post(post_id="abc123", text="Thanks for the report, fixed in 0.2.")"#,
                "The created comment's id and permalink",
            )
            .output_format("JSON object with success, comment_id, and permalink")
            .disambiguate(
                "Replying to a comment rather than the post itself",
                super::REDDIT_REPLY_TO_COMMENT,
                "post replies always attach at the top level",
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
            let args: ReplyToPostArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.post_id, 20) {
                return error_json("Post ID must be 1-20 characters");
            }
            if out_of_bounds(&args.text, 10_000) {
                return error_json("Reply text must be 1-10000 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.reply(&format!("t3_{}", args.post_id), &args.text).await {
                Ok(comment) => reply_result(&comment),
                Err(e) => reddit_error_json(&e, "Failed to reply"),
            }
        })
    }
}

// ── ReplyToComment ──────────────────────────────────────────────────

/// Arguments for `reddit_reply_to_comment`.
#[derive(Deserialize, JsonSchema)]
pub struct ReplyToCommentArgs {
    /// Reddit comment ID to reply to (e.g. "def456", without the t1_ prefix).
    pub comment_id: String,
    /// Reply text (1-10000 characters, markdown supported).
    pub text: String,
}

/// Reply to a Reddit comment, nesting under it.
pub struct ReplyToComment {
    access: RedditAccess,
}

impl ReplyToComment {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for ReplyToComment {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_REPLY_TO_COMMENT)
            .purpose("Reply to a Reddit comment")
            .when_to_use(
                "When the account should answer a specific comment in a thread; the \
                 reply nests under that comment",
            )
            .when_not_to_use(
                "When addressing the post as a whole — use reddit_reply_to_post for a \
                 top-level comment",
            )
            .parameters_for::<ReplyToCommentArgs>()
            .example(
                r#"reddit_reply_to_comment(comment_id="def456", text="Good catch, updated.")"#,
                "The created reply's id and permalink",
            )
            .output_format("JSON object with success, comment_id, and permalink")
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
            let args: ReplyToCommentArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.comment_id, 20) {
                return error_json("Comment ID must be 1-20 characters");
            }
            if out_of_bounds(&args.text, 10_000) {
                return error_json("Reply text must be 1-10000 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client
                .reply(&format!("t1_{}", args.comment_id), &args.text)
                .await
            {
                Ok(comment) => reply_result(&comment),
                Err(e) => reddit_error_json(&e, "Failed to reply"),
            }
        })
    }
}

fn reply_result(comment: &crate::reddit::models::CommentData) -> String {
    json!({
        "success": true,
        "comment_id": comment.id,
        "permalink": format!("https://reddit.com{}", comment.permalink),
    })
    .to_string()
}

// ── EditComment ─────────────────────────────────────────────────────

/// Arguments for `reddit_edit_comment`.
#[derive(Deserialize, JsonSchema)]
pub struct EditCommentArgs {
    /// ID of a comment owned by the authenticated account.
    pub comment_id: String,
    /// Replacement text (1-10000 characters, markdown supported).
    pub new_text: String,
}

/// Edit one of the authenticated account's own comments.
pub struct EditComment {
    access: RedditAccess,
}

impl EditComment {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for EditComment {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_EDIT_COMMENT)
            .purpose("Edit one of the account's own comments")
            .when_to_use(
                "When a comment the account posted needs a correction or an update. \
                 Only works on the account's own comments",
            )
            .when_not_to_use(
                "When the comment should disappear entirely — use \
                 reddit_delete_comment. Editing someone else's comment is impossible",
            )
            .parameters_for::<EditCommentArgs>()
            .example(
                r#"reddit_edit_comment(comment_id="def456", new_text="Edit: fixed the link.")"#,
                "Confirmation that the comment body was replaced",
            )
            .output_format("JSON object with success, comment_id, and message")
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
            let args: EditCommentArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.comment_id, 20) {
                return error_json("Comment ID must be 1-20 characters");
            }
            if out_of_bounds(&args.new_text, 10_000) {
                return error_json("Comment text must be 1-10000 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client
                .edit_comment(&format!("t1_{}", args.comment_id), &args.new_text)
                .await
            {
                Ok(()) => json!({
                    "success": true,
                    "comment_id": args.comment_id,
                    "message": "Comment edited successfully",
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to edit comment"),
            }
        })
    }
}

// ── DeleteComment ───────────────────────────────────────────────────

/// Arguments for `reddit_delete_comment`.
#[derive(Deserialize, JsonSchema)]
pub struct DeleteCommentArgs {
    /// ID of a comment owned by the authenticated account.
    pub comment_id: String,
}

/// Delete one of the authenticated account's own comments.
pub struct DeleteComment {
    access: RedditAccess,
}

impl DeleteComment {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for DeleteComment {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_DELETE_COMMENT)
            .purpose("Delete one of the account's own comments")
            .when_to_use(
                "When a comment the account posted should be removed permanently, e.g. \
                 posted in the wrong thread or no longer accurate",
            )
            .when_not_to_use(
                "When the comment just needs fixing — use reddit_edit_comment. Deletion \
                 cannot be undone. For removing other users' content as a moderator use \
                 reddit_remove_post",
            )
            .parameters_for::<DeleteCommentArgs>()
            .example(
                r#"reddit_delete_comment(comment_id="def456")"#,
                "Confirmation that the comment was deleted",
            )
            .output_format("JSON object with success, comment_id, and message")
            .disambiguate(
                "Removing another user's rule-breaking content",
                super::REDDIT_REMOVE_POST,
                "deletion only applies to the account's own comments",
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
            let args: DeleteCommentArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.comment_id, 20) {
                return error_json("Comment ID must be 1-20 characters");
            }

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.delete(&format!("t1_{}", args.comment_id)).await {
                Ok(()) => json!({
                    "success": true,
                    "comment_id": args.comment_id,
                    "message": "Comment deleted successfully",
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to delete comment"),
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────
