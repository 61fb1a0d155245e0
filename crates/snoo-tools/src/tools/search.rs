//! Search & monitoring tools.
//!
//! Six read-only tools for finding and reading Reddit content. All of them
//! report [`Tool::cacheable`], so a host cache may reuse results for
//! identical arguments within a session.
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`SearchPosts`] | `reddit_search_posts` | Search posts by query |
//! | [`SearchComments`] | `reddit_search_comments` | Comment search (unsupported upstream; explains the workaround) |
//! | [`GetSubredditNew`] | `reddit_get_subreddit_new` | Newest posts in a subreddit |
//! | [`GetSubredditHot`] | `reddit_get_subreddit_hot` | Hot posts in a subreddit |
//! | [`GetPost`] | `reddit_get_post` | One post by id |
//! | [`GetComments`] | `reddit_get_comments` | Comment tree of a post |

use super::{RedditAccess, error_json, out_of_bounds, reddit_error_json};
use crate::ToolDef;
use crate::reddit::models::{flatten_comment_tree, serialize_comment, serialize_submission};
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

fn default_all() -> String {
    "all".to_string()
}

fn default_relevance() -> String {
    "relevance".to_string()
}

fn default_best() -> String {
    "best".to_string()
}

fn default_limit_10() -> i64 {
    10
}

fn default_limit_25() -> i64 {
    25
}

fn default_limit_50() -> i64 {
    50
}

// ── SearchPosts ─────────────────────────────────────────────────────

/// Arguments for `reddit_search_posts`.
#[derive(Deserialize, JsonSchema)]
pub struct SearchPostsArgs {
    /// Search query (1-512 characters).
    pub query: String,
    /// Subreddit to search, or "all" for site-wide search.
    #[serde(default = "default_all")]
    pub subreddit: String,
    /// Time period: "hour", "day", "week", "month", "year", "all".
    #[serde(default = "default_all")]
    pub time_filter: String,
    /// Sort method: "relevance", "hot", "top", "new", "comments".
    #[serde(default = "default_relevance")]
    pub sort: String,
    /// Maximum number of posts to return (clamped to 1-100).
    #[serde(default = "default_limit_10")]
    pub limit: i64,
}

/// Search Reddit posts matching a query.
pub struct SearchPosts {
    access: RedditAccess,
}

impl SearchPosts {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for SearchPosts {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_SEARCH_POSTS)
            .purpose("Search Reddit posts matching a query")
            .when_to_use(
                "When you need to find posts about a topic, brand, or keyword, either \
                 site-wide or within one subreddit. Good for monitoring mentions and \
                 research",
            )
            .when_not_to_use(
                "When you already have a post ID — use reddit_get_post. Post titles and \
                 bodies are searched, not comment text",
            )
            .parameters_for::<SearchPostsArgs>()
            .example(
                r#"reddit_search_posts(query="borrow checker", subreddit="rust", limit=5)"#,
                "Five r/rust posts about the borrow checker with scores and permalinks",
            )
            .example(
                r#"reddit_search_posts(query="acme widgets", time_filter="week")"#,
                "Site-wide mentions of acme widgets from the last week",
            )
            .output_format(
                "JSON object with query, subreddit, count, and posts (each with id, \
                 title, author, score, permalink, and a selftext preview)",
            )
            .disambiguate(
                "Looking for mentions inside comment threads",
                super::REDDIT_GET_COMMENTS,
                "comment text is only reachable per post, after finding the post here",
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
            let args: SearchPostsArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.query, 512) {
                return error_json("Query must be 1-512 characters");
            }
            let limit = args.limit.clamp(1, 100);

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client
                .search_posts(
                    &args.subreddit,
                    &args.query,
                    &args.sort,
                    &args.time_filter,
                    limit,
                )
                .await
            {
                Ok(posts) => {
                    let results: Vec<serde_json::Value> =
                        posts.iter().map(serialize_submission).collect();
                    json!({
                        "query": args.query,
                        "subreddit": args.subreddit,
                        "count": results.len(),
                        "posts": results,
                    })
                    .to_string()
                }
                Err(e) => reddit_error_json(&e, "Search failed"),
            }
        })
    }
}

// ── SearchComments ──────────────────────────────────────────────────

/// Arguments for `reddit_search_comments`.
#[derive(Deserialize, JsonSchema)]
pub struct SearchCommentsArgs {
    /// Search query (1-512 characters).
    pub query: String,
    /// Subreddit to search, or "all" for site-wide search.
    #[serde(default = "default_all")]
    pub subreddit: String,
    /// Time period: "hour", "day", "week", "month", "year", "all".
    #[serde(default = "default_all")]
    pub time_filter: String,
    /// Sort method: "relevance", "new", "top".
    #[serde(default = "default_relevance")]
    pub sort: String,
    /// Maximum number of comments to return (clamped to 1-100).
    #[serde(default = "default_limit_10")]
    pub limit: i64,
}

/// Search Reddit comments matching a query.
///
/// Reddit's public API has no comment search. The tool validates its inputs
/// and authenticates normally, then returns a structured error pointing at
/// the supported two-step workaround, so the model learns the right recovery
/// instead of retrying.
pub struct SearchComments {
    access: RedditAccess,
}

impl SearchComments {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for SearchComments {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_SEARCH_COMMENTS)
            .purpose("Search Reddit comments matching a query")
            .when_to_use(
                "When you want to monitor brand mentions or discussions in comments. \
                 Note: Reddit's API does not support comment search, so this tool \
                 always explains the two-step workaround instead",
            )
            .when_not_to_use(
                "When searching post titles and bodies — use reddit_search_posts, which \
                 is supported directly",
            )
            .parameters_for::<SearchCommentsArgs>()
            .example(
                r#"reddit_search_comments(query="acme support")"#,
                "An error object explaining to search posts first, then fetch their comments",
            )
            .output_format("JSON object with error and help fields")
            .disambiguate(
                "Any comment-text search",
                super::REDDIT_SEARCH_POSTS,
                "find candidate posts first, then read their threads with reddit_get_comments",
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
            let args: SearchCommentsArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.query, 512) {
                return error_json("Query must be 1-512 characters");
            }

            // Credential problems surface before the capability gap does.
            if let Err(e) = access.client().await {
                return e;
            }

            json!({
                "error": "Comment search not directly supported by the Reddit API",
                "help": "Use reddit_search_posts and then reddit_get_comments for specific posts",
            })
            .to_string()
        })
    }
}

// ── GetSubredditNew ─────────────────────────────────────────────────

/// Arguments for `reddit_get_subreddit_new`.
#[derive(Deserialize, JsonSchema)]
pub struct GetSubredditNewArgs {
    /// Subreddit name without the r/ prefix (e.g. "rust").
    pub subreddit: String,
    /// Maximum number of posts to return (clamped to 1-100).
    #[serde(default = "default_limit_25")]
    pub limit: i64,
}

/// Get the newest posts from a subreddit.
pub struct GetSubredditNew {
    access: RedditAccess,
}

impl GetSubredditNew {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for GetSubredditNew {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_GET_SUBREDDIT_NEW)
            .purpose("Get the newest posts from a subreddit")
            .when_to_use(
                "When you need the latest community activity in submission order, e.g. \
                 watching for fresh posts to respond to",
            )
            .when_not_to_use(
                "When you want what the community is upvoting right now — use \
                 reddit_get_subreddit_hot. For topic searches use reddit_search_posts",
            )
            .parameters_for::<GetSubredditNewArgs>()
            .example(
                r#"reddit_get_subreddit_new(subreddit="rust", limit=10)"#,
                "The ten most recently submitted r/rust posts",
            )
            .output_format("JSON object with subreddit, feed_type \"new\", count, and posts")
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
            let args: GetSubredditNewArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.subreddit, 50) {
                return error_json("Subreddit name must be 1-50 characters");
            }
            let limit = args.limit.clamp(1, 100);

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.subreddit_new(&args.subreddit, limit).await {
                Ok(posts) => feed_result(&args.subreddit, "new", &posts),
                Err(e) => reddit_error_json(&e, "Failed to get posts"),
            }
        })
    }
}

// ── GetSubredditHot ─────────────────────────────────────────────────

/// Arguments for `reddit_get_subreddit_hot`.
#[derive(Deserialize, JsonSchema)]
pub struct GetSubredditHotArgs {
    /// Subreddit name without the r/ prefix (e.g. "rust").
    pub subreddit: String,
    /// Maximum number of posts to return (clamped to 1-100).
    #[serde(default = "default_limit_25")]
    pub limit: i64,
}

/// Get the currently-hot posts from a subreddit.
pub struct GetSubredditHot {
    access: RedditAccess,
}

impl GetSubredditHot {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for GetSubredditHot {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_GET_SUBREDDIT_HOT)
            .purpose("Get the posts currently trending in a subreddit")
            .when_to_use(
                "When you want what the community is engaging with right now — the \
                 front page of the subreddit",
            )
            .when_not_to_use(
                "When you need everything as it is posted regardless of votes — use \
                 reddit_get_subreddit_new",
            )
            .parameters_for::<GetSubredditHotArgs>()
            .example(
                r#"reddit_get_subreddit_hot(subreddit="programming")"#,
                "The hot posts of r/programming with scores and comment counts",
            )
            .output_format("JSON object with subreddit, feed_type \"hot\", count, and posts")
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
            let args: GetSubredditHotArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.subreddit, 50) {
                return error_json("Subreddit name must be 1-50 characters");
            }
            let limit = args.limit.clamp(1, 100);

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.subreddit_hot(&args.subreddit, limit).await {
                Ok(posts) => feed_result(&args.subreddit, "hot", &posts),
                Err(e) => reddit_error_json(&e, "Failed to get posts"),
            }
        })
    }
}

fn feed_result(
    subreddit: &str,
    feed_type: &str,
    posts: &[crate::reddit::models::SubmissionData],
) -> String {
    let results: Vec<serde_json::Value> = posts.iter().map(serialize_submission).collect();
    json!({
        "subreddit": subreddit,
        "feed_type": feed_type,
        "count": results.len(),
        "posts": results,
    })
    .to_string()
}

// ── GetPost ─────────────────────────────────────────────────────────

/// Arguments for `reddit_get_post`.
#[derive(Deserialize, JsonSchema)]
pub struct GetPostArgs {
    /// Reddit post ID (e.g. "abc123", without the t3_ prefix).
    pub post_id: String,
}

/// Get a specific Reddit post by ID.
pub struct GetPost {
    access: RedditAccess,
}

impl GetPost {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for GetPost {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_GET_POST)
            .purpose("Get a specific Reddit post by ID")
            .when_to_use(
                "When you have a post ID (from a search result or a permalink) and need \
                 its full details: title, body, score, flair",
            )
            .when_not_to_use(
                "When you don't have an ID yet — use reddit_search_posts. When you want \
                 the discussion under the post — use reddit_get_comments",
            )
            .parameters_for::<GetPostArgs>()
            .example(
                r#"reddit_get_post(post_id="abc123")"#,
                "The post's title, author, score, and selftext preview",
            )
            .output_format("JSON object with success and post")
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
            let args: GetPostArgs = match parse_tool_args(&arguments) {
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

            match client.submission(&args.post_id).await {
                Ok(post) => json!({
                    "success": true,
                    "post": serialize_submission(&post),
                })
                .to_string(),
                Err(e) => reddit_error_json(&e, "Failed to get post"),
            }
        })
    }
}

// ── GetComments ─────────────────────────────────────────────────────

/// Arguments for `reddit_get_comments`.
#[derive(Deserialize, JsonSchema)]
pub struct GetCommentsArgs {
    /// Reddit post ID whose comments to fetch.
    pub post_id: String,
    /// Sort method: "best", "top", "new", "controversial", "old", "qa".
    #[serde(default = "default_best")]
    pub sort: String,
    /// Maximum number of comments to return (clamped to 1-500).
    #[serde(default = "default_limit_50")]
    pub limit: i64,
}

/// Get the comment tree of a Reddit post, flattened in thread order.
pub struct GetComments {
    access: RedditAccess,
}

impl GetComments {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for GetComments {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_GET_COMMENTS)
            .purpose("Get comments from a Reddit post")
            .when_to_use(
                "When you need the discussion under a specific post: replies, their \
                 authors, and scores, flattened in thread order",
            )
            .when_not_to_use(
                "When you only need the post itself — use reddit_get_post. Collapsed \
                 \"load more\" branches are not expanded",
            )
            .parameters_for::<GetCommentsArgs>()
            .example(
                r#"reddit_get_comments(post_id="abc123", sort="top", limit=20)"#,
                "Up to 20 comments with bodies, authors, and parent links",
            )
            .output_format(
                "JSON object with post_id, count, and comments (each with id, author, \
                 body preview, score, parent_id, submission_id)",
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
            let args: GetCommentsArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.post_id, 20) {
                return error_json("Post ID must be 1-20 characters");
            }
            let limit = args.limit.clamp(1, 500);

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client.comments(&args.post_id, &args.sort, limit).await {
                Ok(nodes) => {
                    let mut comments = flatten_comment_tree(nodes);
                    comments.truncate(limit as usize);
                    let results: Vec<serde_json::Value> =
                        comments.iter().map(serialize_comment).collect();
                    json!({
                        "post_id": args.post_id,
                        "count": results.len(),
                        "comments": results,
                    })
                    .to_string()
                }
                Err(e) => reddit_error_json(&e, "Failed to get comments"),
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialSource, StaticCredentialStore};

    fn unconfigured_access() -> RedditAccess {
        RedditAccess::new(CredentialSource::store(StaticCredentialStore::new()))
    }

    fn parse(result: &str) -> serde_json::Value {
        serde_json::from_str(result).unwrap()
    }

    #[test]
    fn search_posts_definition() {
        let tool = SearchPosts::new(unconfigured_access());
        let def = tool.definition();
        assert_eq!(def.function.name, "reddit_search_posts");
        assert!(tool.cacheable());
        assert!(!tool.is_mutation());

        let required = def.function.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 1);
        assert!(required.contains(&json!("query")));
    }

    #[tokio::test]
    async fn search_posts_rejects_out_of_range_query() {
        let tool = SearchPosts::new(unconfigured_access());

        let result = tool.execute(r#"{"query": ""}"#).await;
        assert_eq!(parse(&result)["error"], "Query must be 1-512 characters");

        let long = "q".repeat(513);
        let result = tool.execute(&format!(r#"{{"query": "{long}"}}"#)).await;
        assert_eq!(parse(&result)["error"], "Query must be 1-512 characters");
    }

    #[tokio::test]
    async fn query_bounds_count_characters_not_bytes() {
        let tool = SearchPosts::new(unconfigured_access());

        // 512 two-byte characters: inside the bound, so validation passes
        // and the call stops at credential resolution instead.
        let query = "é".repeat(512);
        let result = tool.execute(&format!(r#"{{"query": "{query}"}}"#)).await;
        assert_eq!(parse(&result)["error"], "REDDIT_CREDENTIALS not configured");
    }

    #[tokio::test]
    async fn search_posts_requires_credentials_before_network() {
        let tool = SearchPosts::new(unconfigured_access());
        let result = tool.execute(r#"{"query": "rust"}"#).await;
        let value = parse(&result);
        assert_eq!(value["error"], "REDDIT_CREDENTIALS not configured");
        assert!(
            value["help"]
                .as_str()
                .unwrap()
                .contains("reddit.com/prefs/apps")
        );
    }

    #[test]
    fn search_comments_definition_names_the_workaround() {
        let tool = SearchComments::new(unconfigured_access());
        let def = tool.definition();
        assert_eq!(def.function.name, "reddit_search_comments");
        assert!(tool.cacheable());
        assert!(def.function.description.contains("reddit_search_posts"));
    }

    #[tokio::test]
    async fn search_comments_validates_before_reporting_unsupported() {
        let tool = SearchComments::new(unconfigured_access());

        let result = tool.execute(r#"{"query": ""}"#).await;
        assert_eq!(parse(&result)["error"], "Query must be 1-512 characters");

        // Valid query, no credentials: stops at credential resolution, not
        // at the capability gap.
        let result = tool.execute(r#"{"query": "mentions"}"#).await;
        assert_eq!(parse(&result)["error"], "REDDIT_CREDENTIALS not configured");
    }

    #[test]
    fn feed_definitions() {
        let new_tool = GetSubredditNew::new(unconfigured_access());
        assert_eq!(new_tool.definition().function.name, "reddit_get_subreddit_new");
        assert!(new_tool.cacheable());

        let hot_tool = GetSubredditHot::new(unconfigured_access());
        assert_eq!(hot_tool.definition().function.name, "reddit_get_subreddit_hot");
        assert!(hot_tool.cacheable());
    }

    #[tokio::test]
    async fn feeds_reject_out_of_range_subreddit() {
        let tool = GetSubredditNew::new(unconfigured_access());
        let result = tool.execute(r#"{"subreddit": ""}"#).await;
        assert_eq!(
            parse(&result)["error"],
            "Subreddit name must be 1-50 characters"
        );

        let tool = GetSubredditHot::new(unconfigured_access());
        let long = "s".repeat(51);
        let result = tool.execute(&format!(r#"{{"subreddit": "{long}"}}"#)).await;
        assert_eq!(
            parse(&result)["error"],
            "Subreddit name must be 1-50 characters"
        );
    }

    #[test]
    fn get_post_definition() {
        let tool = GetPost::new(unconfigured_access());
        let def = tool.definition();
        assert_eq!(def.function.name, "reddit_get_post");
        assert!(tool.cacheable());

        let required = def.function.parameters["required"].as_array().unwrap();
        assert!(required.contains(&json!("post_id")));
    }

    #[tokio::test]
    async fn get_post_rejects_out_of_range_id() {
        let tool = GetPost::new(unconfigured_access());

        let result = tool.execute(r#"{"post_id": ""}"#).await;
        assert_eq!(parse(&result)["error"], "Post ID must be 1-20 characters");

        let result = tool
            .execute(r#"{"post_id": "abcdefghijklmnopqrstu"}"#)
            .await;
        assert_eq!(parse(&result)["error"], "Post ID must be 1-20 characters");
    }

    #[tokio::test]
    async fn get_comments_rejects_out_of_range_id() {
        let tool = GetComments::new(unconfigured_access());
        let result = tool.execute(r#"{"post_id": ""}"#).await;
        assert_eq!(parse(&result)["error"], "Post ID must be 1-20 characters");
    }

    #[test]
    fn get_comments_definition_defaults() {
        let tool = GetComments::new(unconfigured_access());
        let def = tool.definition();
        assert_eq!(def.function.name, "reddit_get_comments");

        // Only post_id is mandatory; sort and limit default.
        let required = def.function.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 1);
        assert!(required.contains(&json!("post_id")));
    }
}
