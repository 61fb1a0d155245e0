//! Moderation tools.
//!
//! Three tools that act with moderator authority. They only work in
//! subreddits the authenticated account moderates; elsewhere the API answers
//! 403 and the result says to check moderator permissions.
//!
//! | Tool | Name | Purpose |
//! |------|------|---------|
//! | [`RemovePost`] | `reddit_remove_post` | Remove a post, optionally as spam |
//! | [`ApprovePost`] | `reddit_approve_post` | Approve a post out of the queue |
//! | [`BanUser`] | `reddit_ban_user` | Ban a user from a subreddit |

use super::{RedditAccess, error_json, mod_error_json, out_of_bounds};
use crate::ToolDef;
use crate::tools::core::{Tool, ToolFuture, parse_tool_args};
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

// ── RemovePost ──────────────────────────────────────────────────────

/// Arguments for `reddit_remove_post`.
#[derive(Deserialize, JsonSchema)]
pub struct RemovePostArgs {
    /// Reddit post ID to remove.
    pub post_id: String,
    /// Also mark the post as spam, training the subreddit's spam filter.
    #[serde(default)]
    pub spam: bool,
}

/// Remove a post from a moderated subreddit.
pub struct RemovePost {
    access: RedditAccess,
}

impl RemovePost {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for RemovePost {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_REMOVE_POST)
            .purpose("Remove a post from a subreddit the account moderates")
            .when_to_use(
                "When a post breaks subreddit rules and should be taken down. Set spam \
                 to also train the spam filter against similar posts",
            )
            .when_not_to_use(
                "When the account does not moderate the subreddit, or when removing the \
                 account's own comment — use reddit_delete_comment for that",
            )
            .parameters_for::<RemovePostArgs>()
            .example(
                r#"reddit_remove_post(post_id="abc123")"#,
                "Confirmation that the post was removed",
            )
            .example(
                r#"reddit_remove_post(post_id="abc123", spam=true)"#,
                "The post removed and marked as spam",
            )
            .output_format("JSON object with success, post_id, and message")
            .disambiguate(
                "Taking down the account's own comment",
                super::REDDIT_DELETE_COMMENT,
                "removal is a moderator action on other users' content",
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
            let args: RemovePostArgs = match parse_tool_args(&arguments) {
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

            match client.remove(&format!("t3_{}", args.post_id), args.spam).await {
                Ok(()) => {
                    let message = if args.spam {
                        "Post marked as spam and removed successfully"
                    } else {
                        "Post removed successfully"
                    };
                    json!({
                        "success": true,
                        "post_id": args.post_id,
                        "message": message,
                    })
                    .to_string()
                }
                Err(e) => mod_error_json(&e, "Failed to remove post"),
            }
        })
    }
}

// ── ApprovePost ─────────────────────────────────────────────────────

/// Arguments for `reddit_approve_post`.
#[derive(Deserialize, JsonSchema)]
pub struct ApprovePostArgs {
    /// Reddit post ID to approve.
    pub post_id: String,
}

/// Approve a post in a moderated subreddit.
pub struct ApprovePost {
    access: RedditAccess,
}

impl ApprovePost {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for ApprovePost {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_APPROVE_POST)
            .purpose("Approve a post in a subreddit the account moderates")
            .when_to_use(
                "When a post was caught by the spam filter or reported but is actually \
                 fine; approval restores it and clears the reports",
            )
            .when_not_to_use(
                "When the post genuinely breaks rules — use reddit_remove_post. \
                 Approval requires moderator permissions in that subreddit",
            )
            .parameters_for::<ApprovePostArgs>()
            .example(
                r#"reddit_approve_post(post_id="abc123")"#,
                "Confirmation that the post was approved",
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
            let args: ApprovePostArgs = match parse_tool_args(&arguments) {
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

            match client.approve(&format!("t3_{}", args.post_id)).await {
                Ok(()) => json!({
                    "success": true,
                    "post_id": args.post_id,
                    "message": "Post approved successfully",
                })
                .to_string(),
                Err(e) => mod_error_json(&e, "Failed to approve post"),
            }
        })
    }
}

// ── BanUser ─────────────────────────────────────────────────────────

/// Arguments for `reddit_ban_user`.
#[derive(Deserialize, JsonSchema)]
pub struct BanUserArgs {
    /// Subreddit to ban from, without the r/ prefix.
    pub subreddit: String,
    /// Username to ban, without the u/ prefix.
    pub username: String,
    /// Ban length in days. Zero or omitted means permanent.
    #[serde(default)]
    pub duration: i64,
    /// Reason shown to the banned user.
    #[serde(default)]
    pub reason: String,
    /// Private note visible only to moderators.
    #[serde(default)]
    pub note: String,
}

/// Ban a user from a moderated subreddit.
pub struct BanUser {
    access: RedditAccess,
}

impl BanUser {
    pub fn new(access: RedditAccess) -> Self {
        Self { access }
    }
}

impl Tool for BanUser {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(super::REDDIT_BAN_USER)
            .purpose("Ban a user from a subreddit the account moderates")
            .when_to_use(
                "When a user repeatedly breaks rules and removals are not enough. \
                 Provide duration for a temporary ban; omit it for permanent",
            )
            .when_not_to_use(
                "When a single post is the problem — use reddit_remove_post first. Bans \
                 are the strongest moderation action and hard to walk back",
            )
            .parameters_for::<BanUserArgs>()
            .example(
                r#"reddit_ban_user(subreddit="rust", username="spammer", duration=7, reason="Spam")"#,
                "The user banned for 7 days with the reason on record",
            )
            .example(
                r#"reddit_ban_user(subreddit="rust", username="spammer")"#,
                "The user banned permanently",
            )
            .output_format("JSON object with success, username, subreddit, and message")
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
            let args: BanUserArgs = match parse_tool_args(&arguments) {
                Ok(a) => a,
                Err(e) => return e,
            };

            if out_of_bounds(&args.subreddit, 50) {
                return error_json("Subreddit name must be 1-50 characters");
            }
            if out_of_bounds(&args.username, 50) {
                return error_json("Username must be 1-50 characters");
            }
            let duration = (args.duration > 0).then_some(args.duration);

            let client = match access.client().await {
                Ok(c) => c,
                Err(e) => return e,
            };

            match client
                .ban_user(
                    &args.subreddit,
                    &args.username,
                    duration,
                    &args.reason,
                    &args.note,
                )
                .await
            {
                Ok(()) => {
                    let duration_text = match duration {
                        Some(days) => format!("for {days} days"),
                        None => "permanently".to_string(),
                    };
                    json!({
                        "success": true,
                        "username": args.username,
                        "subreddit": args.subreddit,
                        "message": format!(
                            "User {} banned {} from r/{}",
                            args.username, duration_text, args.subreddit
                        ),
                    })
                    .to_string()
                }
                Err(e) => mod_error_json(&e, "Failed to ban user"),
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialSource, REDDIT_CREDENTIAL_ID, StaticCredentialStore};
    use mockito::{Matcher, ServerGuard};

    fn unconfigured_access() -> RedditAccess {
        RedditAccess::new(CredentialSource::store(StaticCredentialStore::new()))
    }

    async fn mock_access() -> (ServerGuard, RedditAccess) {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token": "test-token", "token_type": "bearer", "expires_in": 3600, "scope": "*"}"#)
            .create_async()
            .await;

        let store = StaticCredentialStore::new().with(
            REDDIT_CREDENTIAL_ID,
            serde_json::json!({
                "client_id": "id",
                "client_secret": "secret",
                "refresh_token": "tok",
                "user_agent": "snoo-tools-tests/0.2",
            }),
        );
        let access = RedditAccess::new(CredentialSource::store(store))
            .with_api_base(server.url())
            .with_token_url(format!("{}/token", server.url()));
        (server, access)
    }

    fn parse(result: &str) -> serde_json::Value {
        serde_json::from_str(result).unwrap()
    }

    #[test]
    fn moderation_definitions() {
        let remove = RemovePost::new(unconfigured_access());
        let def = remove.definition();
        assert_eq!(def.function.name, "reddit_remove_post");
        assert!(remove.is_mutation());
        assert!(!remove.cacheable());

        // spam is optional.
        let required = def.function.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 1);
        assert!(required.contains(&json!("post_id")));

        let approve = ApprovePost::new(unconfigured_access());
        assert_eq!(approve.definition().function.name, "reddit_approve_post");
        assert!(approve.is_mutation());

        let ban = BanUser::new(unconfigured_access());
        let def = ban.definition();
        assert_eq!(def.function.name, "reddit_ban_user");
        assert!(ban.is_mutation());
        let required = def.function.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
        assert!(required.contains(&json!("subreddit")));
        assert!(required.contains(&json!("username")));
    }

    #[tokio::test]
    async fn remove_and_approve_reject_bad_id() {
        let remove = RemovePost::new(unconfigured_access());
        let result = remove.execute(r#"{"post_id": ""}"#).await;
        assert_eq!(parse(&result)["error"], "Post ID must be 1-20 characters");

        let approve = ApprovePost::new(unconfigured_access());
        let result = approve
            .execute(r#"{"post_id": "abcdefghijklmnopqrstu"}"#)
            .await;
        assert_eq!(parse(&result)["error"], "Post ID must be 1-20 characters");
    }

    #[tokio::test]
    async fn remove_post_reports_spam_in_the_message() {
        let (mut server, access) = mock_access().await;

        let mock = server
            .mock("POST", "/api/remove")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "t3_abc123".into()),
                Matcher::UrlEncoded("spam".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let tool = RemovePost::new(access);
        let result = tool.execute(r#"{"post_id": "abc123", "spam": true}"#).await;
        let value = parse(&result);
        assert_eq!(value["success"], true);
        assert_eq!(
            value["message"],
            "Post marked as spam and removed successfully"
        );

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn remove_post_defaults_to_plain_removal() {
        let (mut server, access) = mock_access().await;

        let mock = server
            .mock("POST", "/api/remove")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "t3_abc123".into()),
                Matcher::UrlEncoded("spam".into(), "false".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let tool = RemovePost::new(access);
        let result = tool.execute(r#"{"post_id": "abc123"}"#).await;
        assert_eq!(parse(&result)["message"], "Post removed successfully");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_moderation_mentions_permissions() {
        let (mut server, access) = mock_access().await;

        server
            .mock("POST", "/api/approve")
            .with_status(403)
            .with_body("Forbidden")
            .create_async()
            .await;

        let tool = ApprovePost::new(access);
        let result = tool.execute(r#"{"post_id": "abc123"}"#).await;
        let message = parse(&result)["error"].as_str().unwrap().to_string();
        assert!(
            message.starts_with("Reddit API error (check moderator permissions): HTTP 403"),
            "{message}"
        );
    }

    #[tokio::test]
    async fn ban_user_validates_subreddit_then_username() {
        let tool = BanUser::new(unconfigured_access());

        let result = tool
            .execute(r#"{"subreddit": "", "username": ""}"#)
            .await;
        assert_eq!(
            parse(&result)["error"],
            "Subreddit name must be 1-50 characters"
        );

        let result = tool
            .execute(r#"{"subreddit": "rust", "username": ""}"#)
            .await;
        assert_eq!(parse(&result)["error"], "Username must be 1-50 characters");
    }

    #[tokio::test]
    async fn ban_user_reports_temporary_ban() {
        let (mut server, access) = mock_access().await;

        let mock = server
            .mock("POST", "/r/rust/api/friend")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("type".into(), "banned".into()),
                Matcher::UrlEncoded("name".into(), "spammer".into()),
                Matcher::UrlEncoded("duration".into(), "7".into()),
                Matcher::UrlEncoded("ban_reason".into(), "Spam".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"json": {"errors": []}}"#)
            .create_async()
            .await;

        let tool = BanUser::new(access);
        let result = tool
            .execute(
                r#"{"subreddit": "rust", "username": "spammer", "duration": 7, "reason": "Spam"}"#,
            )
            .await;
        let value = parse(&result);
        assert_eq!(value["success"], true);
        assert_eq!(value["username"], "spammer");
        assert_eq!(value["subreddit"], "rust");
        assert_eq!(value["message"], "User spammer banned for 7 days from r/rust");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ban_user_treats_zero_duration_as_permanent() {
        let (mut server, access) = mock_access().await;

        // No duration field at all in the permanent form.
        let mock = server
            .mock("POST", "/r/rust/api/friend")
            .match_body(Matcher::Exact(
                "api_type=json&type=banned&name=spammer".into(),
            ))
            .with_status(200)
            .with_body(r#"{"json": {"errors": []}}"#)
            .create_async()
            .await;

        let tool = BanUser::new(access);
        let result = tool
            .execute(r#"{"subreddit": "rust", "username": "spammer", "duration": 0}"#)
            .await;
        assert_eq!(
            parse(&result)["message"],
            "User spammer banned permanently from r/rust"
        );

        mock.assert_async().await;
    }
}
