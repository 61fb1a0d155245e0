//! Integration tests for the Reddit toolset.
//!
//! These tests register the full toolset against a mockito server standing
//! in for the Reddit API and exercise tools end to end through
//! [`ToolSet::execute`], so schema validation, timeouts, and result
//! truncation are all in play.

use mockito::{Matcher, ServerGuard};
use snoo_tools::credentials::{CredentialSource, REDDIT_CREDENTIAL_ID, StaticCredentialStore};
use snoo_tools::tools::core::ToolSet;
use snoo_tools::tools::{RedditAccess, RedditToolsExt};

/// Helper: start a mock Reddit (token exchange included) and point a
/// credentialed [`RedditAccess`] at it.
async fn mock_reddit() -> (ServerGuard, RedditAccess) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(
            r#"{"access_token": "test-token", "token_type": "bearer", "expires_in": 3600, "scope": "*"}"#,
        )
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

fn toolset(access: RedditAccess) -> ToolSet {
    ToolSet::new()
        .with_arg_validation(true)
        .with_reddit_tools(access)
}

fn listing_body(posts: &[serde_json::Value]) -> String {
    let children: Vec<serde_json::Value> = posts
        .iter()
        .map(|p| serde_json::json!({"kind": "t3", "data": p}))
        .collect();
    serde_json::json!({"kind": "Listing", "data": {"children": children}}).to_string()
}

fn post_fixture(id: &str, title: &str, score: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "author": "tester",
        "subreddit": "rust",
        "score": score,
        "upvote_ratio": 0.97,
        "num_comments": 12,
        "created_utc": 1_720_000_000.0,
        "url": format!("https://www.reddit.com/r/rust/comments/{id}/x/"),
        "permalink": format!("/r/rust/comments/{id}/x/"),
        "selftext": "body text",
        "is_self": true,
        "link_flair_text": "discussion",
    })
}

fn parse(result: &str) -> serde_json::Value {
    serde_json::from_str(result).unwrap_or_else(|e| panic!("result not JSON ({e}): {result}"))
}

// ── Read paths ──────────────────────────────────────────────────────

#[tokio::test]
async fn requested_limit_is_clamped_to_the_api_maximum() {
    let (mut server, access) = mock_reddit().await;

    // The tool was asked for 500; the API request must say 100.
    let mock = server
        .mock("GET", "/r/rust/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "rust".into()),
            Matcher::UrlEncoded("limit".into(), "100".into()),
            Matcher::UrlEncoded("raw_json".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(listing_body(&[post_fixture("abc123", "Test Post", 100)]))
        .create_async()
        .await;

    let result = toolset(access)
        .execute(
            "reddit_search_posts",
            r#"{"query": "rust", "subreddit": "rust", "limit": 500}"#,
        )
        .await;
    let value = parse(&result);
    assert_eq!(value["count"], 1);

    mock.assert_async().await;
}

#[tokio::test]
async fn upstream_fields_round_trip_verbatim() {
    let (mut server, access) = mock_reddit().await;

    server
        .mock("GET", "/r/rust/new")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(listing_body(&[post_fixture("abc123", "Test Post", 100)]))
        .create_async()
        .await;

    let result = toolset(access)
        .execute("reddit_get_subreddit_new", r#"{"subreddit": "rust"}"#)
        .await;
    let value = parse(&result);

    assert_eq!(value["subreddit"], "rust");
    assert_eq!(value["feed_type"], "new");
    assert_eq!(value["count"], 1);

    let post = &value["posts"][0];
    assert_eq!(post["id"], "abc123");
    assert_eq!(post["title"], "Test Post");
    assert_eq!(post["score"], 100);
    assert_eq!(post["author"], "tester");
    assert_eq!(post["permalink"], "https://reddit.com/r/rust/comments/abc123/x/");
}

#[tokio::test]
async fn upstream_errors_become_tool_results() {
    let (mut server, access) = mock_reddit().await;

    server
        .mock("GET", "/r/rust/new")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let result = toolset(access)
        .execute("reddit_get_subreddit_new", r#"{"subreddit": "rust"}"#)
        .await;
    let value = parse(&result);
    assert_eq!(
        value["error"],
        "Reddit API error: HTTP 500: upstream exploded"
    );
}

#[tokio::test]
async fn comment_search_reports_the_gap() {
    let (_server, access) = mock_reddit().await;

    let result = toolset(access)
        .execute("reddit_search_comments", r#"{"query": "mentions"}"#)
        .await;
    let value = parse(&result);
    assert_eq!(
        value["error"],
        "Comment search not directly supported by the Reddit API"
    );
    assert_eq!(
        value["help"],
        "Use reddit_search_posts and then reddit_get_comments for specific posts"
    );
}

#[tokio::test]
async fn get_comments_flattens_and_truncates() {
    let (mut server, access) = mock_reddit().await;

    let comment = |id: &str, parent: &str, replies: serde_json::Value| {
        serde_json::json!({
            "id": id,
            "author": "commenter",
            "body": format!("comment {id}"),
            "score": 5,
            "created_utc": 1_720_000_100.0,
            "permalink": format!("/r/rust/comments/abc123/x/{id}/"),
            "parent_id": parent,
            "link_id": "t3_abc123",
            "replies": replies,
        })
    };
    let nested = serde_json::json!({
        "kind": "Listing",
        "data": {"children": [
            {"kind": "t1", "data": comment("c1a", "t1_c1", serde_json::json!(""))},
        ]},
    });
    let body = serde_json::json!([
        {"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": post_fixture("abc123", "Test Post", 100)},
        ]}},
        {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": comment("c1", "t3_abc123", nested)},
            {"kind": "more", "data": {"count": 3, "children": ["c9"]}},
            {"kind": "t1", "data": comment("c2", "t3_abc123", serde_json::json!(""))},
        ]}},
    ]);

    server
        .mock("GET", "/comments/abc123")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sort".into(), "best".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let result = toolset(access)
        .execute(
            "reddit_get_comments",
            r#"{"post_id": "abc123", "limit": 2}"#,
        )
        .await;
    let value = parse(&result);

    // Thread order: top comment, then its reply; the limit cuts before c2
    // and the "more" stub never appears.
    assert_eq!(value["post_id"], "abc123");
    assert_eq!(value["count"], 2);
    assert_eq!(value["comments"][0]["id"], "c1");
    assert_eq!(value["comments"][1]["id"], "c1a");
    assert_eq!(value["comments"][1]["submission_id"], "abc123");
}

// ── Write paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn submit_post_round_trip() {
    let (mut server, access) = mock_reddit().await;

    let submit = server
        .mock("POST", "/api/submit")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_type".into(), "json".into()),
            Matcher::UrlEncoded("sr".into(), "rust".into()),
            Matcher::UrlEncoded("title".into(), "Hello world".into()),
            Matcher::UrlEncoded("kind".into(), "self".into()),
            Matcher::UrlEncoded("text".into(), "It works".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({"json": {"errors": [], "data": {
                "id": "xyz789",
                "name": "t3_xyz789",
                "url": "https://www.reddit.com/r/rust/comments/xyz789/hello_world/",
            }}})
            .to_string(),
        )
        .create_async()
        .await;

    // The tool refetches the created post for the full result payload.
    let refetch = server
        .mock("GET", "/api/info")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "t3_xyz789".into()),
            Matcher::UrlEncoded("raw_json".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(listing_body(&[post_fixture("xyz789", "Hello world", 1)]))
        .create_async()
        .await;

    let result = toolset(access)
        .execute(
            "reddit_submit_post",
            r#"{"subreddit": "rust", "title": "Hello world", "content": "It works"}"#,
        )
        .await;
    let value = parse(&result);

    assert_eq!(value["success"], true);
    assert_eq!(value["post_id"], "xyz789");
    assert_eq!(value["permalink"], "https://reddit.com/r/rust/comments/xyz789/x/");
    assert_eq!(value["post"]["title"], "Hello world");

    submit.assert_async().await;
    refetch.assert_async().await;
}

#[tokio::test]
async fn rejected_submission_reports_reddit_reason() {
    let (mut server, access) = mock_reddit().await;

    server
        .mock("POST", "/api/submit")
        .with_status(200)
        .with_body(
            serde_json::json!({"json": {"errors": [
                ["SUBREDDIT_NOEXIST", "that subreddit doesn't exist", "sr"],
            ]}})
            .to_string(),
        )
        .create_async()
        .await;

    let result = toolset(access)
        .execute(
            "reddit_submit_post",
            r#"{"subreddit": "nope", "title": "Hello", "content": "body"}"#,
        )
        .await;
    let value = parse(&result);
    let message = value["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to submit post:"), "{message}");
    assert!(message.contains("SUBREDDIT_NOEXIST"), "{message}");
}

// ── Harness-level behavior ──────────────────────────────────────────

#[tokio::test]
async fn schema_validation_rejects_wrong_types() {
    let (_server, access) = mock_reddit().await;

    // limit must be an integer; the schema check fires before the tool.
    let result = toolset(access)
        .execute(
            "reddit_search_posts",
            r#"{"query": "rust", "limit": "lots"}"#,
        )
        .await;
    assert!(
        result.starts_with("Error: argument validation failed for tool 'reddit_search_posts'"),
        "{result}"
    );
}

#[tokio::test]
async fn unknown_tool_is_reported() {
    let (_server, access) = mock_reddit().await;

    let result = toolset(access).execute("reddit_frobnicate", "{}").await;
    assert_eq!(result, "Error: unknown tool 'reddit_frobnicate'");
}

#[tokio::test]
async fn oversized_results_are_truncated() {
    let (mut server, access) = mock_reddit().await;

    let mut post = post_fixture("abc123", "Test Post", 100);
    post["selftext"] = serde_json::Value::String("x".repeat(400));
    server
        .mock("GET", "/r/rust/new")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(listing_body(&[post]))
        .create_async()
        .await;

    let tools = ToolSet::new()
        .with_arg_validation(true)
        .with_max_result_bytes(200)
        .with_reddit_tools(access);

    let result = tools
        .execute("reddit_get_subreddit_new", r#"{"subreddit": "rust"}"#)
        .await;
    assert!(result.len() < 300, "not truncated: {} bytes", result.len());
    assert!(result.contains("[truncated: "), "{result}");
}
