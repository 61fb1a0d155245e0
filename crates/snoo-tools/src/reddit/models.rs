//! Wire models for the Reddit JSON API and result serializers.
//!
//! Deserialization is deliberately lenient: unknown fields are ignored and
//! absent optionals default, because Reddit's payloads carry hundreds of
//! fields and grow new ones without notice. Only the fields the serializers
//! project are modeled.
//!
//! The serializers produce the flat JSON objects tools return to the model:
//! a fixed field set per entity, with long text capped at
//! [`BODY_PREVIEW_CHARS`] characters and permalinks made absolute.

use serde::{Deserialize, Deserializer};
use serde_json::json;

/// Character cap applied to `selftext` and comment `body` in serialized
/// results.
pub const BODY_PREVIEW_CHARS: usize = 500;

// ── Listing envelopes ──────────────────────────────────────────────

/// Reddit's kinded envelope: `{"kind": "t3", "data": {...}}`.
///
/// `kind` discriminates payloads inside mixed listings (`t1` comment,
/// `t3` submission, `more` collapsed-children stub).
#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

/// Reddit's paging envelope: `{"kind": "Listing", "data": {"children": [...]}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

// ── Payloads ───────────────────────────────────────────────────────

/// A submission (post) as returned by search, feed, and info endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Absent or null when the account was deleted.
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvote_ratio: f64,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub url: String,
    /// Site-relative path, e.g. `/r/rust/comments/abc123/title/`.
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

/// A comment as returned by the comment-tree and comment-posting endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
    /// Fullname of the parent (`t3_*` for top-level, `t1_*` for nested).
    #[serde(default)]
    pub parent_id: String,
    /// Fullname of the submission this comment belongs to.
    #[serde(default)]
    pub link_id: Option<String>,
    /// Child comments. Reddit sends `""` instead of a listing when there
    /// are none, which the custom deserializer flattens to an empty vec.
    #[serde(default, deserialize_with = "replies_or_empty")]
    pub replies: Vec<Thing<CommentData>>,
}

impl CommentData {
    /// Bare submission id derived from the `link_id` fullname.
    pub fn submission_id(&self) -> Option<&str> {
        self.link_id
            .as_deref()
            .and_then(|link_id| link_id.split_once('_'))
            .map(|(_, id)| id)
    }
}

/// A user account as returned by `/user/{name}/about` and `/api/v1/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditorData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
    #[serde(default)]
    pub is_gold: bool,
    #[serde(default)]
    pub is_mod: bool,
    /// Null for suspended accounts, so it stays nullable in results.
    #[serde(default)]
    pub has_verified_email: Option<bool>,
}

/// The `data` payload of a successful `/api/submit` call.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedThing {
    #[serde(default)]
    pub id: String,
    /// Fullname (`t3_*`) of the new submission.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl SubmittedThing {
    /// Bare id of the new submission, derived from the fullname when the
    /// `id` field is absent.
    pub fn post_id(&self) -> &str {
        if !self.id.is_empty() {
            return &self.id;
        }
        self.name
            .split_once('_')
            .map(|(_, id)| id)
            .unwrap_or(&self.name)
    }
}

/// The `data` payload of `/api/comment` and `/api/editusertext`: the
/// created or edited things.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentThings {
    #[serde(default)]
    pub things: Vec<Thing<CommentData>>,
}

/// Accepts Reddit's `replies` field, which is `""` when a comment has no
/// children and a `Thing<Listing>` when it does.
fn replies_or_empty<'de, D>(deserializer: D) -> Result<Vec<Thing<CommentData>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null | serde_json::Value::String(_) => Ok(Vec::new()),
        other => {
            let listing: Thing<Listing<CommentData>> =
                serde_json::from_value(other).map_err(serde::de::Error::custom)?;
            Ok(listing.data.children)
        }
    }
}

// ── Serializers ────────────────────────────────────────────────────

/// Project a submission into the flat result object.
pub fn serialize_submission(post: &SubmissionData) -> serde_json::Value {
    json!({
        "id": post.id,
        "title": post.title,
        "author": author_or_deleted(post.author.as_deref()),
        "subreddit": post.subreddit,
        "score": post.score,
        "upvote_ratio": post.upvote_ratio,
        "num_comments": post.num_comments,
        "created_utc": post.created_utc,
        "url": post.url,
        "permalink": absolute_permalink(&post.permalink),
        "selftext": truncate_chars(&post.selftext, BODY_PREVIEW_CHARS),
        "is_self": post.is_self,
        "link_flair_text": post.link_flair_text,
    })
}

/// Project a comment into the flat result object.
pub fn serialize_comment(comment: &CommentData) -> serde_json::Value {
    json!({
        "id": comment.id,
        "author": author_or_deleted(comment.author.as_deref()),
        "body": truncate_chars(&comment.body, BODY_PREVIEW_CHARS),
        "score": comment.score,
        "created_utc": comment.created_utc,
        "permalink": absolute_permalink(&comment.permalink),
        "parent_id": comment.parent_id,
        "submission_id": comment.submission_id(),
    })
}

/// Project a user account into the flat result object.
pub fn serialize_redditor(user: &RedditorData) -> serde_json::Value {
    json!({
        "name": user.name,
        "id": user.id,
        "created_utc": user.created_utc,
        "link_karma": user.link_karma,
        "comment_karma": user.comment_karma,
        "is_gold": user.is_gold,
        "is_mod": user.is_mod,
        "has_verified_email": user.has_verified_email,
    })
}

/// Flatten a comment tree depth-first, preserving thread order and
/// dropping `more` placeholder nodes (collapsed children are not fetched).
pub fn flatten_comment_tree(nodes: Vec<Thing<CommentData>>) -> Vec<CommentData> {
    let mut flat = Vec::new();
    flatten_into(nodes, &mut flat);
    flat
}

fn flatten_into(nodes: Vec<Thing<CommentData>>, out: &mut Vec<CommentData>) {
    for node in nodes {
        if node.kind != "t1" {
            continue;
        }
        let mut comment = node.data;
        let replies = std::mem::take(&mut comment.replies);
        out.push(comment);
        flatten_into(replies, out);
    }
}

/// First `max` characters of `s`. Reddit text is routinely multibyte, so
/// the cut counts characters, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn author_or_deleted(author: Option<&str>) -> &str {
    author.filter(|name| !name.is_empty()).unwrap_or("[deleted]")
}

fn absolute_permalink(permalink: &str) -> String {
    format!("https://reddit.com{permalink}")
}

// ── Tests ──────────────────────────────────────────────────────────
