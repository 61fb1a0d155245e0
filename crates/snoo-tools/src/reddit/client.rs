//! Thin OAuth2 client for the Reddit REST API.
//!
//! A [`RedditClient`] is constructed per tool invocation via
//! [`RedditClient::login`], which exchanges the refresh token for an access
//! token. Nothing is cached across invocations: a stale or revoked token
//! costs one failed call, not a corrupted session.
//!
//! Base URLs are constructor parameters so tests can point the client at a
//! local mock server instead of `oauth.reddit.com`.

use crate::credentials::RedditCredentials;
use crate::reddit::models::{
    CommentData, CommentThings, Listing, RedditorData, SubmissionData, SubmittedThing, Thing,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// OAuth-authenticated API host.
pub const REDDIT_API_URL: &str = "https://oauth.reddit.com";

/// Token-exchange endpoint (lives on the unauthenticated host).
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Per-request timeout applied to the underlying HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures talking to Reddit.
///
/// `Api` is the upstream saying no (an HTTP error status); everything else
/// is a transport, protocol, or payload problem. The tool layer picks its
/// message prefix based on this distinction.
#[derive(Debug, Error)]
pub enum RedditError {
    /// Token exchange failed (bad credentials, revoked token).
    #[error("{0}")]
    Auth(String),

    /// The API answered with an error status.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// A 200 response whose `json.errors` array reports a rejection
    /// (nonexistent subreddit, rate limit, bad flair id).
    #[error("{0}")]
    Rejected(String),

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not parse as the expected shape.
    #[error("unexpected response format: {0}")]
    Decode(String),
}

/// Body of a new submission: exactly one of self-text or link.
#[derive(Debug, Clone, Copy)]
pub enum SubmitContent<'a> {
    SelfText(&'a str),
    Link(&'a str),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Envelope of `api_type=json` POST responses:
/// `{"json": {"errors": [...], "data": {...}}}`.
#[derive(Debug, Deserialize)]
struct ApiJsonEnvelope<T> {
    json: ApiJsonBody<T>,
}

#[derive(Debug, Deserialize)]
struct ApiJsonBody<T> {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<T>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Authenticated handle over the Reddit REST API.
#[derive(Debug)]
pub struct RedditClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl RedditClient {
    /// Exchange the refresh token for an access token and build a client.
    ///
    /// `api_base` and `token_url` default to [`REDDIT_API_URL`] and
    /// [`REDDIT_TOKEN_URL`] at the call sites that talk to real Reddit.
    pub async fn login(
        credentials: &RedditCredentials,
        api_base: &str,
        token_url: &str,
    ) -> Result<Self, RedditError> {
        let http = reqwest::Client::builder()
            .user_agent(credentials.user_agent.as_str())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        debug!("exchanging refresh token at {token_url}");
        let response = http
            .post(token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RedditError::Auth(format!(
                "token exchange failed with HTTP {}: {}",
                status.as_u16(),
                snippet(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RedditError::Decode(format!("token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(RedditError::Auth(
                "token response carried no access_token".into(),
            ));
        }

        Ok(Self {
            http,
            token: token.access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    // ── Search & feeds ─────────────────────────────────────────────

    /// Search submissions in `r/{subreddit}` (site-wide when "all").
    pub async fn search_posts(
        &self,
        subreddit: &str,
        query: &str,
        sort: &str,
        time_filter: &str,
        limit: i64,
    ) -> Result<Vec<SubmissionData>, RedditError> {
        let restrict_sr = if subreddit == "all" { "false" } else { "true" };
        let params = [
            ("q", query.to_string()),
            ("restrict_sr", restrict_sr.to_string()),
            ("sort", sort.to_string()),
            ("t", time_filter.to_string()),
            ("limit", limit.to_string()),
        ];
        let listing: Thing<Listing<SubmissionData>> = self
            .get_json(&format!("/r/{subreddit}/search"), &params)
            .await?;
        Ok(unwrap_children(listing))
    }

    /// Newest submissions in a subreddit.
    pub async fn subreddit_new(
        &self,
        subreddit: &str,
        limit: i64,
    ) -> Result<Vec<SubmissionData>, RedditError> {
        self.feed(subreddit, "new", limit).await
    }

    /// Currently-hot submissions in a subreddit.
    pub async fn subreddit_hot(
        &self,
        subreddit: &str,
        limit: i64,
    ) -> Result<Vec<SubmissionData>, RedditError> {
        self.feed(subreddit, "hot", limit).await
    }

    async fn feed(
        &self,
        subreddit: &str,
        feed: &str,
        limit: i64,
    ) -> Result<Vec<SubmissionData>, RedditError> {
        let params = [("limit", limit.to_string())];
        let listing: Thing<Listing<SubmissionData>> = self
            .get_json(&format!("/r/{subreddit}/{feed}"), &params)
            .await?;
        Ok(unwrap_children(listing))
    }

    /// Fetch a single submission by bare id.
    pub async fn submission(&self, post_id: &str) -> Result<SubmissionData, RedditError> {
        let fullname = format!("t3_{post_id}");
        let params = [("id", fullname.clone())];
        let listing: Thing<Listing<SubmissionData>> =
            self.get_json("/api/info", &params).await?;
        listing
            .data
            .children
            .into_iter()
            .next()
            .map(|thing| thing.data)
            .ok_or(RedditError::Api {
                status: 404,
                message: format!("no submission matched id {fullname}"),
            })
    }

    /// Fetch the comment tree of a submission. Returns the top-level nodes
    /// with replies nested; `more` stubs are left in place for the caller
    /// to skip.
    pub async fn comments(
        &self,
        post_id: &str,
        sort: &str,
        limit: i64,
    ) -> Result<Vec<Thing<CommentData>>, RedditError> {
        let params = [("sort", sort.to_string()), ("limit", limit.to_string())];
        // The endpoint returns a two-element array: the submission listing,
        // then the comment listing.
        let (_, comments): (Thing<Listing<SubmissionData>>, Thing<Listing<CommentData>>) =
            self.get_json(&format!("/comments/{post_id}"), &params).await?;
        Ok(comments.data.children)
    }

    // ── Content creation ───────────────────────────────────────────

    /// Create a submission. Returns the new post's id/fullname/url.
    pub async fn submit(
        &self,
        subreddit: &str,
        title: &str,
        content: SubmitContent<'_>,
        flair_id: Option<&str>,
    ) -> Result<SubmittedThing, RedditError> {
        let mut form = vec![
            ("api_type", "json"),
            ("sr", subreddit),
            ("title", title),
            ("resubmit", "true"),
        ];
        match content {
            SubmitContent::SelfText(text) => {
                form.push(("kind", "self"));
                form.push(("text", text));
            }
            SubmitContent::Link(url) => {
                form.push(("kind", "link"));
                form.push(("url", url));
            }
        }
        if let Some(flair_id) = flair_id {
            form.push(("flair_id", flair_id));
        }
        self.post_api("/api/submit", &form).await
    }

    /// Reply to a submission (`t3_*`) or comment (`t1_*`) fullname.
    /// Returns the created comment.
    pub async fn reply(
        &self,
        parent_fullname: &str,
        text: &str,
    ) -> Result<CommentData, RedditError> {
        let things: CommentThings = self
            .post_api(
                "/api/comment",
                &[
                    ("api_type", "json"),
                    ("thing_id", parent_fullname),
                    ("text", text),
                ],
            )
            .await?;
        things
            .things
            .into_iter()
            .next()
            .map(|thing| thing.data)
            .ok_or_else(|| RedditError::Decode("/api/comment returned no things".into()))
    }

    /// Replace the body of one of the account's own comments.
    pub async fn edit_comment(
        &self,
        comment_fullname: &str,
        new_text: &str,
    ) -> Result<(), RedditError> {
        self.post_api_ok(
            "/api/editusertext",
            &[
                ("api_type", "json"),
                ("thing_id", comment_fullname),
                ("text", new_text),
            ],
        )
        .await
    }

    /// Delete one of the account's own things.
    pub async fn delete(&self, fullname: &str) -> Result<(), RedditError> {
        self.post_form("/api/del", &[("id", fullname)]).await?;
        Ok(())
    }

    // ── Engagement ─────────────────────────────────────────────────

    /// Vote on a thing: `1` up, `-1` down, `0` rescind.
    pub async fn vote(&self, fullname: &str, direction: i32) -> Result<(), RedditError> {
        let dir = direction.to_string();
        self.post_form("/api/vote", &[("id", fullname), ("dir", dir.as_str())])
            .await?;
        Ok(())
    }

    /// Save a thing to the account's saved list.
    pub async fn save(&self, fullname: &str) -> Result<(), RedditError> {
        self.post_form("/api/save", &[("id", fullname)]).await?;
        Ok(())
    }

    /// Public profile of a user.
    pub async fn user_about(&self, username: &str) -> Result<RedditorData, RedditError> {
        let about: Thing<RedditorData> = self
            .get_json(&format!("/user/{username}/about"), &[])
            .await?;
        Ok(about.data)
    }

    /// The authenticated account. Used as the credential health check.
    pub async fn me(&self) -> Result<RedditorData, RedditError> {
        self.get_json("/api/v1/me", &[]).await
    }

    // ── Moderation ─────────────────────────────────────────────────

    /// Remove a thing as a moderator, optionally marking it spam.
    pub async fn remove(&self, fullname: &str, spam: bool) -> Result<(), RedditError> {
        let spam = if spam { "true" } else { "false" };
        self.post_form("/api/remove", &[("id", fullname), ("spam", spam)])
            .await?;
        Ok(())
    }

    /// Approve a thing as a moderator.
    pub async fn approve(&self, fullname: &str) -> Result<(), RedditError> {
        self.post_form("/api/approve", &[("id", fullname)]).await?;
        Ok(())
    }

    /// Ban a user from a subreddit. `duration_days: None` is permanent.
    pub async fn ban_user(
        &self,
        subreddit: &str,
        username: &str,
        duration_days: Option<i64>,
        reason: &str,
        note: &str,
    ) -> Result<(), RedditError> {
        let duration;
        let mut form = vec![
            ("api_type", "json"),
            ("type", "banned"),
            ("name", username),
        ];
        if let Some(days) = duration_days {
            duration = days.to_string();
            form.push(("duration", duration.as_str()));
        }
        if !reason.is_empty() {
            form.push(("ban_reason", reason));
        }
        if !note.is_empty() {
            form.push(("note", note));
        }
        self.post_api_ok(&format!("/r/{subreddit}/api/friend"), &form)
            .await
    }

    // ── Transport ──────────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, RedditError> {
        let url = format!("{}{path}", self.api_base);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("raw_json", "1")])
            .query(params)
            .send()
            .await?;
        let body = read_body(response).await?;
        trace!("GET {path} returned {} bytes", body.len());
        serde_json::from_str(&body).map_err(|e| RedditError::Decode(format!("{path}: {e}")))
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String, RedditError> {
        let url = format!("{}{path}", self.api_base);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .form(form)
            .send()
            .await?;
        read_body(response).await
    }

    /// POST an `api_type=json` form and unwrap the `json.data` payload,
    /// surfacing the `json.errors` array as [`RedditError::Rejected`].
    async fn post_api<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, RedditError> {
        let body = self.post_form(path, form).await?;
        let envelope: ApiJsonEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| RedditError::Decode(format!("{path}: {e}")))?;
        if !envelope.json.errors.is_empty() {
            return Err(RedditError::Rejected(rejection_message(&envelope.json.errors)));
        }
        envelope
            .json
            .data
            .ok_or_else(|| RedditError::Decode(format!("{path}: response carried no data")))
    }

    /// Like [`Self::post_api`] but for endpoints whose success payload is
    /// empty or uninteresting.
    async fn post_api_ok(&self, path: &str, form: &[(&str, &str)]) -> Result<(), RedditError> {
        let body = self.post_form(path, form).await?;
        let envelope: ApiJsonEnvelope<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| RedditError::Decode(format!("{path}: {e}")))?;
        if !envelope.json.errors.is_empty() {
            return Err(RedditError::Rejected(rejection_message(&envelope.json.errors)));
        }
        Ok(())
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, RedditError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RedditError::Api {
            status: status.as_u16(),
            message: snippet(&body),
        });
    }
    Ok(body)
}

fn unwrap_children<T>(listing: Thing<Listing<T>>) -> Vec<T> {
    listing
        .data
        .children
        .into_iter()
        .map(|thing| thing.data)
        .collect()
}

/// Render Reddit's `json.errors` entries (arrays of strings) as one line.
fn rejection_message(errors: &[serde_json::Value]) -> String {
    let parts: Vec<&str> = errors
        .iter()
        .flat_map(|entry| entry.as_array().into_iter().flatten())
        .filter_map(|part| part.as_str())
        .collect();
    if parts.is_empty() {
        "request rejected by Reddit".to_string()
    } else {
        parts.join(": ")
    }
}

/// Bounded excerpt of an error body. Reddit serves whole HTML pages on
/// some failures.
fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(MAX_CHARS).collect();
    format!("{head}...")
}

// ── Tests ──────────────────────────────────────────────────────────
