//! Reddit REST API access: OAuth2 client, wire models, result serializers.
//!
//! [`client::RedditClient`] is a thin handle over `oauth.reddit.com` built
//! fresh for each tool invocation. [`models`] holds the listing envelopes and
//! payload structs the API returns, plus the serializers that project them
//! into the flat JSON objects tools hand back to the model.

pub mod client;
pub mod models;

pub use client::{RedditClient, RedditError, SubmitContent};
