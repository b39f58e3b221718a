//! Search capability shared by the live HTTP client and the synthetic
//! stand-in. Both return the remote endpoint's result shape so callers can
//! swap one for the other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::{SourceKind, SourceOptions};
use crate::feed::{age_label, roster, synth, Author, Category, Engagement, Record, Sentiment};

pub mod error;
pub mod http;
pub mod oauth;
pub mod synthetic;

pub use error::ApiError;
pub use http::{BearerToken, Credentials, HttpSearchClient};
pub use synthetic::SyntheticSource;

/// Accepted bounds for `max_results` on the recent-search endpoint.
pub const MIN_RESULTS: usize = 10;
pub const MAX_RESULTS: usize = 100;

pub trait SearchSource {
    fn search(&mut self, query: &str, limit: usize) -> Result<SearchResponse, ApiError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    pub retweet_count: u64,
    pub like_count: u64,
    pub reply_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impression_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub author_id: String,
    pub public_metrics: PostMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub public_metrics: UserMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<RawUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMeta {
    #[serde(default)]
    pub result_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<RawPost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Includes>,
    #[serde(default)]
    pub meta: ResultMeta,
}

impl SearchResponse {
    /// Convert raw posts into feed records, resolving authors through the
    /// user expansion table. Ages are measured against `now`.
    pub fn into_records(self, now: OffsetDateTime) -> Vec<Record> {
        let users: HashMap<String, RawUser> = self
            .includes
            .map(|includes| {
                includes
                    .users
                    .into_iter()
                    .map(|user| (user.id.clone(), user))
                    .collect()
            })
            .unwrap_or_default();

        self.data
            .into_iter()
            .map(|post| {
                let author = match users.get(&post.author_id) {
                    Some(user) => Author {
                        display_name: user.name.clone(),
                        handle: format!("@{}", user.username),
                        avatar_ref: user.profile_image_url.clone().unwrap_or_default(),
                        verified: user.verified,
                        follower_count: user.public_metrics.followers_count,
                    },
                    None => Author {
                        display_name: "Unknown".to_string(),
                        handle: format!("@{}", post.author_id),
                        avatar_ref: String::new(),
                        verified: false,
                        follower_count: 0,
                    },
                };
                let minutes_ago = post
                    .created_at
                    .as_deref()
                    .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
                    .map(|created| (now - created).as_seconds_f64().max(0.0) / 60.0)
                    .unwrap_or(0.0);
                let category = if post.text.starts_with("RT @") {
                    Category::Retweet
                } else {
                    Category::Mention
                };
                Record {
                    url: format!(
                        "https://twitter.com/{}/status/{}",
                        author.handle.trim_start_matches('@'),
                        post.id
                    ),
                    id: post.id,
                    sentiment: classify_sentiment(&post.text),
                    author,
                    age_label: age_label(minutes_ago),
                    engagement: Engagement {
                        like_count: post.public_metrics.like_count,
                        retweet_count: post.public_metrics.retweet_count,
                        reply_count: post.public_metrics.reply_count,
                        view_count: post.public_metrics.impression_count.unwrap_or(0),
                    },
                    category,
                    body: post.text,
                    is_unseen: false,
                }
            })
            .collect()
    }
}

const POSITIVE_CUES: &[&str] = &[
    "excited", "impressed", "impressive", "bullish", "incredible", "game changer",
    "brilliant", "revolutionary", "mind-blowing", "huge fan", "breakthrough", "love",
];

const NEGATIVE_CUES: &[&str] = &[
    "skeptical", "concerned", "worried", "risk", "problematic", "unclear",
    "vulnerabilit", "attack vector", "overly complex", "not sure", "bugs",
];

/// Sentiment of a post body: exact matches against the synthetic pools win,
/// otherwise a small cue lexicon decides.
pub fn classify_sentiment(text: &str) -> Sentiment {
    for sentiment in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
        if synth::body_pool(sentiment).contains(&text) {
            return sentiment;
        }
    }
    let lowered = text.to_lowercase();
    let positive = POSITIVE_CUES
        .iter()
        .filter(|cue| lowered.contains(*cue))
        .count();
    let negative = NEGATIVE_CUES
        .iter()
        .filter(|cue| lowered.contains(*cue))
        .count();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(MIN_RESULTS, MAX_RESULTS)
}

/// Build the configured search capability.
pub fn build(options: &SourceOptions, seed: Option<u64>) -> Result<Box<dyn SearchSource>, ApiError> {
    match options.kind {
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(seed))),
        SourceKind::Http => {
            let credentials = Credentials::from_env()?;
            Ok(Box::new(HttpSearchClient::new(options, credentials)?))
        }
    }
}

pub(crate) fn roster_user_id(handle: &str) -> String {
    let bare = handle.trim_start_matches('@');
    roster::INFLUENTIAL
        .iter()
        .chain(roster::REGULAR.iter())
        .position(|entry| entry.handle == bare)
        .map(|position| (1_000_000 + position).to_string())
        .unwrap_or_else(|| bare.to_string())
}
