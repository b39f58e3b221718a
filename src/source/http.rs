use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::{classify_failure, Endpoint};
use super::oauth::{self, Stamp, UserKeys};
use super::{clamp_limit, ApiError, SearchResponse, SearchSource};
use crate::config::SourceOptions;

pub const API_KEY_VAR: &str = "TWITTER_API_KEY";
pub const API_SECRET_VAR: &str = "TWITTER_API_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_SECRET_VAR: &str = "TWITTER_ACCESS_TOKEN_SECRET";

const TWEET_FIELDS: &str = "created_at,public_metrics,author_id";
const USER_FIELDS: &str = "name,username,profile_image_url,verified,public_metrics";

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask(&self.api_key))
            .field("user_context", &self.has_user_context())
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let api_key = read(API_KEY_VAR).ok_or_else(|| ApiError::MissingConfig(API_KEY_VAR.into()))?;
        let api_secret =
            read(API_SECRET_VAR).ok_or_else(|| ApiError::MissingConfig(API_SECRET_VAR.into()))?;
        Ok(Self {
            api_key,
            api_secret,
            access_token: read(ACCESS_TOKEN_VAR),
            access_token_secret: read(ACCESS_SECRET_VAR),
        })
    }

    /// Both halves of the user access token are present.
    pub fn has_user_context(&self) -> bool {
        self.access_token.is_some() && self.access_token_secret.is_some()
    }

    fn user_keys(&self) -> Option<UserKeys> {
        Some(UserKeys {
            consumer_key: self.api_key.clone(),
            consumer_secret: self.api_secret.clone(),
            token: self.access_token.clone()?,
            token_secret: self.access_token_secret.clone()?,
        })
    }
}

#[derive(Clone, Deserialize)]
pub struct BearerToken {
    pub token_type: String,
    pub access_token: String,
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token_type", &self.token_type)
            .field("access_token", &self.masked())
            .finish()
    }
}

impl BearerToken {
    pub fn masked(&self) -> String {
        mask(&self.access_token)
    }
}

/// Keep the first and last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Client for the recent-search endpoint.
pub struct HttpSearchClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    token: Option<BearerToken>,
    min_interval: Duration,
    last_request: Option<Instant>,
    rng: StdRng,
}

impl std::fmt::Debug for HttpSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSearchClient")
            .field("base_url", &self.base_url)
            .field("user_context", &self.credentials.has_user_context())
            .field("token_cached", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpSearchClient {
    pub fn new(options: &SourceOptions, credentials: Credentials) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .user_agent(concat!("mentionfeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: options.api_base_url.trim_end_matches('/').to_string(),
            credentials,
            token: None,
            min_interval: Duration::from_millis(options.min_request_interval_ms),
            last_request: None,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn uses_user_context(&self) -> bool {
        self.credentials.has_user_context()
    }

    /// App-only bearer token, exchanged once and then reused.
    pub fn bearer_token(&mut self) -> Result<BearerToken, ApiError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        self.pace();
        let url = format!("{}/oauth2/token", self.base_url);
        tracing::debug!(%url, "exchanging client credentials");
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?;
        let token: BearerToken = read_json(Endpoint::Token, response)?;
        tracing::info!(token_type = %token.token_type, "bearer token obtained");
        self.token = Some(token.clone());
        Ok(token)
    }

    fn pace(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "pacing request");
                thread::sleep(wait);
            }
        }
        self.last_request = Some(Instant::now());
    }

    fn search_url(&self) -> String {
        format!("{}/2/tweets/search/recent", self.base_url)
    }
}

pub(crate) fn search_params(query: &str, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("query", query.to_string()),
        ("max_results", clamp_limit(limit).to_string()),
        ("tweet.fields", TWEET_FIELDS.to_string()),
        ("user.fields", USER_FIELDS.to_string()),
        ("expansions", "author_id".to_string()),
    ]
}

impl SearchSource for HttpSearchClient {
    fn search(&mut self, query: &str, limit: usize) -> Result<SearchResponse, ApiError> {
        let url = self.search_url();
        let params = search_params(query, limit);

        let authorization = match self.credentials.user_keys() {
            Some(keys) => {
                let stamp = Stamp::fresh(&mut self.rng);
                let borrowed: Vec<(&str, &str)> =
                    params.iter().map(|(k, v)| (*k, v.as_str())).collect();
                oauth::authorization_header(&keys, &stamp, "GET", &url, &borrowed)?
            }
            None => format!("Bearer {}", self.bearer_token()?.access_token),
        };

        self.pace();
        tracing::debug!(query, limit, user_context = self.uses_user_context(), "recent search");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .query(&params)
            .send()?;

        let result = read_json::<SearchResponse>(Endpoint::Search, response);
        if let Err(ApiError::AuthenticationFailed { .. }) = &result {
            self.token = None;
        }
        let response = result?;
        tracing::info!(
            returned = response.meta.result_count,
            more = response.meta.next_token.is_some(),
            "search complete"
        );
        Ok(response)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn read_json<T: DeserializeOwned>(endpoint: Endpoint, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.text()?;

    if !status.is_success() {
        let err = classify_failure(endpoint, status.as_u16(), content_type.as_deref(), &body);
        tracing::warn!(status = status.as_u16(), error = %err, "request rejected");
        return Err(err);
    }
    if !content_type
        .as_deref()
        .is_some_and(|value| value.contains("application/json"))
    {
        return Err(ApiError::Parse(format!(
            "expected JSON, got {}",
            content_type.as_deref().unwrap_or("no content type")
        )));
    }
    serde_json::from_str(&body).map_err(|err| ApiError::Parse(err.to_string()))
}
