use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::retry::{is_retryable_status, with_retry_if, RetryConfig};

const GITHUB_API_BASE: &str = "https://api.github.com";
const PER_PAGE: u32 = 30;
const SEARCH_PER_PAGE: u32 = 10;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API rate limit exceeded{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("GitHub API error {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn reset_hint(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(", retry after {}", at.format("%H:%M:%S UTC")),
        None => String::new(),
    }
}

impl GitHubError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GitHubError::NetworkError(_) => true,
            GitHubError::RequestFailed { status, .. } => StatusCode::from_u16(*status)
                .map(is_retryable_status)
                .unwrap_or(false),
            GitHubError::RateLimited { .. }
            | GitHubError::NotFound(_)
            | GitHubError::ParseError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// User as returned by `/users/{login}`, relation lists and user search
///
/// Relation lists and search results only carry the abbreviated user, so the
/// counters default to zero when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub total_private_repos: Option<u32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: GitHubOwner,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct UserSearchResponse {
    items: Vec<GitHubUser>,
}

/// Language byte counts in the order GitHub lists them (largest first)
///
/// A plain map would lose that order, so this walks the JSON object by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubLanguages(pub Vec<(String, u64)>);

impl<'de> Deserialize<'de> for GitHubLanguages {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LanguagesVisitor;

        impl<'de> Visitor<'de> for LanguagesVisitor {
            type Value = GitHubLanguages;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language names to byte counts")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut languages = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, bytes)) = map.next_entry::<String, u64>()? {
                    languages.push((name, bytes));
                }
                Ok(GitHubLanguages(languages))
            }
        }

        deserializer.deserialize_map(LanguagesVisitor)
    }
}

/// Everything a client needs, passed in explicitly
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub cache_ttl: Duration,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: GITHUB_API_BASE.to_string(),
            token: None,
            cache_ttl: Duration::from_secs(60),
            retry: RetryConfig::default(),
        }
    }
}

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
    cache: ResponseCache,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_config(ClientConfig {
            token,
            ..ClientConfig::default()
        })
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("devgraph/0.1.0"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            // A token with non-header characters is a config mistake; run anonymous
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => debug!("Ignoring malformed GitHub token"),
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_config: config.retry,
            cache: ResponseCache::new(config.cache_ttl),
        })
    }

    pub async fn user(&self, login: &str) -> Result<GitHubUser> {
        self.get_json(&format!("/users/{}", urlencoding::encode(login)))
            .await
    }

    pub async fn following(&self, login: &str, page: u32) -> Result<Vec<GitHubUser>> {
        self.get_json(&format!(
            "/users/{}/following?page={}&per_page={}",
            urlencoding::encode(login),
            page,
            PER_PAGE
        ))
        .await
    }

    pub async fn followers(&self, login: &str, page: u32) -> Result<Vec<GitHubUser>> {
        self.get_json(&format!(
            "/users/{}/followers?page={}&per_page={}",
            urlencoding::encode(login),
            page,
            PER_PAGE
        ))
        .await
    }

    pub async fn repos(&self, login: &str, page: u32) -> Result<Vec<GitHubRepo>> {
        self.get_json(&format!(
            "/users/{}/repos?page={}&per_page={}&sort=stars&direction=desc",
            urlencoding::encode(login),
            page,
            PER_PAGE
        ))
        .await
    }

    pub async fn starred(&self, login: &str, page: u32) -> Result<Vec<GitHubRepo>> {
        self.get_json(&format!(
            "/users/{}/starred?page={}&per_page={}&sort=stars&direction=desc",
            urlencoding::encode(login),
            page,
            PER_PAGE
        ))
        .await
    }

    pub async fn repo(&self, owner: &str, name: &str) -> Result<GitHubRepo> {
        self.get_json(&format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(name)
        ))
        .await
    }

    pub async fn languages(&self, owner: &str, name: &str) -> Result<GitHubLanguages> {
        self.get_json(&format!(
            "/repos/{}/{}/languages",
            urlencoding::encode(owner),
            urlencoding::encode(name)
        ))
        .await
    }

    pub async fn events(&self, login: &str) -> Result<Vec<GitHubEvent>> {
        self.get_json(&format!(
            "/users/{}/events/public?per_page={}",
            urlencoding::encode(login),
            PER_PAGE
        ))
        .await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<GitHubUser>> {
        let response: UserSearchResponse = self
            .get_json(&format!(
                "/search/users?q={}&per_page={}",
                urlencoding::encode(query),
                SEARCH_PER_PAGE
            ))
            .await?;
        Ok(response.items)
    }

    /// GET a path, going through the response cache and retry policy
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let body = self
            .cache
            .get_or_fetch(&url, || {
                with_retry_if(&self.retry_config, || self.fetch(&url), GitHubError::is_transient)
            })
            .await?;

        Ok(serde_json::from_value(body)?)
    }

    async fn fetch(&self, url: &str) -> Result<serde_json::Value> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GitHubError::RateLimited {
                reset_at: rate_limit_reset(response.headers()),
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// When the rate-limit window reopens, if the quota is actually exhausted
pub fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?;
    if remaining.trim() != "0" {
        return None;
    }

    let reset = headers
        .get("x-ratelimit-reset")?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()?;

    Utc.timestamp_opt(reset, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_rate_limit_reset_when_exhausted() {
        let map = headers(&[
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "1700000000"),
        ]);

        let reset = rate_limit_reset(&map).unwrap();
        assert_eq!(reset.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_rate_limit_reset_ignored_with_quota_left() {
        let map = headers(&[
            ("x-ratelimit-remaining", "12"),
            ("x-ratelimit-reset", "1700000000"),
        ]);
        assert_eq!(rate_limit_reset(&map), None);
    }

    #[test]
    fn test_rate_limit_reset_missing_headers() {
        assert_eq!(rate_limit_reset(&HeaderMap::new()), None);
        assert_eq!(
            rate_limit_reset(&headers(&[("x-ratelimit-remaining", "0")])),
            None
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(GitHubError::RequestFailed {
            status: 502,
            body: String::new()
        }
        .is_transient());
        assert!(!GitHubError::RequestFailed {
            status: 422,
            body: String::new()
        }
        .is_transient());
        assert!(!GitHubError::RateLimited { reset_at: None }.is_transient());
        assert!(!GitHubError::NotFound("x".into()).is_transient());
    }

    #[test]
    fn test_rate_limit_message_mentions_reset() {
        let err = GitHubError::RateLimited {
            reset_at: Utc.timestamp_opt(0, 0).single(),
        };
        assert_eq!(
            err.to_string(),
            "API rate limit exceeded, retry after 00:00:00 UTC"
        );
        assert_eq!(
            GitHubError::RateLimited { reset_at: None }.to_string(),
            "API rate limit exceeded"
        );
    }

    #[test]
    fn test_languages_keep_document_order() {
        let langs: GitHubLanguages =
            serde_json::from_str(r#"{"TypeScript": 200, "JavaScript": 800, "CSS": 5}"#).unwrap();

        assert_eq!(
            langs.0,
            vec![
                ("TypeScript".to_string(), 200),
                ("JavaScript".to_string(), 800),
                ("CSS".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_abbreviated_user_defaults_counters() {
        let user: GitHubUser = serde_json::from_str(
            r#"{"id": 1, "login": "octocat", "avatar_url": "https://a/1"}"#,
        )
        .unwrap();

        assert_eq!(user.followers, 0);
        assert_eq!(user.public_repos, 0);
        assert!(user.company.is_none());
    }

    #[test]
    fn test_event_type_field() {
        let event: GitHubEvent = serde_json::from_str(
            r#"{"id": "1", "type": "PushEvent", "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.kind, "PushEvent");
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = GitHubClient::with_config(ClientConfig {
            base_url: "https://ghe.example.com/api/v3/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url, "https://ghe.example.com/api/v3");
    }
}
