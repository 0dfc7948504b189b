use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything with a stable numeric id - developers and repositories alike
pub trait HasId {
    fn id(&self) -> u64;
}

/// Developer profile
///
/// Relation lists come back abbreviated, so the counters may be zero simply
/// because the API didn't send them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
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

impl Profile {
    /// Bare profile with only identity set - handy for tests and abbreviated users
    pub fn new(id: u64, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            name: None,
            avatar_url: String::new(),
            html_url: None,
            followers: 0,
            following: 0,
            public_repos: 0,
            total_private_repos: None,
            bio: None,
            location: None,
            company: None,
            blog: None,
            email: None,
            created_at: None,
        }
    }

    /// Name to show: display name when set, login otherwise
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

impl HasId for Profile {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Repository snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
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

impl HasId for RepositorySummary {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Bytes of code per language for one repository, in API order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageHistogram(Vec<(String, u64)>);

impl LanguageHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn total_bytes(&self) -> u64 {
        self.0.iter().map(|(_, bytes)| bytes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add another histogram's bytes; new languages go to the end
    pub fn merge(&mut self, other: &LanguageHistogram) {
        for (lang, bytes) in &other.0 {
            match self.0.iter_mut().find(|(l, _)| l == lang) {
                Some((_, total)) => *total += bytes,
                None => self.0.push((lang.clone(), *bytes)),
            }
        }
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for LanguageHistogram {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, bytes)| (name.into(), bytes)).collect())
    }
}

/// Public activity event - only the timestamp matters to the analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// A developer the user explicitly saved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedDeveloper {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub public_repos: u32,
    /// Epoch milliseconds, set once on first save
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
}

impl SavedDeveloper {
    pub fn from_profile(profile: &Profile, saved_at: i64) -> Self {
        Self {
            id: profile.id,
            login: profile.login.clone(),
            name: profile.name.clone(),
            avatar_url: profile.avatar_url.clone(),
            bio: profile.bio.clone(),
            followers: profile.followers,
            following: profile.following,
            public_repos: profile.public_repos,
            saved_at,
        }
    }

    pub fn url(&self) -> String {
        crate::links::developer_url(&self.login)
    }
}

impl HasId for SavedDeveloper {
    fn id(&self) -> u64 {
        self.id
    }
}

/// A repository the user explicitly saved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
}

impl SavedRepo {
    pub fn from_repository(repo: &RepositorySummary, saved_at: i64) -> Self {
        Self {
            id: repo.id,
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            owner: repo.owner.clone(),
            description: repo.description.clone(),
            url: crate::links::repository_url(repo).to_string(),
            stargazers_count: repo.stargazers_count,
            language: repo.language.clone(),
            saved_at,
        }
    }
}

impl HasId for SavedRepo {
    fn id(&self) -> u64 {
        self.id
    }
}
