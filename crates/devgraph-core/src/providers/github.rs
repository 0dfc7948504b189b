// GitHub provider implementation - bridges API client with DataProvider trait
use async_trait::async_trait;
use devgraph_api::{
    ClientConfig, GitHubClient, GitHubEvent, GitHubLanguages, GitHubOwner, GitHubRepo, GitHubUser,
};

use crate::{
    models::{Event, LanguageHistogram, Owner, Profile, RepositorySummary},
    provider::DataProvider,
    Result,
};

/// Wrapper around GitHubClient that implements DataProvider
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::with_config(config)?,
        })
    }
}

#[async_trait]
impl DataProvider for GitHubProvider {
    async fn user(&self, login: &str) -> Result<Profile> {
        Ok(github_to_profile(self.client.user(login).await?))
    }

    async fn following(&self, login: &str, page: u32) -> Result<Vec<Profile>> {
        let users = self.client.following(login, page).await?;
        Ok(users.into_iter().map(github_to_profile).collect())
    }

    async fn followers(&self, login: &str, page: u32) -> Result<Vec<Profile>> {
        let users = self.client.followers(login, page).await?;
        Ok(users.into_iter().map(github_to_profile).collect())
    }

    async fn repos(&self, login: &str, page: u32) -> Result<Vec<RepositorySummary>> {
        let repos = self.client.repos(login, page).await?;
        Ok(repos.into_iter().map(github_to_repo).collect())
    }

    async fn starred(&self, login: &str, page: u32) -> Result<Vec<RepositorySummary>> {
        let repos = self.client.starred(login, page).await?;
        Ok(repos.into_iter().map(github_to_repo).collect())
    }

    async fn repo(&self, owner: &str, name: &str) -> Result<RepositorySummary> {
        Ok(github_to_repo(self.client.repo(owner, name).await?))
    }

    async fn languages(&self, owner: &str, name: &str) -> Result<LanguageHistogram> {
        Ok(github_to_histogram(self.client.languages(owner, name).await?))
    }

    async fn events(&self, login: &str) -> Result<Vec<Event>> {
        let events = self.client.events(login).await?;
        Ok(events.into_iter().map(github_to_event).collect())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<Profile>> {
        let users = self.client.search_users(query).await?;
        Ok(users.into_iter().map(github_to_profile).collect())
    }
}

/// Convert GitHub API user to our internal Profile model
fn github_to_profile(user: GitHubUser) -> Profile {
    Profile {
        id: user.id,
        login: user.login,
        name: user.name,
        avatar_url: user.avatar_url,
        html_url: user.html_url,
        followers: user.followers,
        following: user.following,
        public_repos: user.public_repos,
        total_private_repos: user.total_private_repos,
        bio: user.bio,
        location: user.location,
        company: user.company,
        blog: user.blog,
        email: user.email,
        created_at: user.created_at,
    }
}

fn github_to_owner(owner: GitHubOwner) -> Owner {
    Owner {
        login: owner.login,
        avatar_url: owner.avatar_url,
    }
}

/// Convert GitHub API repository to our internal RepositorySummary model
fn github_to_repo(repo: GitHubRepo) -> RepositorySummary {
    RepositorySummary {
        id: repo.id,
        name: repo.name,
        full_name: repo.full_name,
        owner: github_to_owner(repo.owner),
        description: repo.description,
        html_url: repo.html_url,
        stargazers_count: repo.stargazers_count,
        forks_count: repo.forks_count,
        language: repo.language,
        updated_at: repo.updated_at,
    }
}

fn github_to_histogram(languages: GitHubLanguages) -> LanguageHistogram {
    languages.0.into_iter().collect()
}

fn github_to_event(event: GitHubEvent) -> Event {
    Event {
        id: event.id,
        kind: event.kind,
        created_at: event.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::derive_technology_tags;

    #[test]
    fn test_histogram_conversion_keeps_order() {
        let languages: GitHubLanguages =
            serde_json::from_str(r#"{"JavaScript": 800, "TypeScript": 200}"#).unwrap();

        let histogram = github_to_histogram(languages);
        assert_eq!(derive_technology_tags(&histogram), vec!["JS", "TS"]);
    }

    #[test]
    fn test_repo_conversion() {
        let repo: GitHubRepo = serde_json::from_str(
            r#"{
                "id": 10,
                "name": "linux",
                "full_name": "torvalds/linux",
                "owner": {"login": "torvalds", "avatar_url": "https://a/1"},
                "description": null,
                "html_url": "https://github.com/torvalds/linux",
                "stargazers_count": 170000,
                "forks_count": 50000,
                "language": "C",
                "updated_at": "2024-05-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        let summary = github_to_repo(repo);
        assert_eq!(summary.owner.login, "torvalds");
        assert_eq!(summary.stargazers_count, 170000);
        assert_eq!(summary.language.as_deref(), Some("C"));
        assert!(summary.description.is_none());
    }

    #[test]
    fn test_profile_conversion() {
        let user: GitHubUser = serde_json::from_str(
            r#"{"id": 1, "login": "octocat", "followers": 9000, "company": "@github"}"#,
        )
        .unwrap();

        let profile = github_to_profile(user);
        assert_eq!(profile.followers, 9000);
        assert_eq!(profile.company.as_deref(), Some("@github"));
        assert_eq!(profile.avatar_url, "");
    }

    #[test]
    fn test_provider_builds_from_default_config() {
        assert!(GitHubProvider::new(ClientConfig::default()).is_ok());
    }
}
