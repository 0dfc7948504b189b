use crate::{
    models::{Event, LanguageHistogram, Profile, RepositorySummary},
    Result,
};

/// Source of developer-network data
///
/// The analysis code never talks to the network itself; whatever implements
/// this hands it fully-resolved records. Caching, retries and rate-limit
/// handling are the implementation's problem.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DataProvider: Send + Sync {
    async fn user(&self, login: &str) -> Result<Profile>;
    async fn following(&self, login: &str, page: u32) -> Result<Vec<Profile>>;
    async fn followers(&self, login: &str, page: u32) -> Result<Vec<Profile>>;
    async fn repos(&self, login: &str, page: u32) -> Result<Vec<RepositorySummary>>;
    async fn starred(&self, login: &str, page: u32) -> Result<Vec<RepositorySummary>>;
    async fn repo(&self, owner: &str, name: &str) -> Result<RepositorySummary>;
    async fn languages(&self, owner: &str, name: &str) -> Result<LanguageHistogram>;
    async fn events(&self, login: &str) -> Result<Vec<Event>>;
    async fn search_users(&self, query: &str) -> Result<Vec<Profile>>;
}
