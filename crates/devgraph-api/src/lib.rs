// GitHub REST client - the only thing in the workspace that talks to the network
pub mod cache;
pub mod github;
pub mod retry;

// Re-export common types
pub use cache::ResponseCache;
pub use github::{
    ClientConfig, GitHubClient, GitHubError, GitHubEvent, GitHubLanguages, GitHubOwner,
    GitHubRepo, GitHubUser,
};
pub use retry::RetryConfig;
