// Provider implementations - bridge API clients with the DataProvider trait
pub mod github;

pub use github::GitHubProvider;
