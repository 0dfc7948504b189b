// Core analysis lives here - tags, recommendations, social overlap, favorites
pub mod activity;
pub mod config;
pub mod error;
pub mod explore;
pub mod favorites;
pub mod links;
pub mod models;
pub mod percentile;
pub mod provider;
pub mod providers;
pub mod recommend;
pub mod social;
pub mod tags;

pub use activity::{compute_activity_level, format_relative_time, ActivityLevel, Level};
pub use config::Config;
pub use error::Error;
pub use favorites::{Clock, FavoritesStore, SystemClock};
pub use models::{
    Event, HasId, LanguageHistogram, Owner, Profile, RepositorySummary, SavedDeveloper, SavedRepo,
};
pub use percentile::compute_percentile_rank;
pub use provider::DataProvider;
pub use providers::GitHubProvider;
pub use recommend::{recommend_developers, recommend_repositories, Recommendation};
pub use social::{
    compute_common_following_count, compute_similarity, CommonFollowing, RelationSort,
};
pub use tags::{derive_tag_set, TagCategory, TagSet};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
