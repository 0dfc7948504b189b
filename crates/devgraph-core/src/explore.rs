// Fetch-then-analyze workflows behind the CLI commands
//
// Each function pulls what it needs from a DataProvider and hands the
// resolved records to the pure analysis functions. Nothing is kept between
// calls.
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::{
    activity::{compute_activity_level_at, format_relative_time_at, ActivityLevel},
    models::{LanguageHistogram, Profile, RepositorySummary},
    percentile::compute_percentile_rank,
    provider::DataProvider,
    recommend::{recommend_developers, recommend_repositories_at, Recommendation},
    social::{
        annotate_common_following, common_entities, compute_common_following_count,
        compute_similarity, sort_relations, CommonFollowing, RelationSort,
    },
    tags::{derive_tag_set, TagSet},
    Error, Result,
};

/// Repositories whose language breakdown feeds the technology tags
const LANGUAGE_SAMPLE_REPOS: usize = 3;

/// Upper bound on full-profile lookups for recommendation candidates
const MAX_CANDIDATES: usize = 20;

/// Everything shown on a developer's profile card
#[derive(Debug, Clone)]
pub struct DeveloperOverview {
    pub profile: Profile,
    pub tags: TagSet,
    pub activity: ActivityLevel,
    /// "joined 3 years ago", when the join date is known
    pub joined: Option<String>,
    pub top_repos: Vec<RepositorySummary>,
}

/// Developer recommendation plus where it sits in the candidate pool
#[derive(Debug, Clone)]
pub struct RankedDeveloper {
    pub recommendation: Recommendation<Profile>,
    /// Percentage of the candidate pool with at least this many followers
    pub follower_percentile: u32,
}

/// Overlap between two developers
#[derive(Debug, Clone)]
pub struct Comparison {
    pub a: Profile,
    pub b: Profile,
    pub common_following: Vec<Profile>,
    pub common_starred: Vec<RepositorySummary>,
    pub similarity: f64,
}

/// Which side of the follow graph to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Following,
    Followers,
}

/// Rate limits stop the whole workflow; anything else just drops that item
fn tolerate<T>(result: Result<T>, what: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ Error::RateLimitExceeded { .. }) => Err(e),
        Err(e) => {
            debug!("Skipping {}: {}", what, e);
            Ok(None)
        }
    }
}

pub async fn developer_overview(
    provider: &dyn DataProvider,
    login: &str,
    now: DateTime<Utc>,
) -> Result<DeveloperOverview> {
    let profile = provider.user(login).await?;
    let repos = provider.repos(login, 1).await?;
    let events = provider.events(login).await?;

    let lookups = repos
        .iter()
        .take(LANGUAGE_SAMPLE_REPOS)
        .map(|r| provider.languages(&r.owner.login, &r.name));

    let mut histogram = LanguageHistogram::new();
    for (repo, result) in repos.iter().zip(join_all(lookups).await) {
        if let Some(languages) = tolerate(result, &repo.full_name)? {
            histogram.merge(&languages);
        }
    }

    let tags = derive_tag_set(&histogram, &repos, &profile);
    let activity = compute_activity_level_at(&events, now);
    let joined = profile
        .created_at
        .map(|created| format_relative_time_at(created, now));

    Ok(DeveloperOverview {
        profile,
        tags,
        activity,
        joined,
        top_repos: repos.into_iter().take(5).collect(),
    })
}

/// Following or followers of `login`, each annotated with common-following
///
/// Only the first `fan_out` users get their own following list fetched; the
/// rest are `CommonFollowing::Unknown`.
pub async fn relations(
    provider: &dyn DataProvider,
    login: &str,
    direction: Direction,
    sort: RelationSort,
    fan_out: usize,
) -> Result<Vec<(Profile, CommonFollowing)>> {
    let viewer_following = provider.following(login, 1).await?;
    let users = match direction {
        Direction::Following => viewer_following.clone(),
        Direction::Followers => provider.followers(login, 1).await?,
    };

    let sampled: Vec<&Profile> = users.iter().take(fan_out).collect();
    let lookups = sampled.iter().map(|u| provider.following(&u.login, 1));

    let mut fetched: HashMap<u64, Vec<Profile>> = HashMap::new();
    for (user, result) in sampled.iter().zip(join_all(lookups).await) {
        if let Some(list) = tolerate(result, &user.login)? {
            fetched.insert(user.id, list);
        }
    }

    let mut annotated = annotate_common_following(&users, &viewer_following, |u| {
        fetched.get(&u.id).map(Vec::as_slice)
    });
    sort_relations(&mut annotated, sort);
    Ok(annotated)
}

/// Developers followed by the people `login` follows, scored and ranked
pub async fn developer_recommendations(
    provider: &dyn DataProvider,
    login: &str,
    fan_out: usize,
) -> Result<Vec<RankedDeveloper>> {
    let viewer = provider.user(login).await?;
    let following = provider.following(login, 1).await?;
    let followers = provider.followers(login, 1).await?;

    // Second-degree network, abbreviated users only
    let lookups = following
        .iter()
        .take(fan_out)
        .map(|u| provider.following(&u.login, 1));

    // No point fetching the viewer or people they already follow
    let mut seen: HashSet<u64> = following.iter().map(|u| u.id).collect();
    seen.insert(viewer.id);
    let mut logins = Vec::new();
    for (user, result) in following.iter().zip(join_all(lookups).await) {
        for candidate in tolerate(result, &user.login)?.unwrap_or_default() {
            if logins.len() < MAX_CANDIDATES && seen.insert(candidate.id) {
                logins.push(candidate.login);
            }
        }
    }

    // Counters only come with the full profile
    let profiles = join_all(logins.iter().map(|l| provider.user(l))).await;
    let mut pool = Vec::with_capacity(profiles.len());
    for (candidate, result) in logins.iter().zip(profiles) {
        if let Some(profile) = tolerate(result, candidate)? {
            pool.push(profile);
        }
    }

    let population: Vec<u32> = pool.iter().map(|p| p.followers).collect();
    let ranked = recommend_developers(&viewer, &following, &followers, &pool)
        .into_iter()
        .map(|recommendation| RankedDeveloper {
            follower_percentile: compute_percentile_rank(
                recommendation.entity.followers,
                &population,
            ),
            recommendation,
        })
        .collect();

    Ok(ranked)
}

/// Repositories owned by the people `login` follows, minus what they starred
pub async fn repository_recommendations(
    provider: &dyn DataProvider,
    login: &str,
    fan_out: usize,
    now: DateTime<Utc>,
) -> Result<Vec<Recommendation<RepositorySummary>>> {
    let starred = provider.starred(login, 1).await?;
    let following = provider.following(login, 1).await?;

    let lookups = following
        .iter()
        .take(fan_out)
        .map(|u| provider.repos(&u.login, 1));

    let mut candidates = Vec::new();
    for (user, result) in following.iter().zip(join_all(lookups).await) {
        candidates.extend(tolerate(result, &user.login)?.unwrap_or_default());
    }

    Ok(recommend_repositories_at(&starred, &candidates, now))
}

/// Overlap between two developers over the first page of each list
///
/// Similarity is the Dice coefficient of the fetched following lists, so the
/// denominator matches the sample the common count was taken from rather
/// than the full `following` counters.
pub async fn compare_developers(
    provider: &dyn DataProvider,
    login_a: &str,
    login_b: &str,
) -> Result<Comparison> {
    let a = provider.user(login_a).await?;
    let b = provider.user(login_b).await?;
    let following_a = provider.following(login_a, 1).await?;
    let following_b = provider.following(login_b, 1).await?;
    let starred_a = provider.starred(login_a, 1).await?;
    let starred_b = provider.starred(login_b, 1).await?;

    let common = compute_common_following_count(Some(&following_a[..]), Some(&following_b[..]));
    let similarity = compute_similarity(
        common,
        sample_size(following_a.len()),
        sample_size(following_b.len()),
    );

    let mut common_following = common_entities(&following_a, &following_b);
    common_following.sort_by(|x, y| y.followers.cmp(&x.followers));

    let mut common_starred = common_entities(&starred_a, &starred_b);
    common_starred.sort_by(|x, y| y.stargazers_count.cmp(&x.stargazers_count));

    Ok(Comparison {
        a,
        b,
        common_following,
        common_starred,
        similarity,
    })
}

fn sample_size(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Owner};
    use crate::provider::MockDataProvider;
    use crate::tags::TagCategory;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn user(id: u64, login: &str) -> Profile {
        Profile::new(id, login)
    }

    fn repo(id: u64, owner: &str, name: &str, stars: u32) -> RepositorySummary {
        RepositorySummary {
            id,
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            owner: Owner {
                login: owner.to_string(),
                avatar_url: String::new(),
            },
            description: None,
            html_url: format!("https://github.com/{}/{}", owner, name),
            stargazers_count: stars,
            forks_count: 0,
            language: Some("Rust".into()),
            updated_at: now() - Duration::days(1),
        }
    }

    #[tokio::test]
    async fn test_overview_merges_languages_and_tags() {
        let mut provider = MockDataProvider::new();
        provider.expect_user().returning(|_| {
            Ok(Profile {
                followers: 2000,
                created_at: Some(now() - Duration::days(800)),
                ..Profile::new(1, "ferris")
            })
        });
        provider
            .expect_repos()
            .returning(|_, _| Ok(vec![repo(1, "ferris", "web-server", 10), repo(2, "ferris", "cli", 5)]));
        provider.expect_events().returning(|_| {
            Ok((0..5)
                .map(|i| Event {
                    id: i.to_string(),
                    kind: "PushEvent".into(),
                    created_at: now() - Duration::hours(i),
                })
                .collect())
        });
        provider.expect_languages().returning(|_, name| {
            if name == "web-server" {
                Ok([("TypeScript", 100u64), ("Rust", 50)].into_iter().collect())
            } else {
                Ok([("Rust", 500u64)].into_iter().collect())
            }
        });

        let overview = developer_overview(&provider, "ferris", now()).await.unwrap();

        assert_eq!(overview.tags.get(TagCategory::Technology), ["Rust".to_string(), "TS".to_string()]);
        assert_eq!(overview.tags.get(TagCategory::Social), ["high-profile".to_string()]);
        assert!(overview.tags.domain.contains(&"frontend".to_string()));
        assert!((overview.activity.score - 0.5).abs() < 1e-9);
        assert_eq!(overview.joined.as_deref(), Some("2 years ago"));
    }

    #[tokio::test]
    async fn test_overview_skips_failed_language_lookup() {
        let mut provider = MockDataProvider::new();
        provider.expect_user().returning(|_| Ok(Profile::new(1, "ferris")));
        provider
            .expect_repos()
            .returning(|_, _| Ok(vec![repo(1, "ferris", "gone", 0)]));
        provider.expect_events().returning(|_| Ok(vec![]));
        provider
            .expect_languages()
            .returning(|_, _| Err(Error::NotFound("gone".into())));

        let overview = developer_overview(&provider, "ferris", now()).await.unwrap();
        assert!(overview.tags.technology.is_empty());
        assert_eq!(overview.activity.description, "No recent activity");
    }

    #[tokio::test]
    async fn test_rate_limit_aborts_workflow() {
        let mut provider = MockDataProvider::new();
        provider.expect_user().returning(|_| Ok(Profile::new(1, "ferris")));
        provider
            .expect_repos()
            .returning(|_, _| Ok(vec![repo(1, "ferris", "x", 0)]));
        provider.expect_events().returning(|_| Ok(vec![]));
        provider
            .expect_languages()
            .returning(|_, _| Err(Error::RateLimitExceeded { reset_at: None }));

        let result = developer_overview(&provider, "ferris", now()).await;
        assert!(matches!(result, Err(Error::RateLimitExceeded { .. })));
    }

    #[tokio::test]
    async fn test_relations_mark_unsampled_unknown() {
        let mut provider = MockDataProvider::new();
        provider.expect_following().returning(|login, _| {
            Ok(match login {
                "viewer" => vec![user(10, "a"), user(11, "b"), user(12, "c")],
                "a" => vec![user(11, "b"), user(12, "c")],
                _ => vec![],
            })
        });

        let list = relations(&provider, "viewer", Direction::Following, RelationSort::CommonFollowing, 2)
            .await
            .unwrap();

        let summary: Vec<(u64, CommonFollowing)> = list.iter().map(|(p, c)| (p.id, *c)).collect();
        assert_eq!(
            summary,
            vec![
                (10, CommonFollowing::Known(2)),
                (11, CommonFollowing::Known(0)),
                (12, CommonFollowing::Unknown),
            ]
        );
    }

    #[tokio::test]
    async fn test_developer_recommendations_from_second_degree() {
        let mut provider = MockDataProvider::new();
        provider.expect_user().returning(|login| {
            Ok(match login {
                "viewer" => user(1, "viewer"),
                "star" => Profile {
                    followers: 900,
                    public_repos: 40,
                    ..user(20, "star")
                },
                "quiet" => user(21, "quiet"),
                other => panic!("unexpected lookup of {}", other),
            })
        });
        provider.expect_following().returning(|login, _| {
            Ok(match login {
                "viewer" => vec![user(10, "friend")],
                "friend" => vec![user(20, "star"), user(21, "quiet"), user(1, "viewer"), user(10, "friend")],
                _ => vec![],
            })
        });
        provider.expect_followers().returning(|_, _| Ok(vec![]));

        let ranked = developer_recommendations(&provider, "viewer", 5).await.unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].recommendation.entity.login, "star");
        assert!((ranked[0].recommendation.score - 0.7).abs() < 1e-9);
        // Pool is star (900) and quiet (0); viewer and friend never get looked up
        assert_eq!(ranked[0].follower_percentile, 50);
    }

    #[tokio::test]
    async fn test_repository_recommendations_exclude_starred() {
        let mut provider = MockDataProvider::new();
        provider
            .expect_starred()
            .returning(|_, _| Ok(vec![repo(1, "x", "already", 5000)]));
        provider
            .expect_following()
            .returning(|_, _| Ok(vec![user(10, "friend")]));
        provider.expect_repos().returning(|_, _| {
            Ok(vec![repo(1, "friend", "already", 5000), repo(2, "friend", "fresh", 150)])
        });

        let recs = repository_recommendations(&provider, "viewer", 3, now()).await.unwrap();
        let ids: Vec<u64> = recs.iter().map(|r| r.entity.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(recs[0].reason, "Quality project | Recently active | Rust project");
    }

    #[tokio::test]
    async fn test_compare_developers() {
        let mut provider = MockDataProvider::new();
        provider.expect_user().returning(|login| {
            Ok(Profile {
                following: 4,
                ..user(if login == "a" { 1 } else { 2 }, login)
            })
        });
        provider.expect_following().returning(|login, _| {
            Ok(if login == "a" {
                vec![user(10, "x"), user(11, "y"), user(12, "z"), user(13, "w")]
            } else {
                vec![user(11, "y"), user(13, "w"), user(14, "v"), user(15, "u")]
            })
        });
        provider.expect_starred().returning(|login, _| {
            Ok(if login == "a" {
                vec![repo(100, "o", "small", 5), repo(101, "o", "big", 500)]
            } else {
                vec![repo(101, "o", "big", 500), repo(100, "o", "small", 5)]
            })
        });

        let cmp = compare_developers(&provider, "a", "b").await.unwrap();
        assert_eq!(cmp.common_following.len(), 2);
        assert!((cmp.similarity - 0.5).abs() < 1e-9);

        let starred: Vec<u64> = cmp.common_starred.iter().map(|r| r.id).collect();
        assert_eq!(starred, vec![101, 100]);
    }

    #[tokio::test]
    async fn test_similarity_uses_fetched_lists_not_counters() {
        let mut provider = MockDataProvider::new();
        provider.expect_user().returning(|login| {
            Ok(Profile {
                following: 5000,
                ..user(if login == "a" { 1 } else { 2 }, login)
            })
        });
        provider.expect_following().returning(|login, _| {
            Ok(if login == "a" {
                vec![user(10, "x"), user(11, "y")]
            } else {
                vec![user(10, "x"), user(12, "z")]
            })
        });
        provider.expect_starred().returning(|_, _| Ok(vec![]));

        let cmp = compare_developers(&provider, "a", "b").await.unwrap();
        assert!((cmp.similarity - 0.5).abs() < 1e-9);
    }
}
