use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{HasId, Profile, RepositorySummary};

/// How many recommendations a list is cut down to
pub const MAX_RECOMMENDATIONS: usize = 10;

const REASON_SEPARATOR: &str = " | ";

/// A ranked suggestion with a human-readable why
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation<T> {
    pub entity: T,
    pub reason: String,
    pub score: f64,
}

/// Accumulates score and reason fragments for one candidate
#[derive(Debug, Default)]
struct Scorecard {
    score: f64,
    reasons: Vec<String>,
}

impl Scorecard {
    fn add(&mut self, points: f64, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }

    fn into_recommendation<T>(self, entity: T) -> Option<Recommendation<T>> {
        if self.score > 0.0 {
            Some(Recommendation {
                entity,
                reason: self.reasons.join(REASON_SEPARATOR),
                score: self.score,
            })
        } else {
            None
        }
    }
}

/// Highest score first, ties in input order, top N
fn rank<T>(mut recommendations: Vec<Recommendation<T>>) -> Vec<Recommendation<T>> {
    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

/// Developers worth following that the viewer isn't connected to yet
///
/// Candidates the viewer follows, is followed by, or is, are skipped outright.
/// The "followed by people you follow" signal is a proxy: we don't have the
/// followings of everyone the viewer follows, so a candidate with more than
/// 100 followers is assumed to be followed by someone in the viewer's network
/// (as long as the viewer follows anybody at all).
pub fn recommend_developers(
    viewer: &Profile,
    following: &[Profile],
    followers: &[Profile],
    candidates: &[Profile],
) -> Vec<Recommendation<Profile>> {
    let following_ids: HashSet<u64> = following.iter().map(HasId::id).collect();
    let follower_ids: HashSet<u64> = followers.iter().map(HasId::id).collect();

    let recommendations = candidates
        .iter()
        .filter(|c| {
            !following_ids.contains(&c.id) && !follower_ids.contains(&c.id) && c.id != viewer.id
        })
        .filter_map(|candidate| {
            let mut card = Scorecard::default();

            if !following.is_empty() && candidate.followers > 100 {
                card.add(0.3, "Followed by developers you follow");
            }

            if candidate.followers > 500 {
                card.add(0.2, "Popular developer");
            }

            if candidate.public_repos > 20 {
                card.add(0.2, "Active developer");
            }

            card.into_recommendation(candidate.clone())
        })
        .collect();

    rank(recommendations)
}

/// Repositories the viewer hasn't starred yet, scored against the current time
pub fn recommend_repositories(
    viewer_starred: &[RepositorySummary],
    candidates: &[RepositorySummary],
) -> Vec<Recommendation<RepositorySummary>> {
    recommend_repositories_at(viewer_starred, candidates, Utc::now())
}

/// Same as [`recommend_repositories`] with an explicit "now"
pub fn recommend_repositories_at(
    viewer_starred: &[RepositorySummary],
    candidates: &[RepositorySummary],
    now: DateTime<Utc>,
) -> Vec<Recommendation<RepositorySummary>> {
    let starred_ids: HashSet<u64> = viewer_starred.iter().map(HasId::id).collect();

    let recommendations = candidates
        .iter()
        .filter(|repo| !starred_ids.contains(&repo.id))
        .filter_map(|repo| {
            let mut card = Scorecard::default();

            if repo.stargazers_count > 1000 {
                card.add(0.3, "Popular project");
            } else if repo.stargazers_count > 100 {
                card.add(0.2, "Quality project");
            }

            let days_since_update = (now - repo.updated_at).num_seconds() as f64 / 86_400.0;
            if days_since_update < 30.0 {
                card.add(0.2, "Recently active");
            }

            if let Some(language) = repo.language.as_deref().filter(|l| !l.is_empty()) {
                card.add(0.1, format!("{} project", language));
            }

            card.into_recommendation(repo.clone())
        })
        .collect();

    rank(recommendations)
}
