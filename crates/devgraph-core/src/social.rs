// Overlap between developers' following sets
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{HasId, Profile};

/// How many developers two people both follow
///
/// `Unknown` means the other side's following list was never fetched. It is
/// not the same as zero and must not be shown as a number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommonFollowing {
    Known(usize),
    Unknown,
}

impl CommonFollowing {
    pub fn count(&self) -> Option<usize> {
        match self {
            CommonFollowing::Known(n) => Some(*n),
            CommonFollowing::Unknown => None,
        }
    }
}

impl std::fmt::Display for CommonFollowing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommonFollowing::Known(n) => f.pad(&n.to_string()),
            CommonFollowing::Unknown => f.pad("n/a"),
        }
    }
}

/// Size of the id intersection of two lists
///
/// A missing list on either side counts as "nothing in common". Symmetric in
/// its arguments and linear in the combined length.
pub fn compute_common_following_count<A, B>(a: Option<&[A]>, b: Option<&[B]>) -> usize
where
    A: HasId,
    B: HasId,
{
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };

    let a_ids: HashSet<u64> = a.iter().map(HasId::id).collect();
    let b_ids: HashSet<u64> = b.iter().map(HasId::id).collect();

    a_ids.iter().filter(|id| b_ids.contains(id)).count()
}

/// Entities of `a` that also appear in `b`, in `a`'s order
///
/// Used for "common following" and "common starred" views.
pub fn common_entities<T, U>(a: &[T], b: &[U]) -> Vec<T>
where
    T: HasId + Clone,
    U: HasId,
{
    let b_ids: HashSet<u64> = b.iter().map(HasId::id).collect();
    a.iter().filter(|e| b_ids.contains(&e.id())).cloned().collect()
}

/// Dice coefficient over two following sets, clamped to [0, 1]
pub fn compute_similarity(common: usize, following_a: u32, following_b: u32) -> f64 {
    if following_a == 0 || following_b == 0 {
        return 0.0;
    }

    let similarity = (common as f64 * 2.0) / (following_a as f64 + following_b as f64);
    similarity.min(1.0)
}

/// Pair each user with how many of the viewer's followings they share
///
/// `following_of` returns a user's own following list when it has been
/// fetched; users without one get `CommonFollowing::Unknown`.
pub fn annotate_common_following<'a, F>(
    users: &[Profile],
    viewer_following: &[Profile],
    following_of: F,
) -> Vec<(Profile, CommonFollowing)>
where
    F: Fn(&Profile) -> Option<&'a [Profile]>,
{
    users
        .iter()
        .map(|user| {
            let common = match following_of(user) {
                Some(theirs) => CommonFollowing::Known(compute_common_following_count(
                    Some(viewer_following),
                    Some(theirs),
                )),
                None => CommonFollowing::Unknown,
            };
            (user.clone(), common)
        })
        .collect()
}

/// How to order a follower/following list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationSort {
    #[default]
    Followers,
    CommonFollowing,
}

impl std::str::FromStr for RelationSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "followers" => Ok(RelationSort::Followers),
            "common" | "common-following" => Ok(RelationSort::CommonFollowing),
            other => Err(format!("unknown sort '{}', expected followers or common", other)),
        }
    }
}

/// Stable sort, descending. Unknown common counts go after every known one.
pub fn sort_relations(users: &mut [(Profile, CommonFollowing)], sort: RelationSort) {
    match sort {
        RelationSort::Followers => users.sort_by(|a, b| b.0.followers.cmp(&a.0.followers)),
        RelationSort::CommonFollowing => users.sort_by(|a, b| match (a.1, b.1) {
            (CommonFollowing::Known(x), CommonFollowing::Known(y)) => y.cmp(&x),
            (CommonFollowing::Known(_), CommonFollowing::Unknown) => Ordering::Less,
            (CommonFollowing::Unknown, CommonFollowing::Known(_)) => Ordering::Greater,
            (CommonFollowing::Unknown, CommonFollowing::Unknown) => Ordering::Equal,
        }),
    }
}
