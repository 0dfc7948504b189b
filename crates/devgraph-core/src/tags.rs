// Technology, domain and social tags derived from raw profile data
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{LanguageHistogram, Profile, RepositorySummary};

/// Each category yields at most this many tags
pub const MAX_TAGS_PER_CATEGORY: usize = 3;

/// Curated language -> short tag table. Anything not listed keeps its own name.
const LANGUAGE_TAGS: &[(&str, &str)] = &[
    ("JavaScript", "JS"),
    ("TypeScript", "TS"),
    ("Python", "Python"),
    ("Java", "Java"),
    ("Go", "Go"),
    ("Rust", "Rust"),
    ("C++", "C++"),
    ("C#", "C#"),
    ("PHP", "PHP"),
    ("Ruby", "Ruby"),
    ("Swift", "Swift"),
    ("Kotlin", "Kotlin"),
    ("React", "React"),
    ("Vue", "Vue"),
    ("Angular", "Angular"),
    ("Node.js", "Node.js"),
];

/// Domain keyword table. Order matters: qualifying domains are reported in
/// table order, not by match strength.
///
/// Matching is plain substring containment over the whole corpus, so short
/// keywords like "ai" or "ui" will also hit inside unrelated words
/// ("maintainer", "build"). Known and accepted.
const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "frontend",
        &["react", "vue", "angular", "frontend", "web", "css", "html", "ui", "ux"],
    ),
    (
        "backend",
        &["backend", "server", "api", "nodejs", "django", "flask", "spring", "fastapi"],
    ),
    (
        "mobile",
        &["react-native", "flutter", "swift", "kotlin", "android", "ios", "mobile"],
    ),
    (
        "data-science",
        &[
            "machine-learning",
            "deep-learning",
            "tensorflow",
            "pytorch",
            "pandas",
            "numpy",
            "data-science",
            "ai",
        ],
    ),
    (
        "cloud",
        &["aws", "azure", "gcp", "kubernetes", "docker", "cloud", "devops"],
    ),
    (
        "blockchain",
        &["blockchain", "crypto", "web3", "ethereum", "solidity"],
    ),
    ("game-dev", &["game", "unity", "unreal", "godot", "game-engine"]),
    ("open-source", &["open-source", "contributor", "maintainer"]),
];

/// Which family a tag belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TagCategory {
    Technology,
    Domain,
    Social,
}

impl TagCategory {
    pub fn label(&self) -> &'static str {
        match self {
            TagCategory::Technology => "Technology",
            TagCategory::Domain => "Domain",
            TagCategory::Social => "Social",
        }
    }
}

/// All three tag families for one developer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagSet {
    pub technology: Vec<String>,
    pub domain: Vec<String>,
    pub social: Vec<String>,
}

impl TagSet {
    pub fn get(&self, category: TagCategory) -> &[String] {
        match category {
            TagCategory::Technology => &self.technology,
            TagCategory::Domain => &self.domain,
            TagCategory::Social => &self.social,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.technology.is_empty() && self.domain.is_empty() && self.social.is_empty()
    }
}

/// Short tag for a language name
pub fn language_tag(language: &str) -> &str {
    LANGUAGE_TAGS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, tag)| *tag)
        .unwrap_or(language)
}

/// Top languages by share of bytes, mapped to short tags
///
/// Equal shares keep histogram order. An empty histogram, or one where every
/// language has zero bytes, yields no tags.
pub fn derive_technology_tags(histogram: &LanguageHistogram) -> Vec<String> {
    let total = histogram.total_bytes();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<(&str, f64)> = histogram
        .entries()
        .iter()
        .map(|(lang, bytes)| (lang.as_str(), (*bytes as f64 / total as f64) * 100.0))
        .collect();

    // sort_by is stable, so ties stay in input order
    shares.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut tags: Vec<String> = Vec::with_capacity(MAX_TAGS_PER_CATEGORY);
    for (lang, _) in shares.into_iter().take(MAX_TAGS_PER_CATEGORY) {
        let tag = language_tag(lang);
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    tags
}

/// Domains whose keywords show up anywhere in repo names/descriptions
pub fn derive_domain_tags(repositories: &[RepositorySummary]) -> Vec<String> {
    let corpus = repositories
        .iter()
        .map(|r| {
            format!("{} {}", r.name, r.description.as_deref().unwrap_or("")).to_lowercase()
        })
        .collect::<Vec<_>>()
        .join(" ");

    DOMAIN_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| corpus.contains(k)))
        .map(|(domain, _)| domain.to_string())
        .take(MAX_TAGS_PER_CATEGORY)
        .collect()
}

/// Threshold ladder over profile counters
///
/// Rules run in a fixed order and the first three hits win. A profile that
/// qualifies for more than three tags loses the later ones - that truncation
/// is part of the contract.
pub fn derive_social_tags(profile: &Profile) -> Vec<String> {
    let mut tags = Vec::new();

    if profile.followers > 1000 {
        tags.push("high-profile");
    } else if profile.followers > 100 {
        tags.push("active");
    }

    if profile.public_repos > 50 {
        tags.push("prolific");
    }

    if profile.public_repos > 10 && profile.followers > 50 {
        tags.push("open-source-contributor");
    }

    if profile
        .company
        .as_deref()
        .is_some_and(|c| !c.is_empty())
    {
        tags.push("employed-developer");
    }

    tags.into_iter()
        .take(MAX_TAGS_PER_CATEGORY)
        .map(String::from)
        .collect()
}

/// Every tag family at once
pub fn derive_tag_set(
    histogram: &LanguageHistogram,
    repositories: &[RepositorySummary],
    profile: &Profile,
) -> TagSet {
    TagSet {
        technology: derive_technology_tags(histogram),
        domain: derive_domain_tags(repositories),
        social: derive_social_tags(profile),
    }
}
