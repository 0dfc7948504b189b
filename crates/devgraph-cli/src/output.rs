// Plain-text rendering for the terminal
use devgraph_core::{
    explore::{Comparison, DeveloperOverview, RankedDeveloper},
    links::developer_url,
    CommonFollowing, Profile, Recommendation, RepositorySummary, SavedDeveloper, SavedRepo,
    TagCategory,
};

pub fn print_overview(overview: &DeveloperOverview, saved: bool) {
    let profile = &overview.profile;

    println!(
        "{} (@{}){}",
        profile.display_name(),
        profile.login,
        if saved { "  [saved]" } else { "" }
    );
    println!("{}", developer_url(&profile.login));
    if let Some(bio) = &profile.bio {
        println!("{}", bio);
    }
    println!(
        "{} followers · {} following · {} public repos",
        profile.followers, profile.following, profile.public_repos
    );
    if let Some(joined) = &overview.joined {
        println!("Joined {}", joined);
    }
    println!(
        "Activity: {} ({:.0}%)",
        overview.activity.description,
        overview.activity.score * 100.0
    );

    for category in [TagCategory::Technology, TagCategory::Domain, TagCategory::Social] {
        let tags = overview.tags.get(category);
        if !tags.is_empty() {
            println!("{}: {}", category.label(), tags.join(", "));
        }
    }

    if !overview.top_repos.is_empty() {
        println!();
        println!("Top repositories:");
        for repo in &overview.top_repos {
            print_repo_line(repo);
        }
    }
}

pub fn print_relations(list: &[(Profile, CommonFollowing)]) {
    if list.is_empty() {
        println!("Nobody here yet");
        return;
    }

    for (profile, common) in list {
        println!(
            "{:<24} {:>7} followers  {:>4} in common",
            profile.login, profile.followers, common
        );
    }
}

pub fn print_recommendations(
    developers: &[RankedDeveloper],
    repos: &[Recommendation<RepositorySummary>],
) {
    println!("Developers:");
    if developers.is_empty() {
        println!("  nothing to suggest");
    }
    for ranked in developers {
        let rec = &ranked.recommendation;
        println!(
            "  {:<24} score {:.1}  top {}%  {}",
            rec.entity.login,
            rec.score,
            ranked.follower_percentile,
            rec.reason
        );
    }

    println!();
    println!("Repositories:");
    if repos.is_empty() {
        println!("  nothing to suggest");
    }
    for rec in repos {
        println!("  {:<40} score {:.1}  {}", rec.entity.full_name, rec.score, rec.reason);
    }
}

pub fn print_comparison(cmp: &Comparison) {
    println!(
        "{} vs {}: {:.0}% similar",
        cmp.a.login,
        cmp.b.login,
        cmp.similarity * 100.0
    );

    println!();
    println!("Both follow ({}):", cmp.common_following.len());
    for profile in &cmp.common_following {
        println!("  {}", profile.login);
    }

    println!();
    println!("Both starred ({}):", cmp.common_starred.len());
    for repo in &cmp.common_starred {
        print_repo_line(repo);
    }
}

pub fn print_users(users: &[Profile]) {
    if users.is_empty() {
        println!("No developers found");
    }
    for user in users {
        println!("{:<24} {}", user.login, developer_url(&user.login));
    }
}

pub fn print_saved(developers: &[SavedDeveloper], repos: &[SavedRepo]) {
    println!("Saved developers ({}):", developers.len());
    for dev in developers {
        println!("  {:>10}  {:<24} {}", dev.id, dev.login, dev.url());
    }

    println!();
    println!("Saved repositories ({}):", repos.len());
    for repo in repos {
        println!("  {:>10}  {:<40} {}", repo.id, repo.full_name, repo.url);
    }
}

fn print_repo_line(repo: &RepositorySummary) {
    println!(
        "  {:<40} ★ {:<7} {}",
        repo.full_name,
        repo.stargazers_count,
        repo.language.as_deref().unwrap_or("-")
    );
}
