// Links used by "copy link" / "open" actions. Plain interpolation, no validation.
use crate::models::RepositorySummary;

const GITHUB_WEB_BASE: &str = "https://github.com";

pub fn developer_url(login: &str) -> String {
    format!("{}/{}", GITHUB_WEB_BASE, login)
}

pub fn repository_url(repo: &RepositorySummary) -> &str {
    &repo.html_url
}
