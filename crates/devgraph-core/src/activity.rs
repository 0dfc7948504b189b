use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Event;

/// Events in this trailing window count towards activity
const ACTIVITY_WINDOW_DAYS: i64 = 7;

/// Recent events needed for a full score
const EVENTS_FOR_FULL_SCORE: f64 = 10.0;

/// Coarse activity bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn from_score(score: f64) -> Self {
        if score > 0.6 {
            Level::High
        } else if score > 0.3 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Level::Low => "Low activity",
            Level::Medium => "Moderately active",
            Level::High => "Very active",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLevel {
    pub level: Level,
    /// Recent events / 10, capped at 1.0
    pub score: f64,
    pub description: String,
}

impl ActivityLevel {
    fn none() -> Self {
        Self {
            level: Level::Low,
            score: 0.0,
            description: "No recent activity".to_string(),
        }
    }
}

/// Activity over the last week, measured against the current time
pub fn compute_activity_level(events: &[Event]) -> ActivityLevel {
    compute_activity_level_at(events, Utc::now())
}

/// Same as [`compute_activity_level`] with an explicit "now"
pub fn compute_activity_level_at(events: &[Event], now: DateTime<Utc>) -> ActivityLevel {
    if events.is_empty() {
        return ActivityLevel::none();
    }

    let window_start = now - Duration::days(ACTIVITY_WINDOW_DAYS);
    let recent = events.iter().filter(|e| e.created_at > window_start).count();

    let score = (recent as f64 / EVENTS_FOR_FULL_SCORE).min(1.0);
    let level = Level::from_score(score);

    ActivityLevel {
        level,
        score,
        description: level.description().to_string(),
    }
}

/// "3 days ago" style rendering, relative to the current time
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    format_relative_time_at(timestamp, Utc::now())
}

/// Largest whole unit only. Months are 30 days and years 365 - close enough
/// for a profile card, not calendar-accurate. Future timestamps read "just now".
pub fn format_relative_time_at(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - timestamp;

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();
    let weeks = days / 7;
    let months = days / 30;
    let years = days / 365;

    let (amount, unit) = if years > 0 {
        (years, "year")
    } else if months > 0 {
        (months, "month")
    } else if weeks > 0 {
        (weeks, "week")
    } else if days > 0 {
        (days, "day")
    } else if hours > 0 {
        (hours, "hour")
    } else if minutes > 0 {
        (minutes, "minute")
    } else {
        return "just now".to_string();
    };

    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn events_ago(hours: &[i64]) -> Vec<Event> {
        hours
            .iter()
            .enumerate()
            .map(|(i, h)| Event {
                id: i.to_string(),
                kind: "PushEvent".to_string(),
                created_at: now() - Duration::hours(*h),
            })
            .collect()
    }

    #[test]
    fn test_no_events() {
        let activity = compute_activity_level_at(&[], now());
        assert_eq!(activity.level, Level::Low);
        assert_eq!(activity.score, 0.0);
        assert_eq!(activity.description, "No recent activity");
    }

    #[test]
    fn test_only_old_events() {
        let activity = compute_activity_level_at(&events_ago(&[24 * 8, 24 * 30]), now());
        assert_eq!(activity.level, Level::Low);
        assert_eq!(activity.score, 0.0);
        assert_eq!(activity.description, "Low activity");
    }

    #[test]
    fn test_levels() {
        let medium = compute_activity_level_at(&events_ago(&[1, 2, 3, 4]), now());
        assert_eq!(medium.level, Level::Medium);
        assert!((medium.score - 0.4).abs() < 1e-9);

        let high = compute_activity_level_at(&events_ago(&[1; 7]), now());
        assert_eq!(high.level, Level::High);

        let low = compute_activity_level_at(&events_ago(&[1, 2, 3]), now());
        assert_eq!(low.level, Level::Low);
    }

    #[test]
    fn test_score_capped() {
        let activity = compute_activity_level_at(&events_ago(&[1; 25]), now());
        assert_eq!(activity.score, 1.0);
        assert_eq!(activity.level, Level::High);
    }

    #[test]
    fn test_window_is_exclusive() {
        // Exactly seven days old falls outside the window
        let activity = compute_activity_level_at(&events_ago(&[24 * 7]), now());
        assert_eq!(activity.score, 0.0);
    }

    #[test]
    fn test_relative_time_units() {
        let n = now();
        assert_eq!(format_relative_time_at(n - Duration::seconds(30), n), "just now");
        assert_eq!(format_relative_time_at(n - Duration::minutes(1), n), "1 minute ago");
        assert_eq!(format_relative_time_at(n - Duration::minutes(59), n), "59 minutes ago");
        assert_eq!(format_relative_time_at(n - Duration::hours(5), n), "5 hours ago");
        assert_eq!(format_relative_time_at(n - Duration::days(3), n), "3 days ago");
        assert_eq!(format_relative_time_at(n - Duration::days(14), n), "2 weeks ago");
        assert_eq!(format_relative_time_at(n - Duration::days(45), n), "1 month ago");
        assert_eq!(format_relative_time_at(n - Duration::days(364), n), "12 months ago");
        assert_eq!(format_relative_time_at(n - Duration::days(800), n), "2 years ago");
    }

    #[test]
    fn test_relative_time_future_is_just_now() {
        let n = now();
        assert_eq!(format_relative_time_at(n + Duration::days(3), n), "just now");
    }
}
