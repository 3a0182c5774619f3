// Leaderboard time window value object

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeFilter {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Day => "24h",
            TimeFilter::Week => "7d",
            TimeFilter::Month => "30d",
            TimeFilter::All => "all",
        }
    }

    /// Earliest timestamp included in the window, `None` for all time.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeFilter::Day => Some(now - Duration::hours(24)),
            TimeFilter::Week => Some(now - Duration::days(7)),
            TimeFilter::Month => Some(now - Duration::days(30)),
            TimeFilter::All => None,
        }
    }
}

impl From<&str> for TimeFilter {
    fn from(s: &str) -> Self {
        match s.trim() {
            "24h" => TimeFilter::Day,
            "7d" => TimeFilter::Week,
            "30d" => TimeFilter::Month,
            _ => TimeFilter::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_filters_fall_back_to_all_time() {
        assert_eq!(TimeFilter::from("90d"), TimeFilter::All);
        assert_eq!(TimeFilter::from(""), TimeFilter::All);
        assert_eq!(TimeFilter::from("7d"), TimeFilter::Week);
    }

    #[test]
    fn cutoff_is_relative_to_now() {
        let now = Utc::now();
        assert_eq!(TimeFilter::Day.cutoff(now), Some(now - Duration::hours(24)));
        assert_eq!(TimeFilter::Month.cutoff(now), Some(now - Duration::days(30)));
        assert_eq!(TimeFilter::All.cutoff(now), None);
    }
}
