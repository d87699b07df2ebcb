//! Metrics snapshot model and display formatting.
//!
//! The site fetches one JSON document per page load and writes formatted
//! values into named placeholder elements. Every field is optional: a
//! missing section simply produces no update for its placeholders, and the
//! display keeps whatever it already showed.

use serde::Deserialize;

/// Relative path the metrics JSON is fetched from.
pub const METRICS_PATH: &str = "/data/metrics.json";

/// The metrics document published alongside the site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub github: Option<GithubMetrics>,
    #[serde(default)]
    pub community: Option<CommunityMetrics>,
    #[serde(default)]
    pub adoption: Option<AdoptionMetrics>,
    #[serde(default)]
    pub quality: Option<QualityMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubMetrics {
    #[serde(default)]
    pub stars: Option<i64>,
    #[serde(default)]
    pub forks: Option<i64>,
    /// Contributors active in the last 30 days.
    #[serde(default)]
    pub contributors_30d: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityMetrics {
    #[serde(default)]
    pub discord_members: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdoptionMetrics {
    #[serde(default)]
    pub templates_shipped: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityMetrics {
    #[serde(default)]
    pub developer_nps: Option<i64>,
}

/// One formatted value destined for a placeholder element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricUpdate {
    /// Id of the placeholder element to fill.
    pub placeholder: &'static str,
    /// Formatted display value.
    pub value: String,
}

impl MetricsSnapshot {
    /// Updates for every field present in the snapshot, keyed by placeholder
    /// element id. Absent sections and fields contribute nothing.
    pub fn updates(&self) -> Vec<MetricUpdate> {
        let mut updates = Vec::new();
        let mut push = |placeholder: &'static str, value: Option<i64>| {
            if let Some(value) = value {
                updates.push(MetricUpdate {
                    placeholder,
                    value: format_count(value),
                });
            }
        };

        if let Some(github) = &self.github {
            push("github-stars", github.stars);
            push("github-forks", github.forks);
            push("contributors", github.contributors_30d);
        }
        if let Some(community) = &self.community {
            push("discord-members", community.discord_members);
        }
        if let Some(adoption) = &self.adoption {
            push("templates-shipped", adoption.templates_shipped);
        }
        if let Some(quality) = &self.quality {
            push("developer-nps", quality.developer_nps);
        }

        updates
    }
}

/// Abbreviate counts of 1000 or more to one decimal place with a "K"
/// suffix; smaller values render as plain integers.
pub fn format_count(n: i64) -> String {
    if n >= 1000 {
        format!("{:.1}K", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}
