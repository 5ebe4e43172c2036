//! Formatting, filtering and ordering of results for display and export.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::outcome::LeafResult;

/// `0.7312` → `73.12%`; absent → `—`.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) if score.is_finite() => format!("{:.2}%", score_percent(score)),
        _ => "—".to_string(),
    }
}

/// `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

fn score_percent(score: f64) -> f64 {
    score * 100.0
}

/// Attention level of a score, for highlighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Elevated,
    High,
}

impl RiskLevel {
    pub fn of(score: f64) -> Self {
        if score > 0.85 {
            RiskLevel::High
        } else if score > 0.70 {
            RiskLevel::Elevated
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Walk order.
    #[default]
    Walk,
    Name,
    Score,
    Size,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Which results to show and in what order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultView {
    pub sort: SortKey,
    pub order: SortOrder,
    /// Case-insensitive substring of the display name.
    pub name_filter: Option<String>,
    /// Minimum score in percent. Unscored results never pass.
    pub min_score_pct: Option<f64>,
}

impl ResultView {
    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = key;
        self.order = order;
        self
    }

    pub fn name_filter(mut self, query: impl Into<String>) -> Self {
        let query = query.into().trim().to_lowercase();
        self.name_filter = (!query.is_empty()).then_some(query);
        self
    }

    pub fn min_score_pct(mut self, pct: f64) -> Self {
        self.min_score_pct = Some(pct);
        self
    }

    pub fn matches(&self, leaf: &LeafResult) -> bool {
        let name_ok = self
            .name_filter
            .as_deref()
            .is_none_or(|q| leaf.display_name.to_lowercase().contains(q));
        let score_ok = match self.min_score_pct {
            None => true,
            Some(min) => leaf.score.is_some_and(|s| score_percent(s) >= min),
        };
        name_ok && score_ok
    }

    /// Filter and order `leaves`. Ties keep walk order.
    pub fn apply<'a>(&self, leaves: &'a [LeafResult]) -> Vec<&'a LeafResult> {
        let mut rows: Vec<&LeafResult> = leaves.iter().filter(|leaf| self.matches(leaf)).collect();
        let cmp = |a: &&LeafResult, b: &&LeafResult| -> Ordering {
            match self.sort {
                SortKey::Walk => Ordering::Equal,
                SortKey::Name => a
                    .display_name
                    .to_lowercase()
                    .cmp(&b.display_name.to_lowercase()),
                SortKey::Score => {
                    let a = a.score.unwrap_or(f64::NEG_INFINITY);
                    let b = b.score.unwrap_or(f64::NEG_INFINITY);
                    a.total_cmp(&b)
                }
                SortKey::Size => a.size_bytes.cmp(&b.size_bytes),
            }
        };
        match self.order {
            SortOrder::Asc => rows.sort_by(cmp),
            SortOrder::Desc => rows.sort_by(|a, b| cmp(b, a)),
        }
        rows
    }
}
