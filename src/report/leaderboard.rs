use uuid::Uuid;

use super::metrics::{MetricKey, Totals};

/// One rep's aggregate plus display identity, ready for ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub name: String,
    pub totals: Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Metric(MetricKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Anything that isn't "asc" ranks most-activity-first.
    pub fn parse(value: &str) -> Self {
        match value {
            "asc" => Direction::Asc,
            _ => Direction::Desc,
        }
    }
}

/// Sorts rows by the selected key. The sort is stable, so rows with equal
/// keys keep their input order; rank is the 1-based position afterward and
/// equal values get consecutive ranks, not shared ones.
pub fn rank_leaderboard(
    mut rows: Vec<LeaderboardRow>,
    sort: SortKey,
    direction: Direction,
) -> Vec<LeaderboardRow> {
    rows.sort_by(|a, b| {
        let ordering = match sort {
            SortKey::Name => fold_name(&a.name).cmp(fold_name(&b.name)),
            SortKey::Metric(metric) => metric.of(&a.totals).cmp(&metric.of(&b.totals)),
        };
        match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    });
    rows
}

/// Case-folded comparison key, standing in for locale collation.
fn fold_name(name: &str) -> impl Iterator<Item = char> + '_ {
    name.chars().flat_map(char::to_lowercase)
}
