/// Read-only projections of the rating store for the ratings report.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::constants::BASELINE_RATING;
use crate::types::{DimensionAverages, Item, Provenance, Source};

/// Aggregates for one source category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategorySummary {
    pub count: usize,
    /// Mean rating rounded to one decimal, or the baseline for an empty category.
    pub avg_rating: f64,
    pub wins: u32,
}

/// Serializes flat, one `{source}_count`, `{source}_avg_elo` and
/// `{source}_wins` key per category plus `draws`.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub categories: BTreeMap<Source, CategorySummary>,
    /// Drawn matches, each counted once.
    pub draws: u32,
}

/// Short entry for the per-category top lists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopEntry {
    pub id: String,
    pub lines: Vec<String>,
    pub author: Option<String>,
    pub collection: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "elo"))]
    pub rating: f64,
    pub matches: u32,
    pub wins: u32,
}

/// Full leaderboard row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaderboardEntry {
    pub id: String,
    pub lines: Vec<String>,
    pub source: Source,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub provenance: Provenance,
    #[cfg_attr(feature = "serde", serde(rename = "elo"))]
    pub rating: f64,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub dim_averages: DimensionAverages,
    pub last_reasoning: Option<String>,
}

/// Serializes the per-category top lists as `top_{source}` keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// Completed matches, each counted once.
    pub total_matches: u32,
    pub summary: Summary,
    pub top: BTreeMap<Source, Vec<TopEntry>>,
    /// Every item, highest rating first.
    pub poems: Vec<LeaderboardEntry>,
}

#[cfg(feature = "serde")]
impl serde::Serialize for Summary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.categories.len() * 3 + 1))?;
        for (source, c) in &self.categories {
            map.serialize_entry(&format!("{source}_count"), &c.count)?;
        }
        for (source, c) in &self.categories {
            map.serialize_entry(&format!("{source}_avg_elo"), &c.avg_rating)?;
        }
        for (source, c) in &self.categories {
            map.serialize_entry(&format!("{source}_wins"), &c.wins)?;
        }
        map.serialize_entry("draws", &self.draws)?;
        map.end()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Report {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.top.len() + 4))?;
        map.serialize_entry("generated_at", &self.generated_at)?;
        map.serialize_entry("total_matches", &self.total_matches)?;
        map.serialize_entry("summary", &self.summary)?;
        for (source, entries) in &self.top {
            map.serialize_entry(&format!("top_{source}"), entries)?;
        }
        map.serialize_entry("poems", &self.poems)?;
        map.end()
    }
}

/// Items sorted by rating, highest first. Ties keep corpus order.
pub fn by_rating_desc<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<&'a Item> {
    let mut sorted: Vec<&Item> = items.into_iter().collect();
    sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    sorted
}

pub fn average_rating<'a>(items: impl IntoIterator<Item = &'a Item>) -> f64 {
    let (sum, count) = items
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), item| (sum + item.rating, count + 1));
    if count == 0 {
        BASELINE_RATING
    } else {
        (sum / count as f64 * 10.0).round_ties_even() / 10.0
    }
}

/// Build the ratings report.
///
/// Draws are recorded on both participants of a drawn match, so the summed
/// draw counter is halved; the same holds for `total_matches`.
pub fn summarize(items: &[Item], top_k: usize, generated_at: DateTime<Utc>) -> Report {
    let mut categories = BTreeMap::new();
    let mut top = BTreeMap::new();

    for source in Source::ALL {
        let group: Vec<&Item> = items.iter().filter(|i| i.source == source).collect();
        categories.insert(
            source,
            CategorySummary {
                count: group.len(),
                avg_rating: average_rating(group.iter().copied()),
                wins: group.iter().map(|i| i.wins).sum(),
            },
        );
        top.insert(
            source,
            by_rating_desc(group)
                .into_iter()
                .take(top_k)
                .map(top_entry)
                .collect(),
        );
    }

    let total_matches = items.iter().map(|i| i.matches).sum::<u32>() / 2;
    let draws = items.iter().map(|i| i.draws).sum::<u32>() / 2;

    Report {
        generated_at,
        total_matches,
        summary: Summary { categories, draws },
        top,
        poems: by_rating_desc(items).into_iter().map(leaderboard_entry).collect(),
    }
}

fn top_entry(item: &Item) -> TopEntry {
    TopEntry {
        id: item.id.clone(),
        lines: item.lines.clone(),
        author: item.provenance.author.clone(),
        collection: item.provenance.collection.clone(),
        rating: item.rating,
        matches: item.matches,
        wins: item.wins,
    }
}

fn leaderboard_entry(item: &Item) -> LeaderboardEntry {
    LeaderboardEntry {
        id: item.id.clone(),
        lines: item.lines.clone(),
        source: item.source,
        provenance: item.provenance.clone(),
        rating: item.rating,
        matches: item.matches,
        wins: item.wins,
        losses: item.losses,
        draws: item.draws,
        dim_averages: item.dim_averages,
        last_reasoning: item.last_reasoning.clone(),
    }
}
