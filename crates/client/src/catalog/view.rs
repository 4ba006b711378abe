//! Derived views of the asset collection.
//!
//! Everything here is a pure, synchronous function of (collection, criteria):
//! the filtered/sorted view and the dashboard statistics are recomputed on
//! demand, never cached, never persisted. Statistics always derive from the
//! FULL raw collection, not the filtered view.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use kv_library_core::{Asset, CampaignType, Category};

/// Filter criteria for the catalog view, each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Free-text query matched against name or id (case-insensitive
    /// substring). Empty or absent matches everything.
    pub query: Option<String>,
    /// Campaign type filter.
    pub campaign: Option<CampaignType>,
    /// Product category filter.
    pub category: Option<Category>,
    /// Source label filter (case-insensitive exact match).
    pub source: Option<String>,
}

impl CatalogFilter {
    /// Whether an asset satisfies every active predicate (conjunction).
    #[must_use]
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(query) = self.query.as_deref() {
            let query = query.to_lowercase();
            if !query.is_empty() {
                let in_name = asset.name.to_lowercase().contains(&query);
                let in_id = asset.id.as_str().to_lowercase().contains(&query);
                if !in_name && !in_id {
                    return false;
                }
            }
        }

        if let Some(campaign) = self.campaign {
            if asset.campaign_type != campaign {
                return false;
            }
        }

        if let Some(category) = self.category {
            if asset.category != category {
                return false;
            }
        }

        if let Some(source) = self.source.as_deref() {
            if !asset.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }

        true
    }
}

/// Filter the collection, then sort newest-first by `created_at`.
///
/// The sort is stable: assets with equal or missing timestamps keep their
/// relative order from the raw collection. Missing timestamps sort as epoch
/// zero, i.e. oldest.
#[must_use]
pub fn filtered_view(assets: &[Asset], filter: &CatalogFilter) -> Vec<Asset> {
    let mut view: Vec<Asset> = assets
        .iter()
        .filter(|asset| filter.matches(asset))
        .cloned()
        .collect();
    view.sort_by_key(|asset| Reverse(asset.sort_timestamp()));
    view
}

/// Dashboard statistics derived from the full raw collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Collection size.
    pub total: usize,
    /// Digital share of the collection, rounded to the nearest percent.
    pub digital_pct: u32,
    /// Traditional share of the collection, rounded to the nearest percent.
    pub traditional_pct: u32,
    /// Assets in the Mobile category.
    pub mobile_count: usize,
    /// Assets in the Household category.
    pub household_count: usize,
    /// Per-source counts for every observed label.
    pub source_counts: BTreeMap<String, usize>,
    /// Largest per-source count, floored at 1. Chart normalization
    /// denominator only, never displayed.
    pub max_source_count: usize,
}

impl CatalogStats {
    /// Compute statistics over the raw collection.
    #[must_use]
    pub fn compute(assets: &[Asset]) -> Self {
        let total = assets.len();

        let digital = assets
            .iter()
            .filter(|a| a.campaign_type == CampaignType::Digital)
            .count();
        let traditional = total - digital;

        let mobile_count = assets
            .iter()
            .filter(|a| a.category == Category::Mobile)
            .count();
        let household_count = total - mobile_count;

        let mut source_counts: BTreeMap<String, usize> = BTreeMap::new();
        for asset in assets {
            *source_counts.entry(asset.source.clone()).or_insert(0) += 1;
        }
        let max_source_count = source_counts.values().copied().max().unwrap_or(0).max(1);

        Self {
            total,
            digital_pct: percentage(digital, total),
            traditional_pct: percentage(traditional, total),
            mobile_count,
            household_count,
            source_counts,
            max_source_count,
        }
    }

    /// Count for a source label, 0 when unseen.
    #[must_use]
    pub fn source_count(&self, label: &str) -> usize {
        self.source_counts.get(label).copied().unwrap_or(0)
    }
}

/// Round-to-nearest integer percentage, 0 for an empty denominator.
fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)] // Collection sizes stay far below f64 precision
    let pct = (part as f64 / total as f64) * 100.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Bounded to [0,100]
    {
        pct.round() as u32
    }
}
