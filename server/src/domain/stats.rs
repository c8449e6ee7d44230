//! Collection Statistics

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::filament::Filament;

/// Totals over the active collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_spools: usize,
    /// Brands counted case-insensitively
    pub distinct_brands: usize,
    /// Grams
    pub total_weight: f64,
}

impl InventoryStats {
    /// Archived spools are skipped
    pub fn from_filaments<'a>(filaments: impl IntoIterator<Item = &'a Filament>) -> Self {
        let mut brands = HashSet::new();
        let mut stats = InventoryStats::default();

        for filament in filaments.into_iter().filter(|f| f.is_active()) {
            stats.total_spools += 1;
            stats.total_weight += filament.weight_remaining;
            brands.insert(filament.brand.to_lowercase());
        }
        stats.distinct_brands = brands.len();
        stats
    }
}

/// Totals over the used (archived) collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsedStats {
    pub total_used: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl UsedStats {
    /// Active spools are skipped
    pub fn from_filaments<'a>(filaments: impl IntoIterator<Item = &'a Filament>) -> Self {
        let mut stats = UsedStats::default();
        for filament in filaments.into_iter().filter(|f| f.is_archived) {
            stats.total_used += 1;
            *stats.by_type.entry(filament.filament_type.clone()).or_default() += 1;
        }
        stats
    }
}
