//! Filament Filtering
//!
//! Read-only predicates over the active collection: free-text search plus a
//! structured multi-field filter. Archived spools never pass.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filament::{Filament, SpoolType};

/// Case-insensitive substring match against brand, type, color and notes
///
/// An empty or blank query matches everything.
pub fn matches_query(filament: &Filament, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    [
        Some(filament.brand.as_str()),
        Some(filament.filament_type.as_str()),
        Some(filament.color.as_str()),
        filament.notes.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Structured filter; every set restriction must hold
///
/// Empty lists mean "no restriction". Ranges are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilamentFilter {
    pub query: Option<String>,
    pub brands: Vec<String>,
    pub types: Vec<String>,
    pub colors: Vec<String>,
    pub spool_types: Vec<SpoolType>,
    pub purchased_from: Option<NaiveDate>,
    pub purchased_to: Option<NaiveDate>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
}

impl FilamentFilter {
    pub fn matches(&self, filament: &Filament) -> bool {
        if filament.is_archived {
            return false;
        }
        if let Some(query) = &self.query {
            if !matches_query(filament, query) {
                return false;
            }
        }

        in_set(&self.brands, &filament.brand)
            && in_set(&self.types, &filament.filament_type)
            && in_set(&self.colors, &filament.color)
            && (self.spool_types.is_empty() || self.spool_types.contains(&filament.spool_type))
            && self.date_in_range(filament.purchase_date)
            && self.weight_in_range(filament.weight_remaining)
    }

    /// Narrow a collection, keeping its order
    pub fn apply(&self, filaments: Vec<Filament>) -> Vec<Filament> {
        filaments.into_iter().filter(|f| self.matches(f)).collect()
    }

    fn date_in_range(&self, date: Option<NaiveDate>) -> bool {
        if self.purchased_from.is_none() && self.purchased_to.is_none() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.purchased_from.map_or(true, |from| date >= from)
            && self.purchased_to.map_or(true, |to| date <= to)
    }

    fn weight_in_range(&self, weight: f64) -> bool {
        self.min_weight.map_or(true, |min| weight >= min)
            && self.max_weight.map_or(true, |max| weight <= max)
    }
}

fn in_set(selected: &[String], value: &str) -> bool {
    selected.is_empty() || selected.iter().any(|s| s == value)
}
