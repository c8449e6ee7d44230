//! Filament Entity
//!
//! A single spool of filament and the input shape used to create or edit one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

/// Weight assigned to a new spool when none is given (grams)
pub const DEFAULT_WEIGHT: f64 = 1000.0;

/// How the filament was bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoolType {
    /// Filament only, mounted on a reusable spool
    Refill,
    /// Filament wound on its own spool
    WithSpool,
}

impl SpoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpoolType::Refill => "refill",
            SpoolType::WithSpool => "with_spool",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "refill" => Some(SpoolType::Refill),
            "with_spool" => Some(SpoolType::WithSpool),
            _ => None,
        }
    }
}

/// A filament spool record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    /// Unique identifier, assigned by the store
    pub id: i64,
    pub brand: String,
    /// Material, e.g. "PLA"
    #[serde(rename = "type")]
    pub filament_type: String,
    pub color: String,
    pub spool_type: SpoolType,
    /// Grams left on the spool, never negative
    pub weight_remaining: f64,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Set once the spool is used up; never cleared
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Filament {
    /// Whether the spool still belongs to the active collection
    pub fn is_active(&self) -> bool {
        !self.is_archived
    }
}

impl Entity for Filament {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Request body for creating or replacing a filament
///
/// Every field is optional at the wire level so that a missing field is
/// reported as invalid input rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilamentInput {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, rename = "type")]
    pub filament_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub spool_type: Option<SpoolType>,
    #[serde(default)]
    pub weight_remaining: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated filament fields, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct FilamentDraft {
    pub brand: String,
    pub filament_type: String,
    pub color: String,
    pub spool_type: SpoolType,
    pub weight_remaining: f64,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl FilamentInput {
    /// Check required fields and the weight bound
    pub fn into_draft(self) -> DomainResult<FilamentDraft> {
        let brand = required(self.brand);
        let filament_type = required(self.filament_type);
        let color = required(self.color);

        let (Some(brand), Some(filament_type), Some(color), Some(spool_type)) =
            (brand, filament_type, color, self.spool_type)
        else {
            return Err(DomainError::InvalidInput(
                "Brand, type, color, and spool_type are required".to_string(),
            ));
        };

        let weight_remaining = self.weight_remaining.unwrap_or(DEFAULT_WEIGHT);
        if !weight_remaining.is_finite() || weight_remaining < 0.0 {
            return Err(DomainError::InvalidInput(
                "weight_remaining must be a non-negative number".to_string(),
            ));
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(FilamentDraft {
            brand,
            filament_type,
            color,
            spool_type,
            weight_remaining,
            purchase_date: self.purchase_date,
            notes,
        })
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> FilamentInput {
        FilamentInput {
            brand: Some("Prusament".to_string()),
            filament_type: Some("PETG".to_string()),
            color: Some("Galaxy Black".to_string()),
            spool_type: Some(SpoolType::WithSpool),
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_defaults_weight() {
        let draft = input().into_draft().unwrap();
        assert_eq!(draft.weight_remaining, DEFAULT_WEIGHT);
        assert_eq!(draft.spool_type, SpoolType::WithSpool);
        assert!(draft.notes.is_none());
    }

    #[test]
    fn test_draft_requires_fields() {
        let mut missing_color = input();
        missing_color.color = Some("   ".to_string());
        assert!(matches!(missing_color.into_draft(), Err(DomainError::InvalidInput(_))));

        let mut missing_spool = input();
        missing_spool.spool_type = None;
        assert!(matches!(missing_spool.into_draft(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_draft_rejects_negative_weight() {
        let mut negative = input();
        negative.weight_remaining = Some(-1.0);
        assert!(matches!(negative.into_draft(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_blank_notes_dropped() {
        let mut with_notes = input();
        with_notes.notes = Some("  ".to_string());
        assert!(with_notes.into_draft().unwrap().notes.is_none());
    }

    #[test]
    fn test_spool_type_wire_names() {
        assert_eq!(SpoolType::parse("with_spool"), Some(SpoolType::WithSpool));
        assert_eq!(SpoolType::Refill.as_str(), "refill");
        assert_eq!(SpoolType::parse("spool"), None);

        let json = serde_json::to_string(&SpoolType::WithSpool).unwrap();
        assert_eq!(json, "\"with_spool\"");
    }

    #[test]
    fn test_input_reads_type_field() {
        let parsed: FilamentInput = serde_json::from_str(
            r#"{"brand":"eSun","type":"PLA+","color":"Red","spool_type":"refill","purchase_date":"2024-03-01"}"#,
        )
        .unwrap();
        let draft = parsed.into_draft().unwrap();
        assert_eq!(draft.filament_type, "PLA+");
        assert_eq!(draft.purchase_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
