//! Vocabulary Entries
//!
//! User-defined brands, types and colors that extend the fixed dropdown
//! choices. Filaments reference entries by exact name, not by id.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

static HEX_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^#[0-9A-Fa-f]{6}$").expect("hex code pattern"));

/// Which vocabulary an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyKind {
    Brand,
    Type,
    Color,
}

impl VocabularyKind {
    pub const ALL: [VocabularyKind; 3] =
        [VocabularyKind::Brand, VocabularyKind::Type, VocabularyKind::Color];

    /// Table holding the custom entries
    pub fn table(&self) -> &'static str {
        match self {
            VocabularyKind::Brand => "custom_brands",
            VocabularyKind::Type => "custom_types",
            VocabularyKind::Color => "custom_colors",
        }
    }

    /// Filament column that references entries of this kind
    pub fn filament_column(&self) -> &'static str {
        match self {
            VocabularyKind::Brand => "brand",
            VocabularyKind::Type => "type",
            VocabularyKind::Color => "color",
        }
    }

    /// Human-readable name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            VocabularyKind::Brand => "brand",
            VocabularyKind::Type => "type",
            VocabularyKind::Color => "color",
        }
    }

    /// Label with a leading capital, for response messages
    pub fn title(&self) -> &'static str {
        match self {
            VocabularyKind::Brand => "Brand",
            VocabularyKind::Type => "Type",
            VocabularyKind::Color => "Color",
        }
    }

    pub fn requires_hex(&self) -> bool {
        matches!(self, VocabularyKind::Color)
    }
}

/// A custom brand, type or color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i64,
    /// Unique within its kind; compared case-sensitively
    pub name: String,
    /// Only present for colors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for VocabularyEntry {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Body for creating an entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hex_code: Option<String>,
}

/// Body for renaming an entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameEntry {
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub new_hex_code: Option<String>,
}

/// A validated name plus hex code (colors only)
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub name: String,
    pub hex_code: Option<String>,
}

pub fn is_valid_hex(code: &str) -> bool {
    HEX_CODE.is_match(code)
}

fn check_fields(
    kind: VocabularyKind,
    name: Option<String>,
    hex_code: Option<String>,
) -> DomainResult<EntryFields> {
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DomainError::InvalidInput(format!("{} name is required", kind.title())))?;

    if !kind.requires_hex() {
        return Ok(EntryFields { name, hex_code: None });
    }

    match hex_code {
        Some(code) if is_valid_hex(&code) => Ok(EntryFields {
            name,
            hex_code: Some(code),
        }),
        Some(code) => Err(DomainError::InvalidInput(format!(
            "Invalid hex code '{}', expected #RRGGBB",
            code
        ))),
        None => Err(DomainError::InvalidInput(
            "Color name and hex code are required".to_string(),
        )),
    }
}

impl NewEntry {
    pub fn validate(self, kind: VocabularyKind) -> DomainResult<EntryFields> {
        check_fields(kind, self.name, self.hex_code)
    }
}

impl RenameEntry {
    pub fn validate(self, kind: VocabularyKind) -> DomainResult<EntryFields> {
        check_fields(kind, self.new_name, self.new_hex_code)
    }
}

/// A dropdown choice: a fixed preset or a custom entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_code: Option<String>,
    pub custom: bool,
}

const PRESET_BRANDS: &[&str] = &[
    "Bambu Lab",
    "Prusament",
    "Hatchbox",
    "eSun",
    "Polymaker",
    "Overture",
    "Sunlu",
    "Elegoo",
];

const PRESET_TYPES: &[&str] = &[
    "PLA", "PLA+", "PETG", "ABS", "ASA", "TPU", "Nylon", "PC",
];

const PRESET_COLORS: &[(&str, &str)] = &[
    ("Red", "#FF0000"),
    ("Blue", "#0000FF"),
    ("Green", "#008000"),
    ("Yellow", "#FFFF00"),
    ("Orange", "#FFA500"),
    ("Purple", "#800080"),
    ("Pink", "#FFC0CB"),
    ("Black", "#000000"),
    ("White", "#FFFFFF"),
    ("Gray", "#808080"),
    ("Brown", "#A52A2A"),
    ("Transparent", "#F5F5F5"),
];

/// Fixed choices shipped with the application
pub fn presets(kind: VocabularyKind) -> Vec<Choice> {
    match kind {
        VocabularyKind::Brand => plain_presets(PRESET_BRANDS),
        VocabularyKind::Type => plain_presets(PRESET_TYPES),
        VocabularyKind::Color => PRESET_COLORS
            .iter()
            .map(|(name, hex)| Choice {
                name: name.to_string(),
                hex_code: Some(hex.to_string()),
                custom: false,
            })
            .collect(),
    }
}

fn plain_presets(names: &[&str]) -> Vec<Choice> {
    names
        .iter()
        .map(|name| Choice {
            name: name.to_string(),
            hex_code: None,
            custom: false,
        })
        .collect()
}

/// Presets followed by custom entries; a custom entry with a preset's exact
/// name replaces that preset
pub fn merge_choices(kind: VocabularyKind, custom: &[VocabularyEntry]) -> Vec<Choice> {
    let mut choices: Vec<Choice> = presets(kind)
        .into_iter()
        .filter(|preset| !custom.iter().any(|entry| entry.name == preset.name))
        .collect();

    choices.extend(custom.iter().map(|entry| Choice {
        name: entry.name.clone(),
        hex_code: entry.hex_code.clone(),
        custom: true,
    }));
    choices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, hex: Option<&str>) -> VocabularyEntry {
        VocabularyEntry {
            id: 1,
            name: name.to_string(),
            hex_code: hex.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_hex_validation() {
        assert!(is_valid_hex("#DC143C"));
        assert!(is_valid_hex("#a1b2c3"));
        assert!(!is_valid_hex("DC143C"));
        assert!(!is_valid_hex("#DC143"));
        assert!(!is_valid_hex("#GG0000"));
        assert!(!is_valid_hex("#DC143C0"));
    }

    #[test]
    fn test_rename_requires_hex_for_colors() {
        let missing = RenameEntry {
            new_name: Some("Crimson".to_string()),
            new_hex_code: None,
        };
        assert!(matches!(
            missing.validate(VocabularyKind::Color),
            Err(DomainError::InvalidInput(_))
        ));

        let malformed = RenameEntry {
            new_name: Some("Crimson".to_string()),
            new_hex_code: Some("crimson".to_string()),
        };
        assert!(matches!(
            malformed.validate(VocabularyKind::Color),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rename_ignores_hex_for_brands() {
        let fields = RenameEntry {
            new_name: Some(" Prusa ".to_string()),
            new_hex_code: Some("#000000".to_string()),
        }
        .validate(VocabularyKind::Brand)
        .unwrap();
        assert_eq!(fields.name, "Prusa");
        assert!(fields.hex_code.is_none());
    }

    #[test]
    fn test_empty_name_rejected() {
        let empty = NewEntry {
            name: Some(String::new()),
            hex_code: None,
        };
        assert!(matches!(
            empty.validate(VocabularyKind::Type),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rename_wire_format() {
        let body: RenameEntry =
            serde_json::from_str(r##"{"newName":"Crimson","newHexCode":"#DC143C"}"##).unwrap();
        assert_eq!(body.new_name.as_deref(), Some("Crimson"));
        assert_eq!(body.new_hex_code.as_deref(), Some("#DC143C"));
    }

    #[test]
    fn test_merge_choices_custom_last() {
        let custom = vec![entry("Voxelab", None)];
        let choices = merge_choices(VocabularyKind::Brand, &custom);
        let last = choices.last().unwrap();
        assert_eq!(last.name, "Voxelab");
        assert!(last.custom);
        assert!(choices.iter().any(|c| c.name == "Prusament" && !c.custom));
    }

    #[test]
    fn test_merge_choices_custom_overrides_preset() {
        let custom = vec![entry("Red", Some("#AA0000"))];
        let choices = merge_choices(VocabularyKind::Color, &custom);
        let reds: Vec<_> = choices.iter().filter(|c| c.name == "Red").collect();
        assert_eq!(reds.len(), 1);
        assert_eq!(reds[0].hex_code.as_deref(), Some("#AA0000"));
        assert!(reds[0].custom);
    }

    #[test]
    fn test_kind_columns() {
        assert_eq!(VocabularyKind::Type.filament_column(), "type");
        assert_eq!(VocabularyKind::Color.table(), "custom_colors");
        assert!(VocabularyKind::Color.requires_hex());
        assert!(!VocabularyKind::Brand.requires_hex());
    }
}
