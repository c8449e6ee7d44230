//! Domain Layer
//!
//! Contains all domain entities and core rules.
//! This layer has no storage or transport dependencies.

mod entity;
mod filament;
mod filter;
mod stats;
mod usage;
mod vocabulary;

pub use entity::{DomainError, DomainResult, Entity};
pub use filament::{Filament, FilamentDraft, FilamentInput, SpoolType, DEFAULT_WEIGHT};
pub use filter::{matches_query, FilamentFilter};
pub use stats::{InventoryStats, UsedStats};
pub use usage::{is_used_up, Usage, UsageType};
pub use vocabulary::{
    is_valid_hex, merge_choices, presets, Choice, EntryFields, NewEntry, RenameEntry,
    VocabularyEntry, VocabularyKind,
};
