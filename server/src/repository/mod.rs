//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod filament_repo;
mod vocabulary_repo;


pub use traits::{Repository, SearchableRepository};
pub use db::{init_db, DbState, SharedConnection};
pub use filament_repo::FilamentRepository;
pub use vocabulary_repo::VocabularyRepository;
