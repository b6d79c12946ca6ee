pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{LocalStorage, MemoryStorage};
pub use config::BusMapConfig;
pub use crate::core::export::write_roster_csv;
pub use crate::core::roster::{RosterStore, StudentFilter, DEFAULT_STORAGE_KEY};
pub use domain::model::{RouteType, Student, StudentDraft, StudentId};
pub use utils::error::{BusMapError, Result};
pub use utils::validation::{validate_student, ValidationErrors};
