pub mod export;
pub mod roster;

pub use crate::domain::model::{RouteType, Student, StudentDraft, StudentId};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
