// Adapters layer: concrete slot backends behind the domain Storage port.

pub mod storage;

pub use storage::{LocalStorage, MemoryStorage};
