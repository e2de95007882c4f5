pub mod core;
pub mod selector;

// Re-export the main types for convenience
pub use core::{TierWords, WordBank};
pub use selector::{select, Selection};
