//! Recipe store — types, built-in defaults, persisted file, in-memory table.

pub mod defaults;
pub mod markup;
pub mod persist;
pub mod store;
pub mod types;
