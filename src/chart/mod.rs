//! Derived chart artifact — ingredient summary, renderers, staleness manager.

pub mod hasher;
pub mod manager;
pub mod render;
pub mod summary;
