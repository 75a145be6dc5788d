//! Receptes — a small recipe catalog service.
//!
//! CSV-backed recipe store, case-insensitive substring search, and a lazily
//! regenerated ingredient frequency chart, served over HTML and a JSON API.

pub mod catalog;
pub mod chart;
pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod web;
