//! Shared test utilities for the WFS workspace.
//!
//! This crate provides:
//! - A fixed set of sample features in two featuresets (`parks`, `trails`)
//! - SQLite databases seeded with them, in memory or on disk
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then in an async test:
//!
//! ```ignore
//! let pool = test_utils::seeded_pool().await;
//! ```

pub mod db;
pub mod fixtures;

pub use db::*;
pub use fixtures::*;
