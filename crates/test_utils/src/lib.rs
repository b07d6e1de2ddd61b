//! Test Utilities Crate
//!
//! Shared test infrastructure for the household bills test suite.
//!
//! # Modules
//!
//! - `fixtures`: Households wired to in-memory stores, canned bill drafts
//! - `database`: PostgreSQL containers with the schema applied
//! - `assertions`: Assertion helpers for splits and allocations
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
