//! Domain Adapters
//!
//! PostgreSQL implementations of the bills domain ports. Each adapter wraps a
//! repository, converts rows to domain types and maps `DatabaseError` to
//! `PortError`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_bills::SettlementService;
//! use infra_db::adapters::{PostgresBillStore, PostgresHouseholdDirectory};
//!
//! let service = SettlementService::new(
//!     Arc::new(PostgresBillStore::new(pool.clone())),
//!     Arc::new(PostgresHouseholdDirectory::new(pool)),
//! );
//! ```

pub mod bills;
pub mod households;

pub use bills::PostgresBillStore;
pub use households::PostgresHouseholdDirectory;
