//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the household bills engine using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`]: SQL over row types, transactions for multi-row writes
//! - [`adapters`]: `BillStore` and `HouseholdDirectory` port implementations
//! - [`pool`]: connection pool configuration and migrations
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresBillStore;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/household_bills")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresBillStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{PostgresBillStore, PostgresHouseholdDirectory};
