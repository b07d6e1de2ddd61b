//! Repository implementations
//!
//! Repositories own the SQL and work with plain row types; the adapters map
//! rows to domain types. Queries are built at runtime with `bind`, and every
//! multi-row write runs in a transaction.

pub mod bills;
pub mod households;

pub use bills::BillRepository;
pub use households::HouseholdRepository;
