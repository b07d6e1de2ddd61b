//! Core Kernel - Foundational types for the household bills engine
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money with cent precision and explicit rounding
//! - Strongly-typed identifiers
//! - Port infrastructure for the ports-and-adapters layout

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, MoneyError, round_half_up, CENT_SCALE};
pub use identifiers::{HouseholdId, UserId, BillId, BillSplitId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
