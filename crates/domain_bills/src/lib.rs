//! Bills Domain - Splitting and Settlement
//!
//! This crate divides household bills among members and tracks each member's
//! share until the bill creator confirms it was paid.
//!
//! # Components
//!
//! - **Allocation**: equal shares, half-up to the cent, remainder not
//!   redistributed
//! - **Split ledger**: per-obligor status machine
//!   (`UNPAID` → `PENDING_APPROVAL` → `PAID`) with actor checks
//! - **Bill aggregate**: draft validation, obligor resolution, issuing
//! - **Settlement service**: orchestration over the [`ports`]
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_bills::{BillDraft, ObligorSelection, SettlementService};
//!
//! let issued = service
//!     .create_bill(alice, BillDraft::new("Rent", dec!(100.00)), ObligorSelection::SplitEqually)
//!     .await?;
//!
//! let split = &issued.splits[1];
//! service.settle(split.user_id, split.id).await?;
//! service.approve(alice, split.id).await?;
//! ```

pub mod allocation;
pub mod bill;
pub mod error;
pub mod ports;
pub mod service;
pub mod split;

pub use allocation::{allocate, AllocationError, Share};
pub use bill::{Bill, BillDraft, BillSummary, IssuedBill, ObligorSelection};
pub use error::BillingError;
pub use ports::{BillStore, HouseholdDirectory};
pub use service::SettlementService;
pub use split::{BillSplit, SplitStatus, SplitTransition};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockBillStore, MockHouseholdDirectory};
