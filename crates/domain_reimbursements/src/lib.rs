//! Reimbursement Claims Domain
//!
//! A reimbursement claim is a beneficiary's request to be paid back for an
//! out-of-network expense. This crate owns the claim's status lifecycle and
//! the fixed rule catalog that auto-approves small, well-documented
//! expenses, denies the clearly ineligible ones and holds the rest for
//! manual review.
//!
//! # Claim Lifecycle
//!
//! ```text
//! InAnalysis -> Approved/PartiallyApproved -> Paid
//!            \-> Denied
//! ```

pub mod claim;
pub mod policy;
pub mod events;
pub mod ports;
pub mod error;

pub use claim::{ClaimStatus, DocumentType, ExpenseType, ReimbursementClaim};
pub use policy::{ClaimDecision, ClaimDenialReason, ClaimFacts, ClaimPolicy};
pub use events::ClaimEvent;
pub use ports::{ClaimStore, DocumentQuery};
pub use error::ClaimError;
