//! Adjudication Services
//!
//! The application layer between the pure policies and the outside world.
//! Each service follows the same discipline: claim the entity's lease,
//! load it, gather facts, evaluate the policy, apply the transition, write
//! through the store's compare-and-swap, dispatch the event, release the
//! lease. A failed fact lookup leaves the entity untouched for the next
//! tick; a lost write race means someone else already decided.

pub mod guard;
pub mod guides;
pub mod claims;
pub mod payments;
pub mod error;

pub use guard::LeaseGuard;
pub use guides::{GuideAdjudication, GuideAdjudicator};
pub use claims::{ClaimAdjudication, ClaimAdjudicator};
pub use payments::{ClaimPaymentService, InvoicePaymentService, PaymentOutcome};
pub use error::AdjudicationError;
