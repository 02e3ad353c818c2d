//! Authorization Guides Domain
//!
//! A guide is a prior-authorization request for medical procedures at an
//! accredited provider. This crate owns the guide's status lifecycle and the
//! policy that decides, at intake, whether a guide is authorized
//! automatically, denied, or held for manual review.
//!
//! # Guide Lifecycle
//!
//! ```text
//! Pending -> InAnalysis -> Authorized -> Expired/Used
//!         \-> Authorized    \-> Cancelled
//!         \-> Denied
//! ```

pub mod guide;
pub mod policy;
pub mod events;
pub mod ports;
pub mod error;

pub use guide::{AuthorizationGuide, GuideStatus, GuideType, ProcedureLine};
pub use policy::{GuideDecision, GuideDenialReason, GuideFacts, GuidePolicy};
pub use events::GuideEvent;
pub use ports::GuideStore;
pub use error::GuideError;
