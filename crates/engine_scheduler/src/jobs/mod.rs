//! The job catalog
//!
//! One module per sweep, mirroring the back-office schedule:
//!
//! | Job | Cadence |
//! |---|---|
//! | ExpireGuides | hourly |
//! | NudgePendingGuides | daily 09:00 |
//! | AdjudicatePendingClaims | every 6 h |
//! | NudgePendingClaims | daily 11:00 |
//! | GenerateMonthlyInvoices | monthly, day 1 01:00 |
//! | FlagOverdueInvoices | daily 02:00 |
//! | RemindUpcomingInvoices | daily 08:00 |
//! | GenerateAnnualTaxStatements | yearly, Jan 2 03:00 |

mod expire_guides;
mod nudge_pending_guides;
mod adjudicate_pending_claims;
mod nudge_pending_claims;
mod generate_monthly_invoices;
mod flag_overdue_invoices;
mod remind_upcoming_invoices;
mod generate_tax_statements;

pub use expire_guides::ExpireGuides;
pub use nudge_pending_guides::{NudgePendingGuides, GUIDE_NUDGE_AGE_HOURS};
pub use adjudicate_pending_claims::{AdjudicatePendingClaims, CLAIM_ANALYSIS_DELAY_HOURS};
pub use nudge_pending_claims::{NudgePendingClaims, CLAIM_NUDGE_AGE_HOURS};
pub use generate_monthly_invoices::{GenerateMonthlyInvoices, DEPENDENT_FEE_RATE};
pub use flag_overdue_invoices::FlagOverdueInvoices;
pub use remind_upcoming_invoices::{RemindUpcomingInvoices, UPCOMING_DUE_DAYS};
pub use generate_tax_statements::GenerateAnnualTaxStatements;
