//! Domain events for the guide aggregate
//!
//! Every successful transition yields exactly one event. Events are facts:
//! they carry the old status, the data the transition produced, and the
//! instant it happened. The side-effect dispatcher turns them into
//! notifications and audit records after the state is committed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BeneficiaryId, GuideId};

use crate::guide::GuideStatus;
use crate::policy::GuideDenialReason;

/// Domain events emitted by guide transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GuideEvent {
    /// Guide routed to manual review
    SentToAnalysis {
        guide_id: GuideId,
        guide_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: GuideStatus,
        timestamp: DateTime<Utc>,
    },

    /// Guide authorized
    Authorized {
        guide_id: GuideId,
        guide_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: GuideStatus,
        expiry_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// Guide denied
    Denied {
        guide_id: GuideId,
        guide_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: GuideStatus,
        reason: GuideDenialReason,
        timestamp: DateTime<Utc>,
    },

    /// Guide cancelled
    Cancelled {
        guide_id: GuideId,
        guide_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: GuideStatus,
        timestamp: DateTime<Utc>,
    },

    /// Authorization lapsed unused
    Expired {
        guide_id: GuideId,
        guide_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: GuideStatus,
        expiry_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// Authorization consumed at the provider
    Used {
        guide_id: GuideId,
        guide_number: String,
        beneficiary_id: BeneficiaryId,
        old_status: GuideStatus,
        timestamp: DateTime<Utc>,
    },
}

impl GuideEvent {
    /// Returns the guide ID associated with this event
    pub fn guide_id(&self) -> GuideId {
        match self {
            GuideEvent::SentToAnalysis { guide_id, .. } => *guide_id,
            GuideEvent::Authorized { guide_id, .. } => *guide_id,
            GuideEvent::Denied { guide_id, .. } => *guide_id,
            GuideEvent::Cancelled { guide_id, .. } => *guide_id,
            GuideEvent::Expired { guide_id, .. } => *guide_id,
            GuideEvent::Used { guide_id, .. } => *guide_id,
        }
    }

    /// Returns the affected beneficiary
    pub fn beneficiary_id(&self) -> BeneficiaryId {
        match self {
            GuideEvent::SentToAnalysis { beneficiary_id, .. } => *beneficiary_id,
            GuideEvent::Authorized { beneficiary_id, .. } => *beneficiary_id,
            GuideEvent::Denied { beneficiary_id, .. } => *beneficiary_id,
            GuideEvent::Cancelled { beneficiary_id, .. } => *beneficiary_id,
            GuideEvent::Expired { beneficiary_id, .. } => *beneficiary_id,
            GuideEvent::Used { beneficiary_id, .. } => *beneficiary_id,
        }
    }

    /// Returns the status before the transition
    pub fn old_status(&self) -> GuideStatus {
        match self {
            GuideEvent::SentToAnalysis { old_status, .. } => *old_status,
            GuideEvent::Authorized { old_status, .. } => *old_status,
            GuideEvent::Denied { old_status, .. } => *old_status,
            GuideEvent::Cancelled { old_status, .. } => *old_status,
            GuideEvent::Expired { old_status, .. } => *old_status,
            GuideEvent::Used { old_status, .. } => *old_status,
        }
    }

    /// Returns the status after the transition
    pub fn new_status(&self) -> GuideStatus {
        match self {
            GuideEvent::SentToAnalysis { .. } => GuideStatus::InAnalysis,
            GuideEvent::Authorized { .. } => GuideStatus::Authorized,
            GuideEvent::Denied { .. } => GuideStatus::Denied,
            GuideEvent::Cancelled { .. } => GuideStatus::Cancelled,
            GuideEvent::Expired { .. } => GuideStatus::Expired,
            GuideEvent::Used { .. } => GuideStatus::Used,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            GuideEvent::SentToAnalysis { timestamp, .. } => *timestamp,
            GuideEvent::Authorized { timestamp, .. } => *timestamp,
            GuideEvent::Denied { timestamp, .. } => *timestamp,
            GuideEvent::Cancelled { timestamp, .. } => *timestamp,
            GuideEvent::Expired { timestamp, .. } => *timestamp,
            GuideEvent::Used { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            GuideEvent::SentToAnalysis { .. } => "GuideSentToAnalysis",
            GuideEvent::Authorized { .. } => "GuideAuthorized",
            GuideEvent::Denied { .. } => "GuideDenied",
            GuideEvent::Cancelled { .. } => "GuideCancelled",
            GuideEvent::Expired { .. } => "GuideExpired",
            GuideEvent::Used { .. } => "GuideUsed",
        }
    }
}
