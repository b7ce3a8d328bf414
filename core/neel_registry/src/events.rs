//! Events published by committed registry transitions.
//!
//! A failed transition publishes nothing. Consumers drain the queue with
//! [`Registry::take_events`](crate::Registry::take_events) and are free to
//! persist, forward or drop them.

use serde::{Deserialize, Serialize};

use crate::storage::EntityKind;
use crate::types::{AcvaStatus, Decision, KycStatus};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    AccountRegistered {
        account_id: String,
    },
    KycReviewStarted {
        account_id: String,
    },
    KycReviewed {
        account_id: String,
        decision: Decision,
        status: KycStatus,
    },
    ProjectRegistered {
        project_id: String,
        account_id: String,
    },
    /// Validation approved; project moved Pending -> Active.
    ProjectActivated {
        project_id: String,
        validation_id: String,
    },
    ProjectCompleted {
        project_id: String,
    },
    AcvaRegistered {
        acva_id: String,
    },
    AcvaAssigned {
        acva_id: String,
        project_id: String,
    },
    AcvaStatusChanged {
        acva_id: String,
        from: AcvaStatus,
        to: AcvaStatus,
        /// Pending validations/verifications still held by the agency.
        open_assignments: u32,
    },
    ValidationSubmitted {
        validation_id: String,
        project_id: String,
        acva_id: String,
    },
    ValidationReportAttached {
        validation_id: String,
        project_id: String,
    },
    ValidationResolved {
        validation_id: String,
        project_id: String,
        decision: Decision,
    },
    VerificationSubmitted {
        verification_id: String,
        project_id: String,
        cycle: u32,
    },
    VerificationReportAttached {
        verification_id: String,
        project_id: String,
    },
    VerificationResolved {
        verification_id: String,
        project_id: String,
        decision: Decision,
        cycle: u32,
    },
    /// Credits issued by an approved verification.
    CreditsIssued {
        project_id: String,
        verification_id: String,
        credits: u64,
        buffer_deducted: u64,
        /// Part of the requested deduction that exceeded the buffer balance.
        buffer_shortfall: u64,
    },
}

impl RegistryEvent {
    /// Short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountRegistered { .. } => "account_registered",
            Self::KycReviewStarted { .. } => "kyc_review_started",
            Self::KycReviewed { .. } => "kyc_reviewed",
            Self::ProjectRegistered { .. } => "project_registered",
            Self::ProjectActivated { .. } => "project_activated",
            Self::ProjectCompleted { .. } => "project_completed",
            Self::AcvaRegistered { .. } => "acva_registered",
            Self::AcvaAssigned { .. } => "acva_assigned",
            Self::AcvaStatusChanged { .. } => "acva_status_changed",
            Self::ValidationSubmitted { .. } => "validation_submitted",
            Self::ValidationReportAttached { .. } => "validation_report_attached",
            Self::ValidationResolved { .. } => "validation_resolved",
            Self::VerificationSubmitted { .. } => "verification_submitted",
            Self::VerificationReportAttached { .. } => "verification_report_attached",
            Self::VerificationResolved { .. } => "verification_resolved",
            Self::CreditsIssued { .. } => "credits_issued",
        }
    }

    /// The record the event is about.
    pub fn subject(&self) -> (EntityKind, &str) {
        match self {
            Self::AccountRegistered { account_id }
            | Self::KycReviewStarted { account_id }
            | Self::KycReviewed { account_id, .. } => (EntityKind::Account, account_id.as_str()),
            Self::ProjectRegistered { project_id, .. }
            | Self::ProjectActivated { project_id, .. }
            | Self::ProjectCompleted { project_id }
            | Self::CreditsIssued { project_id, .. } => (EntityKind::Project, project_id.as_str()),
            Self::AcvaRegistered { acva_id }
            | Self::AcvaAssigned { acva_id, .. }
            | Self::AcvaStatusChanged { acva_id, .. } => (EntityKind::Acva, acva_id.as_str()),
            Self::ValidationSubmitted { validation_id, .. }
            | Self::ValidationReportAttached { validation_id, .. }
            | Self::ValidationResolved { validation_id, .. } => {
                (EntityKind::Validation, validation_id.as_str())
            }
            Self::VerificationSubmitted {
                verification_id, ..
            }
            | Self::VerificationReportAttached {
                verification_id, ..
            }
            | Self::VerificationResolved {
                verification_id, ..
            } => (EntityKind::Verification, verification_id.as_str()),
        }
    }

    /// The project affected, if any.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::ProjectRegistered { project_id, .. }
            | Self::ProjectActivated { project_id, .. }
            | Self::ProjectCompleted { project_id }
            | Self::AcvaAssigned { project_id, .. }
            | Self::ValidationSubmitted { project_id, .. }
            | Self::ValidationReportAttached { project_id, .. }
            | Self::ValidationResolved { project_id, .. }
            | Self::VerificationSubmitted { project_id, .. }
            | Self::VerificationReportAttached { project_id, .. }
            | Self::VerificationResolved { project_id, .. }
            | Self::CreditsIssued { project_id, .. } => Some(project_id.as_str()),
            _ => None,
        }
    }

    /// Credit quantity carried by the event, if any.
    pub fn amount(&self) -> Option<u64> {
        match self {
            Self::CreditsIssued { credits, .. } => Some(*credits),
            _ => None,
        }
    }
}
