//! # Lifecycle tables
//!
//! Transition legality for every status enum, expressed as one `match` over
//! `(current, action)` per entity. The engine asks these tables before it
//! touches the store; anything not listed here is rejected.

use crate::types::{
    AcvaStatus, Decision, KycStatus, ProjectStatus, ValidationStatus, VerificationStatus,
};

/// Actions that move an account's KYC status.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KycAction {
    BeginReview,
    Decide(Decision),
}

pub fn kyc_next(current: KycStatus, action: KycAction) -> Option<KycStatus> {
    use KycStatus::*;
    match (current, action) {
        (Pending, KycAction::BeginReview) => Some(InProcess),
        (Pending | InProcess, KycAction::Decide(Decision::Approve)) => Some(Done),
        (Pending | InProcess, KycAction::Decide(Decision::Reject)) => Some(Rejected),
        _ => None,
    }
}

/// `true` if an ACVA may move from `current` to `target`.
///
/// Setting the status it already has is not a transition.
pub fn acva_allows(current: AcvaStatus, target: AcvaStatus) -> bool {
    use AcvaStatus::*;
    matches!(
        (current, target),
        (Pending, Active) | (Active, Suspended) | (Suspended, Active)
    )
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProjectAction {
    /// Validation approved.
    Activate,
    Complete,
}

pub fn project_next(current: ProjectStatus, action: ProjectAction) -> Option<ProjectStatus> {
    use ProjectStatus::*;
    match (current, action) {
        (Pending, ProjectAction::Activate) => Some(Active),
        (Active, ProjectAction::Complete) => Some(Completed),
        _ => None,
    }
}

pub fn validation_next(current: ValidationStatus, decision: Decision) -> Option<ValidationStatus> {
    match (current, decision) {
        (ValidationStatus::Pending, Decision::Approve) => Some(ValidationStatus::Approved),
        (ValidationStatus::Pending, Decision::Reject) => Some(ValidationStatus::Rejected),
        _ => None,
    }
}

pub fn verification_next(
    current: VerificationStatus,
    decision: Decision,
) -> Option<VerificationStatus> {
    match (current, decision) {
        (VerificationStatus::Pending, Decision::Approve) => Some(VerificationStatus::Approved),
        (VerificationStatus::Pending, Decision::Reject) => Some(VerificationStatus::Rejected),
        _ => None,
    }
}
