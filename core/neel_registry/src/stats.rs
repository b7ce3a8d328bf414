//! Dashboard aggregation.
//!
//! Pure projections over an [`EntityStore`]. Nothing here is cached: every
//! call walks the store, so the result always matches its current contents.
//!
//! `total_carbon_removed` has no source field of its own. It is approximated
//! as the credits recommended by approved verifications.

use crate::storage::{EntityStore, EntityStoreExt};
use crate::types::{
    Account, DashboardStats, Notification, NotificationKind, Project, Validation,
    ValidationStatus, Verification, VerificationStatus,
};

pub fn compute_stats<S: EntityStore + ?Sized>(store: &S) -> DashboardStats {
    let projects: Vec<Project> = store.list();
    let total_carbon_removed = store
        .list_where::<Verification, _>(|v| v.status == VerificationStatus::Approved)
        .iter()
        .map(|v| v.credits_recommended)
        .fold(0u64, u64::saturating_add);

    DashboardStats {
        total_projects: projects.len() as u64,
        total_carbon_removed,
        total_credits_issued: projects
            .iter()
            .map(|p| p.credits_issued)
            .fold(0, u64::saturating_add),
        total_buffer_credits: projects
            .iter()
            .map(|p| p.buffer_credits)
            .fold(0, u64::saturating_add),
    }
}

/// Header counters: open KYCs, pending validations, pending verifications
/// and credits issued.
pub fn notifications<S: EntityStore + ?Sized>(store: &S) -> Vec<Notification> {
    let open_kyc = store
        .list_where::<Account, _>(|a| a.kyc_status.is_open())
        .len();
    let pending_validations = store
        .list_where::<Validation, _>(|v| v.status == ValidationStatus::Pending)
        .len();
    let pending_verifications = store
        .list_where::<Verification, _>(|v| v.status == VerificationStatus::Pending)
        .len();

    vec![
        Notification {
            kind: NotificationKind::Kyc,
            count: open_kyc as u64,
        },
        Notification {
            kind: NotificationKind::Validation,
            count: pending_validations as u64,
        },
        Notification {
            kind: NotificationKind::Verification,
            count: pending_verifications as u64,
        },
        Notification {
            kind: NotificationKind::Credits,
            count: compute_stats(store).total_credits_issued,
        },
    ]
}
