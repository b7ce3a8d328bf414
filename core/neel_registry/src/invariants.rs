#![allow(dead_code)]

use crate::lifecycle::{self, ProjectAction};
use crate::stats::compute_stats;
use crate::storage::{EntityStore, EntityStoreExt};
use crate::types::*;

/// INV-1: every id an account, project, ACVA, validation or verification
/// refers to resolves to a stored record, and ownership links agree.
pub fn assert_referential_integrity<S: EntityStore>(store: &S) {
    for account in store.list::<Account>() {
        for project_id in &account.project_ids {
            let project: Project = store.get(project_id).unwrap_or_else(|_| {
                panic!(
                    "INV-1 violated: account {} lists unknown project {project_id}",
                    account.id
                )
            });
            assert_eq!(
                project.account_id, account.id,
                "INV-1 violated: project {project_id} is not owned by account {}",
                account.id
            );
        }
    }
    for project in store.list::<Project>() {
        let account: Account = store.get(&project.account_id).unwrap_or_else(|_| {
            panic!(
                "INV-1 violated: project {} has unknown account {}",
                project.id, project.account_id
            )
        });
        assert!(
            account.project_ids.contains(&project.id),
            "INV-1 violated: account {} does not list project {}",
            account.id,
            project.id
        );
    }
    for acva in store.list::<Acva>() {
        for project_id in &acva.projects_assigned {
            assert!(
                store.contains::<Project>(project_id),
                "INV-1 violated: ACVA {} assigned unknown project {project_id}",
                acva.id
            );
        }
    }
    for validation in store.list::<Validation>() {
        let id = &validation.id;
        assert!(store.contains::<Project>(&validation.project_id), "INV-1 violated: {id}");
        assert!(store.contains::<Acva>(&validation.acva_id), "INV-1 violated: {id}");
    }
    for verification in store.list::<Verification>() {
        let id = &verification.id;
        assert!(store.contains::<Project>(&verification.project_id), "INV-1 violated: {id}");
        assert!(store.contains::<Acva>(&verification.acva_id), "INV-1 violated: {id}");
    }
}

/// INV-2: at most one pending validation and one pending verification per project.
pub fn assert_single_open_review<S: EntityStore>(store: &S) {
    for project in store.list::<Project>() {
        let open_validations = store
            .list_where::<Validation, _>(|v| {
                v.project_id == project.id && v.status == ValidationStatus::Pending
            })
            .len();
        let open_verifications = store
            .list_where::<Verification, _>(|v| {
                v.project_id == project.id && v.status == VerificationStatus::Pending
            })
            .len();
        assert!(
            open_validations <= 1,
            "INV-2 violated: project {} has {open_validations} pending validations",
            project.id
        );
        assert!(
            open_verifications <= 1,
            "INV-2 violated: project {} has {open_verifications} pending verifications",
            project.id
        );
    }
}

/// INV-3: dashboard totals equal a hand-rolled recomputation.
pub fn assert_stats_consistent<S: EntityStore>(store: &S) {
    let projects = store.list::<Project>();
    let expected = DashboardStats {
        total_projects: projects.len() as u64,
        total_carbon_removed: store
            .list_where::<Verification, _>(|v| v.status == VerificationStatus::Approved)
            .iter()
            .map(|v| v.credits_recommended)
            .sum(),
        total_credits_issued: projects.iter().map(|p| p.credits_issued).sum(),
        total_buffer_credits: projects.iter().map(|p| p.buffer_credits).sum(),
    };
    assert_eq!(compute_stats(store), expected, "INV-3 violated: stats drifted from store");
}

/// INV-4: issued credits never decrease; the buffer never increases.
pub fn assert_credit_movement(before: &Project, after: &Project) {
    assert!(
        after.credits_issued >= before.credits_issued,
        "INV-4 violated: project {} credits went from {} to {}",
        before.id,
        before.credits_issued,
        after.credits_issued
    );
    assert!(
        after.buffer_credits <= before.buffer_credits,
        "INV-4 violated: project {} buffer grew from {} to {}",
        before.id,
        before.buffer_credits,
        after.buffer_credits
    );
}

/// INV-5: only forward project transitions.
pub fn assert_valid_project_transition(from: ProjectStatus, to: ProjectStatus) {
    if from == to {
        return;
    }
    let valid = lifecycle::project_next(from, ProjectAction::Activate) == Some(to)
        || lifecycle::project_next(from, ProjectAction::Complete) == Some(to);
    assert!(valid, "INV-5 violated: invalid project transition {from:?} -> {to:?}");
}

/// INV-6: timelines only grow, and existing entries are never rewritten.
pub fn assert_timeline_append_only(before: &Project, after: &Project) {
    assert!(
        after.timeline.len() >= before.timeline.len(),
        "INV-6 violated: project {} timeline shrank",
        before.id
    );
    assert_eq!(
        &after.timeline[..before.timeline.len()],
        &before.timeline[..],
        "INV-6 violated: project {} timeline rewritten",
        before.id
    );
}

/// Run all store-wide invariants.
pub fn assert_all_invariants<S: EntityStore>(store: &S) {
    assert_referential_integrity(store);
    assert_single_open_review(store);
    assert_stats_consistent(store);
}
