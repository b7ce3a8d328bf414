use proptest::prelude::*;

use crate::fixtures;
use crate::invariants::*;
use crate::*;

const ACCOUNTS: [&str; 5] = ["ACC-001", "ACC-002", "ACC-003", "ACC-004", "ACC-404"];
const ACVAS: [&str; 3] = ["ACVA-001", "ACVA-002", "ACVA-003"];
const PROJECTS: [&str; 4] = ["PRJ-001", "PRJ-002", "PRJ-003", "PRJ-004"];
const VALIDATIONS: [&str; 3] = ["VAL-001", "VAL-002", "VAL-404"];
const VERIFICATIONS: [&str; 5] = ["VER-001", "VER-003", "VER-004", "VER-005", "VER-404"];

#[derive(Clone, Debug)]
enum Op {
    BeginKyc(usize),
    ReviewKyc(usize, Decision),
    SetAcva(usize, AcvaStatus),
    AttachValidationReport(usize),
    ResolveValidation(usize, Decision),
    AttachVerificationReport(usize),
    ResolveVerification(usize, Decision),
    Complete(usize),
}

fn decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]
}

fn acva_status() -> impl Strategy<Value = AcvaStatus> {
    prop_oneof![
        Just(AcvaStatus::Pending),
        Just(AcvaStatus::Active),
        Just(AcvaStatus::Suspended)
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS.len()).prop_map(Op::BeginKyc),
        (0..ACCOUNTS.len(), decision()).prop_map(|(i, d)| Op::ReviewKyc(i, d)),
        (0..ACVAS.len(), acva_status()).prop_map(|(i, s)| Op::SetAcva(i, s)),
        (0..VALIDATIONS.len()).prop_map(Op::AttachValidationReport),
        (0..VALIDATIONS.len(), decision()).prop_map(|(i, d)| Op::ResolveValidation(i, d)),
        (0..VERIFICATIONS.len()).prop_map(Op::AttachVerificationReport),
        (0..VERIFICATIONS.len(), decision()).prop_map(|(i, d)| Op::ResolveVerification(i, d)),
        (0..PROJECTS.len()).prop_map(Op::Complete),
    ]
}

fn apply(registry: &mut Registry, op: &Op) -> Result<()> {
    match *op {
        Op::BeginKyc(i) => registry.begin_kyc_review(ACCOUNTS[i]).map(drop),
        Op::ReviewKyc(i, d) => registry.review_kyc(ACCOUNTS[i], d).map(drop),
        Op::SetAcva(i, s) => registry.set_acva_status(ACVAS[i], s).map(drop),
        Op::AttachValidationReport(i) => registry
            .attach_validation_report(VALIDATIONS[i], "report.pdf")
            .map(drop),
        Op::ResolveValidation(i, d) => registry.resolve_validation(VALIDATIONS[i], d).map(drop),
        Op::AttachVerificationReport(i) => registry
            .attach_verification_report(VERIFICATIONS[i], "report.pdf")
            .map(drop),
        Op::ResolveVerification(i, d) => {
            registry.resolve_verification(VERIFICATIONS[i], d).map(drop)
        }
        Op::Complete(i) => registry.complete_project(PROJECTS[i]).map(drop),
    }
}

proptest! {
    /// Any sequence of admin actions keeps the store consistent, and every
    /// failed action leaves it exactly as it was.
    #[test]
    fn prop_failed_actions_roll_back(ops in prop::collection::vec(op(), 1..40)) {
        let mut registry = fixtures::sample_registry();
        for op in &ops {
            let before = registry.store().clone();
            if apply(&mut registry, op).is_err() {
                prop_assert_eq!(registry.store(), &before, "{:?} mutated the store", op);
                prop_assert!(registry.take_events().is_empty());
            } else {
                prop_assert!(!registry.take_events().is_empty(), "{:?} published nothing", op);
            }
            assert_all_invariants(registry.store());
        }
    }

    /// Buffer balance after a run of approved cycles is the initial balance
    /// minus the deductions, floored at zero, and the reported shortfall
    /// accounts for the rest.
    #[test]
    fn prop_buffer_never_overdrawn(
        cycles in prop::collection::vec((0u64..2_000, 0u64..120, any::<bool>()), 1..25)
    ) {
        let mut registry = fixtures::sample_registry();
        registry.resolve_verification("VER-004", Decision::Approve).unwrap();
        let start: Project = registry.get("PRJ-001").unwrap();

        let mut requested = 0u64;
        let mut shortfall = 0u64;
        let mut credited = 0u64;
        for (n, (credits, deduct, approve)) in cycles.iter().copied().enumerate() {
            let id = format!("VER-P{n:03}");
            registry
                .submit_verification(NewVerification {
                    id: id.clone(),
                    project_id: "PRJ-001".into(),
                    acva_id: "ACVA-001".into(),
                    credits_recommended: credits,
                    buffer_credits_deducted: deduct,
                    verification_report: Some(format!("{id}.pdf")),
                    verification_date: start.start_date,
                })
                .unwrap();

            let before: Project = registry.get("PRJ-001").unwrap();
            let decision = if approve { Decision::Approve } else { Decision::Reject };
            let outcome = registry.resolve_verification(&id, decision).unwrap();
            let after: Project = registry.get("PRJ-001").unwrap();
            assert_credit_movement(&before, &after);

            if approve {
                requested += deduct;
                credited += credits;
                shortfall += outcome.buffer_shortfall;
            } else {
                prop_assert_eq!(&before, &after);
            }
        }

        let end: Project = registry.get("PRJ-001").unwrap();
        prop_assert_eq!(end.buffer_credits, start.buffer_credits.saturating_sub(requested));
        prop_assert_eq!(end.buffer_credits + requested - shortfall, start.buffer_credits);
        prop_assert_eq!(end.credits_issued, start.credits_issued + credited);
    }

    /// Resolving the same verification twice always fails the second time
    /// with `InvalidState`, whatever the decisions.
    #[test]
    fn prop_second_resolution_is_refused(first in decision(), second in decision()) {
        let mut registry = fixtures::sample_registry();
        registry.resolve_verification("VER-004", first).unwrap();
        let snapshot = registry.store().clone();

        let err = registry.resolve_verification("VER-004", second).unwrap_err();
        let is_invalid_state = matches!(err, Error::InvalidState { .. });
        prop_assert!(is_invalid_state);
        prop_assert_eq!(registry.store(), &snapshot);
    }

    /// Stats are a pure function of the store.
    #[test]
    fn prop_stats_are_deterministic(ops in prop::collection::vec(op(), 0..20)) {
        let mut registry = fixtures::sample_registry();
        for op in &ops {
            let _ = apply(&mut registry, op);
        }
        let first = registry.stats();
        prop_assert_eq!(first, registry.stats());
        prop_assert_eq!(first, stats::compute_stats(&registry.store().clone()));
    }

    /// Registration order and duplicates in the assignment list do not
    /// affect which projects an agency is assigned to.
    #[test]
    fn prop_acva_assignments_are_order_independent(
        picks in prop::collection::vec(0..PROJECTS.len(), 0..10)
    ) {
        let mut registry = fixtures::sample_registry();
        let mut acva = fixtures::acvas().remove(0);
        acva.id = "ACVA-009".into();
        acva.projects_assigned = picks.iter().map(|&i| PROJECTS[i].to_string()).collect();

        let stored = registry.register_acva(acva).unwrap();
        let mut expected: Vec<&str> = picks.iter().map(|&i| PROJECTS[i]).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(&stored.projects_assigned, &expected);
        for project_id in PROJECTS {
            prop_assert_eq!(stored.is_assigned(project_id), expected.contains(&project_id));
        }
        assert_all_invariants(registry.store());
    }

    #[test]
    fn prop_confidence_stays_in_range(
        claimed in 1.0f64..1e6,
        predicted in 0.0f64..2e6,
        threshold in 0.0f64..=100.0,
    ) {
        let s = scoring::score(claimed, predicted, threshold).unwrap();
        prop_assert!((0.0..=100.0).contains(&s.confidence));
        prop_assert_eq!(
            s.recommendation == Recommendation::Accept,
            s.confidence >= threshold
        );
    }
}
