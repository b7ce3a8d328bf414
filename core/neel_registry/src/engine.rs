//! # Transition engine
//!
//! [`Registry`] is the only writer of the store. Each entry point follows the
//! same shape:
//!
//! 1. load the records involved (`NotFound` for the subject,
//!    `IntegrityViolation` for a dangling reference);
//! 2. ask [`lifecycle`] whether the move is legal (`InvalidState`) and check
//!    required artifacts (`PreconditionFailed`);
//! 3. build the new record versions;
//! 4. commit them with one [`EntityStore::upsert_all`] and queue events.
//!
//! Nothing is written before step 4, so a failed call leaves the store and
//! the event queue exactly as they were.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::RegistryEvent;
use crate::lifecycle::{self, KycAction, ProjectAction};
use crate::stats;
use crate::storage::{Entity, EntityKind, EntityStore, EntityStoreExt, MemoryStore, Record};
use crate::types::{
    normalize_ids, Account, Acva, AcvaStatus, DashboardStats, Decision, MilestoneStatus,
    Notification, Project, ProjectStatus, TimelineEntry, Validation, ValidationStatus,
    Verification, VerificationStatus,
};
use crate::{Error, Result};

// ─────────────────────────────────────────────────────────
// Outcomes and requests
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AcvaStatusChange {
    pub acva: Acva,
    /// Pending validations and verifications the agency still holds.
    /// Non-zero only when suspending; the suspension goes through anyway.
    pub open_assignments: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub validation: Validation,
    /// The activated project, present only on approval.
    pub project: Option<Project>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerificationOutcome {
    pub verification: Verification,
    /// The credited project, present only on approval.
    pub project: Option<Project>,
    /// Requested buffer deduction that exceeded the project's balance.
    /// The balance is clamped at zero; this is the part that was not taken.
    pub buffer_shortfall: u64,
}

/// A design document submitted for validation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewValidation {
    pub id: String,
    pub project_id: String,
    pub acva_id: String,
    pub pdd_document: String,
    pub validation_report: Option<String>,
    pub start_date: NaiveDate,
    pub submission_date: NaiveDate,
}

/// A monitoring claim submitted for the project's next verification cycle.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewVerification {
    pub id: String,
    pub project_id: String,
    pub acva_id: String,
    pub credits_recommended: u64,
    pub buffer_credits_deducted: u64,
    pub verification_report: Option<String>,
    pub verification_date: NaiveDate,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ─────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────

/// The carbon-credit registry: an entity store plus checked transitions.
#[derive(Clone, Debug)]
pub struct Registry<S = MemoryStore> {
    store: S,
    events: Vec<RegistryEvent>,
    clock: fn() -> NaiveDate,
}

impl Default for Registry<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: EntityStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            events: Vec::new(),
            clock: today,
        }
    }

    /// Replace the clock used to date timeline entries.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Drain the events published since the last call.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get<T: Entity>(&self, id: &str) -> Result<T> {
        self.store.get(id)
    }

    pub fn list<T: Entity>(&self) -> Vec<T> {
        self.store.list()
    }

    pub fn list_where<T, F>(&self, filter: F) -> Vec<T>
    where
        T: Entity,
        F: Fn(&T) -> bool,
    {
        self.store.list_where(filter)
    }

    pub fn stats(&self) -> DashboardStats {
        stats::compute_stats(&self.store)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        stats::notifications(&self.store)
    }

    // ── Onboarding ───────────────────────────────────────────────────

    /// Register a new account. Every listed project must already exist and
    /// be owned by this account.
    pub fn register_account(&mut self, mut account: Account) -> Result<Account> {
        self.ensure_absent::<Account>(&account.id)?;
        normalize_ids(&mut account.project_ids);
        for project_id in &account.project_ids {
            let project: Project =
                self.referenced(EntityKind::Account, &account.id, project_id)?;
            if project.account_id != account.id {
                return Err(Error::integrity(
                    EntityKind::Account,
                    &account.id,
                    EntityKind::Project,
                    project_id,
                ));
            }
        }

        info!("Account {} registered", account.id);
        self.commit(
            vec![account.clone().into()],
            vec![RegistryEvent::AccountRegistered {
                account_id: account.id.clone(),
            }],
        );
        Ok(account)
    }

    /// Register a project and link it to its owning account.
    pub fn register_project(&mut self, project: Project) -> Result<Project> {
        self.ensure_absent::<Project>(&project.id)?;
        let mut account: Account =
            self.referenced(EntityKind::Project, &project.id, &project.account_id)?;
        account.link_project(&project.id);

        info!(
            "Project {} registered under account {}",
            project.id, project.account_id
        );
        self.commit(
            vec![account.into(), project.clone().into()],
            vec![RegistryEvent::ProjectRegistered {
                project_id: project.id.clone(),
                account_id: project.account_id.clone(),
            }],
        );
        Ok(project)
    }

    /// Register an accredited agency. Assigned projects must exist.
    pub fn register_acva(&mut self, mut acva: Acva) -> Result<Acva> {
        self.ensure_absent::<Acva>(&acva.id)?;
        normalize_ids(&mut acva.projects_assigned);
        for project_id in &acva.projects_assigned {
            self.referenced::<Project>(EntityKind::Acva, &acva.id, project_id)?;
        }

        info!("ACVA {} registered", acva.id);
        self.commit(
            vec![acva.clone().into()],
            vec![RegistryEvent::AcvaRegistered {
                acva_id: acva.id.clone(),
            }],
        );
        Ok(acva)
    }

    // ── KYC ──────────────────────────────────────────────────────────

    /// Pick up a pending KYC: `Pending -> InProcess`.
    pub fn begin_kyc_review(&mut self, account_id: &str) -> Result<Account> {
        let mut account: Account = self.store.get(account_id)?;
        account.kyc_status = lifecycle::kyc_next(account.kyc_status, KycAction::BeginReview)
            .ok_or_else(|| {
                Error::invalid_state(EntityKind::Account, account_id, account.kyc_status)
            })?;

        info!("KYC review started for account {account_id}");
        self.commit(
            vec![account.clone().into()],
            vec![RegistryEvent::KycReviewStarted {
                account_id: account.id.clone(),
            }],
        );
        Ok(account)
    }

    /// Decide a KYC. Only `Pending` and `InProcess` accounts can be decided.
    pub fn review_kyc(&mut self, account_id: &str, decision: Decision) -> Result<Account> {
        let mut account: Account = self.store.get(account_id)?;
        account.kyc_status = lifecycle::kyc_next(account.kyc_status, KycAction::Decide(decision))
            .ok_or_else(|| {
                Error::invalid_state(EntityKind::Account, account_id, account.kyc_status)
            })?;

        info!(
            "KYC for account {account_id} decided: {decision:?} -> {:?}",
            account.kyc_status
        );
        self.commit(
            vec![account.clone().into()],
            vec![RegistryEvent::KycReviewed {
                account_id: account.id.clone(),
                decision,
                status: account.kyc_status,
            }],
        );
        Ok(account)
    }

    // ── ACVAs ────────────────────────────────────────────────────────

    /// Activate or suspend an agency.
    ///
    /// Suspending an agency that still holds pending validations or
    /// verifications is allowed; the count is logged and returned so the
    /// caller can reassign the work.
    pub fn set_acva_status(
        &mut self,
        acva_id: &str,
        target: AcvaStatus,
    ) -> Result<AcvaStatusChange> {
        let mut acva: Acva = self.store.get(acva_id)?;
        let from = acva.status;
        if !lifecycle::acva_allows(from, target) {
            return Err(Error::invalid_state(EntityKind::Acva, acva_id, from));
        }

        let open_assignments = if target == AcvaStatus::Suspended {
            self.open_assignments(acva_id)
        } else {
            0
        };
        if open_assignments > 0 {
            warn!("Suspending ACVA {acva_id} with {open_assignments} unresolved assignment(s)");
        }

        acva.status = target;
        info!("ACVA {acva_id} status changed: {from:?} -> {target:?}");
        self.commit(
            vec![acva.clone().into()],
            vec![RegistryEvent::AcvaStatusChanged {
                acva_id: acva.id.clone(),
                from,
                to: target,
                open_assignments,
            }],
        );
        Ok(AcvaStatusChange {
            acva,
            open_assignments,
        })
    }

    /// Assign an active agency to a project. Re-assigning is a no-op.
    pub fn assign_acva(&mut self, acva_id: &str, project_id: &str) -> Result<Acva> {
        let mut acva: Acva = self.store.get(acva_id)?;
        if acva.status != AcvaStatus::Active {
            return Err(Error::invalid_state(EntityKind::Acva, acva_id, acva.status));
        }
        self.referenced::<Project>(EntityKind::Acva, acva_id, project_id)?;

        if acva.assign(project_id) {
            info!("ACVA {acva_id} assigned to project {project_id}");
            self.commit(
                vec![acva.clone().into()],
                vec![RegistryEvent::AcvaAssigned {
                    acva_id: acva.id.clone(),
                    project_id: project_id.to_string(),
                }],
            );
        }
        Ok(acva)
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Open a validation for a pending project.
    ///
    /// At most one validation per project may be pending; after a rejection
    /// the project resubmits through this call with a fresh id.
    pub fn submit_validation(&mut self, request: NewValidation) -> Result<Validation> {
        self.ensure_absent::<Validation>(&request.id)?;
        let project: Project =
            self.referenced(EntityKind::Validation, &request.id, &request.project_id)?;
        if project.status != ProjectStatus::Pending {
            return Err(Error::invalid_state(
                EntityKind::Project,
                &project.id,
                project.status,
            ));
        }
        if let Some(open) = self
            .store
            .list_where::<Validation, _>(|v| {
                v.project_id == project.id && v.status == ValidationStatus::Pending
            })
            .into_iter()
            .next()
        {
            return Err(Error::invalid_state(
                EntityKind::Validation,
                &open.id,
                open.status,
            ));
        }
        self.check_agency(EntityKind::Validation, &request.id, &request.acva_id, &project.id)?;

        let validation = Validation {
            id: request.id,
            project_id: project.id.clone(),
            account_id: project.account_id.clone(),
            acva_id: request.acva_id,
            status: ValidationStatus::Pending,
            pdd_document: request.pdd_document,
            validation_report: request.validation_report,
            start_date: request.start_date,
            submission_date: request.submission_date,
        };

        info!(
            "Validation {} opened for project {}",
            validation.id, validation.project_id
        );
        self.commit(
            vec![validation.clone().into()],
            vec![RegistryEvent::ValidationSubmitted {
                validation_id: validation.id.clone(),
                project_id: validation.project_id.clone(),
                acva_id: validation.acva_id.clone(),
            }],
        );
        Ok(validation)
    }

    /// Attach the agency's report to a pending validation.
    pub fn attach_validation_report(
        &mut self,
        validation_id: &str,
        report: &str,
    ) -> Result<Validation> {
        if report.trim().is_empty() {
            return Err(Error::InvalidInput("report reference must not be empty"));
        }
        let mut validation: Validation = self.store.get(validation_id)?;
        if validation.status != ValidationStatus::Pending {
            return Err(Error::invalid_state(
                EntityKind::Validation,
                validation_id,
                validation.status,
            ));
        }
        validation.validation_report = Some(report.to_string());

        debug!("Report attached to validation {validation_id}");
        self.commit(
            vec![validation.clone().into()],
            vec![RegistryEvent::ValidationReportAttached {
                validation_id: validation.id.clone(),
                project_id: validation.project_id.clone(),
            }],
        );
        Ok(validation)
    }

    /// Approve or reject a pending validation.
    ///
    /// Approval moves the project `Pending -> Active`. Rejection leaves the
    /// project pending so a new validation can be opened.
    pub fn resolve_validation(
        &mut self,
        validation_id: &str,
        decision: Decision,
    ) -> Result<ValidationOutcome> {
        let mut validation: Validation = self.store.get(validation_id)?;
        let next = lifecycle::validation_next(validation.status, decision).ok_or_else(|| {
            Error::invalid_state(EntityKind::Validation, validation_id, validation.status)
        })?;
        if validation.validation_report.is_none() {
            return Err(Error::precondition(
                EntityKind::Validation,
                validation_id,
                "validation_report",
            ));
        }
        let mut project: Project =
            self.referenced(EntityKind::Validation, validation_id, &validation.project_id)?;
        self.referenced::<Acva>(EntityKind::Validation, validation_id, &validation.acva_id)?;

        validation.status = next;
        let mut events = vec![RegistryEvent::ValidationResolved {
            validation_id: validation.id.clone(),
            project_id: project.id.clone(),
            decision,
        }];

        let project = match decision {
            Decision::Approve => {
                project.status = lifecycle::project_next(project.status, ProjectAction::Activate)
                    .ok_or_else(|| {
                        Error::invalid_state(EntityKind::Project, &project.id, project.status)
                    })?;
                project.timeline.push(TimelineEntry {
                    date: (self.clock)(),
                    event: "Validation Completed".to_string(),
                    credits_issued: Some(0),
                    acva_id: Some(validation.acva_id.clone()),
                    status: MilestoneStatus::Completed,
                });
                events.push(RegistryEvent::ProjectActivated {
                    project_id: project.id.clone(),
                    validation_id: validation.id.clone(),
                });
                Some(project)
            }
            Decision::Reject => None,
        };

        info!(
            "Validation {validation_id} for project {} resolved: {decision:?}",
            validation.project_id
        );
        let mut records: Vec<Record> = vec![validation.clone().into()];
        records.extend(project.clone().map(Record::from));
        self.commit(records, events);

        Ok(ValidationOutcome {
            validation,
            project,
        })
    }

    // ── Verification ─────────────────────────────────────────────────

    /// Open a verification for the next cycle of an active project.
    ///
    /// The cycle is derived from the project's verification history, so a
    /// resubmission after a rejection verifies the same cycle again.
    pub fn submit_verification(&mut self, request: NewVerification) -> Result<Verification> {
        self.ensure_absent::<Verification>(&request.id)?;
        let project: Project =
            self.referenced(EntityKind::Verification, &request.id, &request.project_id)?;
        if project.status != ProjectStatus::Active {
            return Err(Error::invalid_state(
                EntityKind::Project,
                &project.id,
                project.status,
            ));
        }

        let history = self
            .store
            .list_where::<Verification, _>(|v| v.project_id == project.id);
        if let Some(open) = history
            .iter()
            .find(|v| v.status == VerificationStatus::Pending)
        {
            return Err(Error::invalid_state(
                EntityKind::Verification,
                &open.id,
                open.status,
            ));
        }
        self.check_agency(EntityKind::Verification, &request.id, &request.acva_id, &project.id)?;

        // Approved records carry their post-approval count, so the maximum is
        // the number of cycles completed so far.
        let cycles_done = history.iter().map(|v| v.cycles_done).max().unwrap_or(0);

        let verification = Verification {
            id: request.id,
            project_id: project.id.clone(),
            account_id: project.account_id.clone(),
            acva_id: request.acva_id,
            cycles_done,
            status: VerificationStatus::Pending,
            credits_recommended: request.credits_recommended,
            buffer_credits_deducted: request.buffer_credits_deducted,
            verification_report: request.verification_report,
            verification_date: request.verification_date,
        };

        info!(
            "Verification {} opened for project {} cycle {}",
            verification.id,
            verification.project_id,
            verification.current_cycle()
        );
        self.commit(
            vec![verification.clone().into()],
            vec![RegistryEvent::VerificationSubmitted {
                verification_id: verification.id.clone(),
                project_id: verification.project_id.clone(),
                cycle: verification.current_cycle(),
            }],
        );
        Ok(verification)
    }

    /// Attach the agency's report to a pending verification.
    pub fn attach_verification_report(
        &mut self,
        verification_id: &str,
        report: &str,
    ) -> Result<Verification> {
        if report.trim().is_empty() {
            return Err(Error::InvalidInput("report reference must not be empty"));
        }
        let mut verification: Verification = self.store.get(verification_id)?;
        if verification.status != VerificationStatus::Pending {
            return Err(Error::invalid_state(
                EntityKind::Verification,
                verification_id,
                verification.status,
            ));
        }
        verification.verification_report = Some(report.to_string());

        debug!("Report attached to verification {verification_id}");
        self.commit(
            vec![verification.clone().into()],
            vec![RegistryEvent::VerificationReportAttached {
                verification_id: verification.id.clone(),
                project_id: verification.project_id.clone(),
            }],
        );
        Ok(verification)
    }

    /// Approve or reject a pending verification.
    ///
    /// Approval issues `credits_recommended` to the project, deducts
    /// `buffer_credits_deducted` from its buffer (clamped at zero, the
    /// shortfall is reported) and completes the cycle. Rejection leaves the
    /// project untouched.
    pub fn resolve_verification(
        &mut self,
        verification_id: &str,
        decision: Decision,
    ) -> Result<VerificationOutcome> {
        let mut verification: Verification = self.store.get(verification_id)?;
        let next = lifecycle::verification_next(verification.status, decision).ok_or_else(|| {
            Error::invalid_state(
                EntityKind::Verification,
                verification_id,
                verification.status,
            )
        })?;
        if verification.verification_report.is_none() {
            return Err(Error::precondition(
                EntityKind::Verification,
                verification_id,
                "verification_report",
            ));
        }
        let mut project: Project = self.referenced(
            EntityKind::Verification,
            verification_id,
            &verification.project_id,
        )?;
        self.referenced::<Acva>(EntityKind::Verification, verification_id, &verification.acva_id)?;

        let cycle = verification.current_cycle();
        verification.status = next;
        let mut events = vec![RegistryEvent::VerificationResolved {
            verification_id: verification.id.clone(),
            project_id: project.id.clone(),
            decision,
            cycle,
        }];

        let mut buffer_shortfall = 0;
        let project = match decision {
            Decision::Approve => {
                if project.status != ProjectStatus::Active {
                    return Err(Error::invalid_state(
                        EntityKind::Project,
                        &project.id,
                        project.status,
                    ));
                }

                let credits = verification.credits_recommended;
                let deducted = verification.buffer_credits_deducted;
                buffer_shortfall = deducted.saturating_sub(project.buffer_credits);
                if buffer_shortfall > 0 {
                    warn!(
                        "Buffer deduction {deducted} exceeds project {} balance {}; \
                         clamped to zero (shortfall {buffer_shortfall})",
                        project.id, project.buffer_credits
                    );
                }
                project.credits_issued = project.credits_issued.saturating_add(credits);
                project.buffer_credits = project.buffer_credits.saturating_sub(deducted);
                project.timeline.push(TimelineEntry {
                    date: (self.clock)(),
                    event: format!("Verification Cycle {cycle}"),
                    credits_issued: Some(credits),
                    acva_id: Some(verification.acva_id.clone()),
                    status: MilestoneStatus::Completed,
                });
                verification.cycles_done = verification.cycles_done.saturating_add(1);

                events.push(RegistryEvent::CreditsIssued {
                    project_id: project.id.clone(),
                    verification_id: verification.id.clone(),
                    credits,
                    buffer_deducted: deducted - buffer_shortfall,
                    buffer_shortfall,
                });
                Some(project)
            }
            Decision::Reject => None,
        };

        info!(
            "Verification {verification_id} for project {} cycle {cycle} resolved: {decision:?}",
            verification.project_id
        );
        let mut records: Vec<Record> = vec![verification.clone().into()];
        records.extend(project.clone().map(Record::from));
        self.commit(records, events);

        Ok(VerificationOutcome {
            verification,
            project,
            buffer_shortfall,
        })
    }

    // ── Closure ──────────────────────────────────────────────────────

    /// Close an active project's crediting period: `Active -> Completed`.
    pub fn complete_project(&mut self, project_id: &str) -> Result<Project> {
        let mut project: Project = self.store.get(project_id)?;
        project.status = lifecycle::project_next(project.status, ProjectAction::Complete)
            .ok_or_else(|| Error::invalid_state(EntityKind::Project, project_id, project.status))?;
        project.timeline.push(TimelineEntry {
            date: (self.clock)(),
            event: "Project Completed".to_string(),
            credits_issued: None,
            acva_id: None,
            status: MilestoneStatus::Completed,
        });

        info!("Project {project_id} completed");
        self.commit(
            vec![project.clone().into()],
            vec![RegistryEvent::ProjectCompleted {
                project_id: project.id.clone(),
            }],
        );
        Ok(project)
    }

    // ─────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────

    fn commit(&mut self, records: Vec<Record>, events: Vec<RegistryEvent>) {
        self.store.upsert_all(records);
        self.events.extend(events);
    }

    fn ensure_absent<T: Entity>(&self, id: &str) -> Result<()> {
        if self.store.contains::<T>(id) {
            return Err(Error::AlreadyExists {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Load a record referenced by `(kind, id)`; a miss is an integrity
    /// violation of the referencing record, not a plain `NotFound`.
    fn referenced<T: Entity>(&self, kind: EntityKind, id: &str, target_id: &str) -> Result<T> {
        self.store
            .get(target_id)
            .map_err(|_| Error::integrity(kind, id, T::KIND, target_id))
    }

    /// The agency must exist, be active and be assigned to the project.
    fn check_agency(
        &self,
        kind: EntityKind,
        id: &str,
        acva_id: &str,
        project_id: &str,
    ) -> Result<()> {
        let acva: Acva = self.referenced(kind, id, acva_id)?;
        if acva.status != AcvaStatus::Active {
            return Err(Error::invalid_state(EntityKind::Acva, acva_id, acva.status));
        }
        if !acva.is_assigned(project_id) {
            return Err(Error::precondition(EntityKind::Acva, acva_id, "project assignment"));
        }
        Ok(())
    }

    fn open_assignments(&self, acva_id: &str) -> u32 {
        let validations = self
            .store
            .list_where::<Validation, _>(|v| {
                v.acva_id == acva_id && v.status == ValidationStatus::Pending
            })
            .len();
        let verifications = self
            .store
            .list_where::<Verification, _>(|v| {
                v.acva_id == acva_id && v.status == VerificationStatus::Pending
            })
            .len();
        u32::try_from(validations + verifications).unwrap_or(u32::MAX)
    }
}
