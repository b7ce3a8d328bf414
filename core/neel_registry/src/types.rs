//! # Types
//!
//! Entity records held by the registry and the closed status enumerations
//! that drive the transition engine.
//!
//! ## Lifecycles
//!
//! ```text
//! KycStatus:           Pending ──► InProcess ──► Done
//!                         │            │
//!                         └────────────┴──► Rejected
//!
//! ProjectStatus:       Pending ──► Active ──► Completed
//!
//! AcvaStatus:          Pending ──► Active ◄──► Suspended
//!
//! ValidationStatus:    Pending ──► Approved | Rejected
//! VerificationStatus:  Pending ──► Approved | Rejected
//! ```
//!
//! `Done`, `Rejected`, `Completed`, `Approved` are terminal. A rejected
//! validation or verification is never reopened; the project resubmits by
//! opening a fresh record.
//!
//! Records reference each other by id only. The store owns every record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Status enumerations ──────────────────────────────────────────────

/// Know-your-customer review state of an [`Account`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// Submitted, not yet picked up by a reviewer.
    Pending,
    /// Under review.
    InProcess,
    /// Approved.
    Done,
    /// Refused. Terminal.
    Rejected,
}

impl KycStatus {
    /// `true` while a KYC decision can still be taken.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProcess)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    ProjectProponent,
    Trader,
}

/// Lifecycle status of a carbon-removal project.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Registered; awaiting an approved validation.
    Pending,
    /// Validated; verification cycles issue credits.
    Active,
    /// Crediting period closed.
    Completed,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAssessment {
    Low,
    Medium,
    High,
}

/// Accreditation status of an [`Acva`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcvaStatus {
    Pending,
    Active,
    Suspended,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Reviewer decision on a KYC, validation or verification.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

/// Sort and dedup an id list so it can be binary-searched.
pub(crate) fn normalize_ids(ids: &mut Vec<String>) {
    ids.sort_unstable();
    ids.dedup();
}

// ── Accounts ─────────────────────────────────────────────────────────

/// A registered organisation: project proponent or credit trader.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub company_name: String,
    pub account_type: AccountType,
    pub kyc_status: KycStatus,
    /// Projects owned by this account. Kept sorted and unique.
    pub project_ids: Vec<String>,
    pub kyc_document: String,
    pub email: String,
    pub registration_date: NaiveDate,
}

impl Account {
    /// Link `project_id` to this account. Returns `false` if already linked.
    pub fn link_project(&mut self, project_id: &str) -> bool {
        match self.project_ids.binary_search_by(|p| p.as_str().cmp(project_id)) {
            Ok(_) => false,
            Err(pos) => {
                self.project_ids.insert(pos, project_id.to_string());
                true
            }
        }
    }
}

// ── Projects ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Completed,
    Pending,
}

/// One entry of a project's timeline. Entries are kept in insertion order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub event: String,
    pub credits_issued: Option<u64>,
    pub acva_id: Option<String>,
    pub status: MilestoneStatus,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Project area in hectares.
    pub area: u32,
    pub methodology: String,
    pub documentation: Vec<String>,
    pub ownership: String,
    pub coordinates: Coordinates,
}

/// A carbon-removal project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Owning [`Account`].
    pub account_id: String,
    pub status: ProjectStatus,
    /// Credits issued to date.
    pub credits_issued: u64,
    /// Risk-reserve credits withheld from issuance.
    pub buffer_credits: u64,
    pub risk_assessment: RiskAssessment,
    pub start_date: NaiveDate,
    pub country: String,
    pub timeline: Vec<TimelineEntry>,
    pub metadata: ProjectMetadata,
}

// ── ACVAs ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

/// Accredited Carbon Validation Agency.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Acva {
    pub id: String,
    pub agency_name: String,
    pub country: String,
    pub status: AcvaStatus,
    /// Projects this agency may validate or verify. Sorted and unique.
    pub projects_assigned: Vec<String>,
    pub accreditation_docs: Vec<String>,
    pub contact_info: ContactInfo,
}

impl Acva {
    pub fn is_assigned(&self, project_id: &str) -> bool {
        self.projects_assigned
            .binary_search_by(|p| p.as_str().cmp(project_id))
            .is_ok()
    }

    /// Assign `project_id`. Returns `false` if already assigned.
    pub fn assign(&mut self, project_id: &str) -> bool {
        match self
            .projects_assigned
            .binary_search_by(|p| p.as_str().cmp(project_id))
        {
            Ok(_) => false,
            Err(pos) => {
                self.projects_assigned.insert(pos, project_id.to_string());
                true
            }
        }
    }
}

// ── Validation / Verification ────────────────────────────────────────

/// One-time review of a project design document (PDD).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub id: String,
    pub project_id: String,
    pub account_id: String,
    pub acva_id: String,
    pub status: ValidationStatus,
    pub pdd_document: String,
    /// ACVA report; a decision cannot be taken without it.
    pub validation_report: Option<String>,
    pub start_date: NaiveDate,
    pub submission_date: NaiveDate,
}

/// One verification cycle of an active project.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub id: String,
    pub project_id: String,
    pub account_id: String,
    pub acva_id: String,
    /// Cycles approved before this record was resolved.
    pub cycles_done: u32,
    pub status: VerificationStatus,
    pub credits_recommended: u64,
    pub buffer_credits_deducted: u64,
    pub verification_report: Option<String>,
    pub verification_date: NaiveDate,
}

impl Verification {
    /// The cycle under verification (`cycles_done + 1`).
    pub fn current_cycle(&self) -> u32 {
        self.cycles_done.saturating_add(1)
    }
}

// ── Derived views ────────────────────────────────────────────────────

/// Dashboard totals. Always recomputed from the store, never persisted.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: u64,
    pub total_carbon_removed: u64,
    pub total_credits_issued: u64,
    pub total_buffer_credits: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Kyc,
    Validation,
    Verification,
    Credits,
}

/// A header counter (pending KYCs, pending validations, ...).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub count: u64,
}
