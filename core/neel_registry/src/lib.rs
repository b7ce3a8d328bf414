// core/neel_registry/src/lib.rs

//! # Neel Ledger Registry
//!
//! Domain model behind the Neel Ledger carbon-credit registry dashboard.
//! The [`Registry`] owns an [`EntityStore`] and exposes every admin action as
//! a checked status transition:
//!
//! | Phase          | Entry Point(s)                                                  |
//! |----------------|-----------------------------------------------------------------|
//! | Onboarding     | `register_account`, `register_project`, `register_acva`         |
//! | KYC            | [`Registry::begin_kyc_review`], [`Registry::review_kyc`]        |
//! | Accreditation  | [`Registry::set_acva_status`], `assign_acva`                    |
//! | Validation     | `submit_validation`, `attach_validation_report`, `resolve_validation` |
//! | Verification   | `submit_verification`, `attach_verification_report`, `resolve_verification` |
//! | Closure        | `complete_project`                                              |
//! | Queries        | `get`, `list`, `list_where`, `stats`, `notifications`           |
//!
//! ## Architecture
//!
//! Storage is fully delegated to [`storage`]; the store is dumb and never
//! checks references. Legality of every status change lives in the tables in
//! [`lifecycle`]. [`engine`] reads, checks, then commits all related records
//! in a single [`EntityStore::upsert_all`] call, so a failed transition leaves
//! the store untouched. Dashboard totals come from [`stats`] and the XAI
//! confidence stub from [`scoring`]; neither mutates anything.
//!
//! Every committed transition publishes [`RegistryEvent`]s. Callers drain
//! them with [`Registry::take_events`].

mod engine;
mod events;
pub mod fixtures;
pub mod lifecycle;
pub mod scoring;
pub mod stats;
pub mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_properties;

use std::fmt::Debug;

pub use engine::{
    AcvaStatusChange, NewValidation, NewVerification, Registry, ValidationOutcome,
    VerificationOutcome,
};
pub use events::RegistryEvent;
pub use scoring::{ConfidenceScorer, FeatureImportance, Recommendation, Score};
pub use storage::{Entity, EntityKind, EntityStore, EntityStoreExt, MemoryStore, Record};
pub use types::*;

/// Errors returned by registry operations.
///
/// Every variant names the entity involved. None of them is fatal: the
/// store is unchanged after any failed call.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    #[error("{kind} {id}: action not allowed in state {state}")]
    InvalidState {
        kind: EntityKind,
        id: String,
        state: String,
    },

    #[error("{kind} {id}: missing {missing}")]
    PreconditionFailed {
        kind: EntityKind,
        id: String,
        missing: &'static str,
    },

    #[error("{kind} {id}: broken reference to {target_kind} {target_id}")]
    IntegrityViolation {
        kind: EntityKind,
        id: String,
        target_kind: EntityKind,
        target_id: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

impl Error {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_state(kind: EntityKind, id: &str, state: impl Debug) -> Self {
        Self::InvalidState {
            kind,
            id: id.to_string(),
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn precondition(kind: EntityKind, id: &str, missing: &'static str) -> Self {
        Self::PreconditionFailed {
            kind,
            id: id.to_string(),
            missing,
        }
    }

    pub(crate) fn integrity(
        kind: EntityKind,
        id: &str,
        target_kind: EntityKind,
        target_id: &str,
    ) -> Self {
        Self::IntegrityViolation {
            kind,
            id: id.to_string(),
            target_kind,
            target_id: target_id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
