//! Audit-trail rows for registry events.
//!
//! Every event drained from [`neel_registry::Registry::take_events`] is
//! flattened into one row: the searchable columns (`event_type`, subject,
//! `project_id`, `amount`) plus the full event as a JSON payload.

use chrono::Utc;
use neel_registry::RegistryEvent;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// An event ready to be written to the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub event_type: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub project_id: Option<String>,
    pub amount: Option<i64>,
    pub payload: String,
    pub timestamp: i64,
}

impl NewEvent {
    pub fn from_registry(event: &RegistryEvent, timestamp: i64) -> Result<Self> {
        let (kind, id) = event.subject();
        Ok(NewEvent {
            event_type: event.as_str().to_string(),
            entity_kind: kind.as_str().to_string(),
            entity_id: id.to_string(),
            project_id: event.project_id().map(str::to_string),
            amount: event
                .amount()
                .map(|credits| i64::try_from(credits).unwrap_or(i64::MAX)),
            payload: serde_json::to_string(event)?,
            timestamp,
        })
    }

    /// Convert a drained batch, stamping every row with the current time.
    pub fn batch(events: &[RegistryEvent]) -> Result<Vec<Self>> {
        let now = Utc::now().timestamp();
        events.iter().map(|e| Self::from_registry(e, now)).collect()
    }
}

/// An event row as read back from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub project_id: Option<String>,
    pub amount: Option<i64>,
    pub payload: String,
    pub timestamp: i64,
    pub created_at: i64,
}
