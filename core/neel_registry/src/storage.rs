//! # Storage
//!
//! The entity store holds every record of the registry:
//!
//! | Kind           | Record            | Id example  |
//! |----------------|-------------------|-------------|
//! | `Account`      | [`Account`]       | `ACC-001`   |
//! | `Project`      | [`Project`]       | `PRJ-001`   |
//! | `Acva`         | [`Acva`]          | `ACVA-001`  |
//! | `Validation`   | [`Validation`]    | `VAL-001`   |
//! | `Verification` | [`Verification`]  | `VER-001`   |
//!
//! [`EntityStore`] is the object-safe seam a persistent backend implements:
//! untyped [`Record`]s keyed by `(EntityKind, id)`. Typed access
//! (`get::<Project>`, `list_where::<Account, _>`) comes for free from
//! [`EntityStoreExt`].
//!
//! The store performs no referential checks. The transition engine does.
//!
//! ## Batches
//!
//! A transition touching several records commits them through
//! [`EntityStore::upsert_all`]. The default implementation writes one by one,
//! which is all-or-nothing for an infallible in-memory map. Backends that can
//! fail part-way must override it with a real transaction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Account, Acva, Project, Validation, Verification};
use crate::{Error, Result};

/// Discriminant of the five record types.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Project,
    Acva,
    Validation,
    Verification,
}

impl EntityKind {
    /// Short identifier suitable for storage columns and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Project => "project",
            Self::Acva => "acva",
            Self::Validation => "validation",
            Self::Verification => "verification",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any stored record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Account(Account),
    Project(Project),
    Acva(Acva),
    Validation(Validation),
    Verification(Verification),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Account(_) => EntityKind::Account,
            Self::Project(_) => EntityKind::Project,
            Self::Acva(_) => EntityKind::Acva,
            Self::Validation(_) => EntityKind::Validation,
            Self::Verification(_) => EntityKind::Verification,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Account(r) => &r.id,
            Self::Project(r) => &r.id,
            Self::Acva(r) => &r.id,
            Self::Validation(r) => &r.id,
            Self::Verification(r) => &r.id,
        }
    }
}

/// A typed record that can round-trip through [`Record`].
pub trait Entity: Clone + Into<Record> {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Unwrap a record of the matching kind; `None` for any other kind.
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! impl_entity {
    ($ty:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn id(&self) -> &str {
                &self.id
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Record {
            fn from(value: $ty) -> Self {
                Record::$ty(value)
            }
        }
    };
}

impl_entity!(Account);
impl_entity!(Project);
impl_entity!(Acva);
impl_entity!(Validation);
impl_entity!(Verification);

/// Storage backend for registry records.
pub trait EntityStore {
    /// Fetch one record, or `None` if `(kind, id)` is absent.
    fn get_record(&self, kind: EntityKind, id: &str) -> Option<Record>;

    /// All records of `kind`, ordered by id.
    fn list_records(&self, kind: EntityKind) -> Vec<Record>;

    /// Insert or replace a record.
    fn upsert_record(&mut self, record: Record);

    /// Insert or replace several records as one unit.
    fn upsert_all(&mut self, records: Vec<Record>) {
        for record in records {
            self.upsert_record(record);
        }
    }
}

/// Typed helpers over any [`EntityStore`].
pub trait EntityStoreExt: EntityStore {
    /// Fetch a typed record. Fails with [`Error::NotFound`] on a miss.
    fn get<T: Entity>(&self, id: &str) -> Result<T> {
        self.get_record(T::KIND, id)
            .and_then(T::from_record)
            .ok_or_else(|| Error::not_found(T::KIND, id))
    }

    fn contains<T: Entity>(&self, id: &str) -> bool {
        self.get_record(T::KIND, id).is_some()
    }

    fn list<T: Entity>(&self) -> Vec<T> {
        self.list_records(T::KIND)
            .into_iter()
            .filter_map(T::from_record)
            .collect()
    }

    fn list_where<T, F>(&self, filter: F) -> Vec<T>
    where
        T: Entity,
        F: Fn(&T) -> bool,
    {
        self.list_records(T::KIND)
            .into_iter()
            .filter_map(T::from_record)
            .filter(|r| filter(r))
            .collect()
    }

    fn upsert<T: Entity>(&mut self, entity: T) {
        self.upsert_record(entity.into());
    }
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {}

// ── In-memory backend ────────────────────────────────────────────────

/// Ordered in-memory store. Cloning it gives a consistent snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    tables: BTreeMap<EntityKind, BTreeMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of `kind`.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(BTreeMap::is_empty)
    }
}

impl EntityStore for MemoryStore {
    fn get_record(&self, kind: EntityKind, id: &str) -> Option<Record> {
        self.tables.get(&kind)?.get(id).cloned()
    }

    fn list_records(&self, kind: EntityKind) -> Vec<Record> {
        self.tables
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default()
    }

    fn upsert_record(&mut self, record: Record) {
        self.tables
            .entry(record.kind())
            .or_default()
            .insert(record.id().to_string(), record);
    }
}

impl<T: Entity> Extend<T> for MemoryStore {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entity in iter {
            self.upsert(entity);
        }
    }
}
