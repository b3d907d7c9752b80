//! Record trait and audit lifecycle fields.
//!
//! [`Record`] is the seam between a domain struct and the repository: table
//! name, column roster, value bindings, and the optional [`Audit`] block the
//! lifecycle hooks operate on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RepoResult;
use crate::id::{Key, KeyGenerators, KeyKind};
use crate::row::FromRow;
use crate::value::Value;

/// A persistable entity.
pub trait Record: FromRow + Send + Sync {
    /// Table name. Must be a valid SQL identifier.
    const TABLE: &'static str;

    /// Columns selected by find/count statements, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Primary-key column.
    const ID_COLUMN: &'static str = "id";

    /// The current primary key, if assigned.
    fn key(&self) -> Option<Key>;

    /// Column bindings for INSERT, in column order.
    fn insert_values(&self) -> Vec<(&'static str, Value)>;

    /// Column bindings for UPDATE SET, in column order. Usually the insert
    /// bindings minus the id column.
    fn update_values(&self) -> Vec<(&'static str, Value)>;

    /// Audit block, when the record carries one. Records without audit
    /// fields return `None` and skip the lifecycle hooks.
    fn audit_mut(&mut self) -> Option<&mut Audit> {
        None
    }
}

/// Common audit fields: generated id, creation/update stamps, principals.
///
/// Embed this in a record struct and expose it via [`Record::audit_mut`];
/// the repository applies [`Audit::touch_created`] before INSERT and
/// [`Audit::touch_updated`] before UPDATE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: Option<Key>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl Audit {
    /// Stamp creation metadata and assign a fresh key when none is set.
    ///
    /// When the id is already assigned the call degrades to
    /// [`Audit::touch_updated`]: the caller is re-saving an existing record,
    /// not creating one.
    pub fn touch_created(
        &mut self,
        principal: &str,
        generators: &KeyGenerators,
        kind: KeyKind,
    ) -> RepoResult<()> {
        self.created_at = Some(Utc::now());
        self.created_by = Some(principal.to_string());
        if self.id.is_some() {
            self.touch_updated(principal);
            return Ok(());
        }
        self.id = Some(generators.generate(kind)?);
        Ok(())
    }

    /// Stamp update metadata.
    pub fn touch_updated(&mut self, principal: &str) {
        self.updated_at = Some(Utc::now());
        self.updated_by = Some(principal.to_string());
    }

    /// Column bindings for the five audit columns, None mapped to NULL.
    pub fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.as_ref().map(Value::from).unwrap_or(Value::Null)),
            ("created_at", self.created_at.into()),
            ("updated_at", self.updated_at.into()),
            ("created_by", self.created_by.clone().into()),
            ("updated_by", self.updated_by.clone().into()),
        ]
    }
}
