//! Ordered WHERE-clause composition.
//!
//! A [`ClauseBuilder`] accumulates a literal transcript of the caller's
//! filter calls: condition entries bound to columns, interleaved with
//! explicit AND/OR connector markers. [`compile`] walks that transcript once,
//! left to right, and emits a parameterized WHERE fragment (with `?`
//! placeholders) plus its ordered argument list.
//!
//! # Example
//! ```ignore
//! use pgrepo::{clause, ClauseBuilder, ident};
//!
//! let entries = ClauseBuilder::new()
//!     .eq("status", "active")
//!     .and()
//!     .gte("age", 18)
//!     .or()
//!     .in_list("role", ["admin", "owner"])
//!     .build();
//!
//! let compiled = clause::compile(&entries, ident::snake_case)?.unwrap();
//! assert_eq!(compiled.sql, "status = ? AND age >= ? OR role IN (?)");
//! # Ok::<(), pgrepo::RepoError>(())
//! ```

use std::collections::HashMap;

use crate::condition::Condition;
use crate::error::{RepoError, RepoResult};
use crate::ident;
use crate::value::Value;

/// Logical connector between two adjacent conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    /// The SQL keyword for this connector.
    pub fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Reserved key marking an AND connector in the legacy map form.
///
/// The `$` prefix fails [`ident::is_safe_identifier`], so a reserved key can
/// never collide with a column name the compiler would accept.
pub const AND_KEY: &str = "$and";

/// Reserved key marking an OR connector in the legacy map form.
pub const OR_KEY: &str = "$or";

/// One element of an ordered clause sequence.
///
/// An entry is either a predicate (one or more column-bound conditions,
/// joined with AND locally) or a connector marker. Never both.
#[derive(Debug, Clone)]
pub enum ClauseEntry {
    /// Column-bound conditions forming one local fragment.
    Predicate(Vec<(String, Condition)>),
    /// A connector applying to the next join.
    Connector(Connector),
}

impl ClauseEntry {
    /// A single column-bound condition.
    pub fn cond(column: impl Into<String>, condition: Condition) -> Self {
        ClauseEntry::Predicate(vec![(column.into(), condition)])
    }

    /// A multi-column predicate; the pairs join with AND inside one fragment.
    pub fn predicate(pairs: Vec<(String, Condition)>) -> Self {
        ClauseEntry::Predicate(pairs)
    }

    /// Convert the legacy unordered map form into an entry.
    ///
    /// A single-entry map under [`AND_KEY`] or [`OR_KEY`] becomes a connector
    /// marker; anything else becomes a multi-column predicate. Join order
    /// among the map's columns is implementation-defined (hash-map iteration
    /// order) and must not be relied upon.
    pub fn from_map(map: HashMap<String, Condition>) -> Self {
        if map.len() == 1 {
            if map.contains_key(AND_KEY) {
                return ClauseEntry::Connector(Connector::And);
            }
            if map.contains_key(OR_KEY) {
                return ClauseEntry::Connector(Connector::Or);
            }
        }
        ClauseEntry::Predicate(map.into_iter().collect())
    }
}

/// A compiled WHERE fragment: `?`-placeholder SQL plus ordered arguments.
///
/// The caller appends `WHERE <sql>` to its statement and binds `args`
/// positionally (after [`crate::sql::expand`] for PostgreSQL `$n` numbering).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWhere {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Fluent builder accumulating an ordered clause sequence.
///
/// Methods append and return the builder; nothing validates at call time.
/// Degenerate placements (leading or doubled connectors) are resolved by
/// [`compile`], not here.
#[derive(Debug, Clone, Default)]
pub struct ClauseBuilder {
    entries: Vec<ClauseEntry>,
}

impl ClauseBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `column = ?`.
    pub fn eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::eq(value)))
    }

    /// Append `column != ?`.
    pub fn neq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::neq(value)))
    }

    /// Append `column < ?`.
    pub fn lt(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::lt(value)))
    }

    /// Append `column <= ?`.
    pub fn lte(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::lte(value)))
    }

    /// Append `column > ?`.
    pub fn gt(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::gt(value)))
    }

    /// Append `column >= ?`.
    pub fn gte(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::gte(value)))
    }

    /// Append `column LIKE ?`.
    pub fn like(&mut self, column: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::like(pattern)))
    }

    /// Append `column NOT LIKE ?`.
    pub fn not_like(
        &mut self,
        column: impl Into<String>,
        pattern: impl Into<String>,
    ) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::not_like(pattern)))
    }

    /// Append `column IN (?)`.
    pub fn in_list<I, T>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.push(ClauseEntry::cond(column, Condition::in_list(values)))
    }

    /// Append `column BETWEEN ? AND ?`.
    pub fn between(
        &mut self,
        column: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> &mut Self {
        self.push(ClauseEntry::cond(column, Condition::between(min, max)))
    }

    /// Append an AND connector marker.
    pub fn and(&mut self) -> &mut Self {
        self.push(ClauseEntry::Connector(Connector::And))
    }

    /// Append an OR connector marker.
    pub fn or(&mut self) -> &mut Self {
        self.push(ClauseEntry::Connector(Connector::Or))
    }

    /// Append an arbitrary entry, e.g. a multi-column predicate.
    pub fn push(&mut self, entry: ClauseEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a frozen snapshot of the accumulated sequence.
    ///
    /// Idempotent; later builder mutation does not alter sequences already
    /// handed out.
    pub fn build(&self) -> Vec<ClauseEntry> {
        self.entries.clone()
    }
}

/// Compile an ordered clause sequence into a WHERE fragment.
///
/// Single left-to-right pass. `normalize` maps caller-facing column names to
/// SQL column names (e.g. [`ident::snake_case`]); every normalized name must
/// pass [`ident::is_safe_identifier`] or the whole compile rejects.
///
/// Returns `Ok(None)` when no usable condition was found (empty sequence, or
/// only connectors and empty entries); the caller must then run the base
/// query with no WHERE clause.
///
/// A connector with no preceding condition has no left operand and is
/// discarded silently. After every emitted predicate the pending connector
/// resets to AND, so an explicit [`ClauseBuilder::or`] affects exactly the
/// next join and only that join.
pub fn compile<F>(entries: &[ClauseEntry], normalize: F) -> RepoResult<Option<CompiledWhere>>
where
    F: Fn(&str) -> String,
{
    if entries.is_empty() {
        return Ok(None);
    }

    let mut tokens: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();
    let mut pending = Connector::And;

    for entry in entries {
        match entry {
            ClauseEntry::Connector(op) => {
                // No left operand yet: drop the marker instead of erroring.
                if !tokens.is_empty() {
                    pending = *op;
                }
            }
            ClauseEntry::Predicate(pairs) => {
                if pairs.is_empty() {
                    continue;
                }
                let mut local = Vec::with_capacity(pairs.len());
                for (raw, condition) in pairs {
                    let column = normalize(raw);
                    if !ident::is_safe_identifier(&column) {
                        return Err(RepoError::unsafe_identifier(column));
                    }
                    local.push(format!("{} {}", column, condition.template()));
                    condition.push_args(&mut args);
                }
                if !tokens.is_empty() {
                    tokens.push(pending.as_sql().to_string());
                }
                tokens.push(local.join(" AND "));
                pending = Connector::And;
            }
        }
    }

    if tokens.is_empty() {
        return Ok(None);
    }

    Ok(Some(CompiledWhere {
        sql: tokens.join(" "),
        args,
    }))
}

#[cfg(test)]
mod tests;
