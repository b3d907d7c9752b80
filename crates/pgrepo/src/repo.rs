//! Generic CRUD façade over compiled clauses.
//!
//! [`Repo`] issues Find/Create/Update/Delete statements for any [`Record`]
//! through any [`GenericClient`]. Filters are ordered clause sequences; when
//! a filter compiles to nothing the statement runs with no WHERE clause.
//! Statement assembly is pure and tested separately from execution.
//!
//! # Example
//! ```ignore
//! use pgrepo::{ClauseBuilder, Config, KeyKind, Repo};
//!
//! let users: Repo<User> = Repo::new(&config, KeyKind::Uuid);
//! let filter = ClauseBuilder::new()
//!     .eq("status", "active")
//!     .or()
//!     .gte("age", 65)
//!     .build();
//! let rows = users.find_where(&client, &filter).await?;
//! ```

use std::fmt::Write as _;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio_postgres::types::ToSql;

use crate::clause::{self, ClauseEntry};
use crate::client::GenericClient;
use crate::condition::Condition;
use crate::config::{Config, PrincipalSource};
use crate::error::{RepoError, RepoResult};
use crate::id::{KeyGenerators, KeyKind};
use crate::ident;
use crate::record::Record;
#[cfg_attr(not(test), allow(unused_imports))]
use crate::row::FromRow;
use crate::sql;
use crate::value::Value;

/// CRUD operations for one record type.
pub struct Repo<T: Record> {
    generators: KeyGenerators,
    principal: Arc<dyn PrincipalSource>,
    key_kind: KeyKind,
    normalizer: fn(&str) -> String,
    _marker: PhantomData<T>,
}

impl<T: Record> Repo<T> {
    /// Create a repository using the configuration's generators and
    /// principal source. Filter column names are snake-cased by default.
    pub fn new(config: &Config, key_kind: KeyKind) -> Self {
        Self {
            generators: config.generators.clone(),
            principal: config.principal.clone(),
            key_kind,
            normalizer: ident::snake_case,
            _marker: PhantomData,
        }
    }

    /// Replace the filter column normalizer (e.g. with [`ident::verbatim`]).
    pub fn with_normalizer(mut self, normalizer: fn(&str) -> String) -> Self {
        self.normalizer = normalizer;
        self
    }

    // ==================== Statement assembly ====================

    fn select_statement(
        &self,
        filter: &[ClauseEntry],
        page: Option<(u64, u64)>,
    ) -> RepoResult<(String, Vec<Value>)> {
        let mut statement = format!("SELECT {} FROM {}", T::COLUMNS.join(", "), T::TABLE);
        let args = push_where(&mut statement, filter, self.normalizer)?;
        if let Some((offset, limit)) = page {
            let _ = write!(statement, " LIMIT {limit} OFFSET {offset}");
        }
        sql::expand(&statement, &args)
    }

    fn count_statement(&self, filter: &[ClauseEntry]) -> RepoResult<(String, Vec<Value>)> {
        let mut statement = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let args = push_where(&mut statement, filter, self.normalizer)?;
        sql::expand(&statement, &args)
    }

    fn insert_statement(&self, values: Vec<(&'static str, Value)>) -> RepoResult<(String, Vec<Value>)> {
        if values.is_empty() {
            return Err(RepoError::validation("insert requires at least one column"));
        }
        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let placeholders = vec!["?"; values.len()].join(", ");
        let statement = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            T::TABLE,
            columns.join(", ")
        );
        let args: Vec<Value> = values.into_iter().map(|(_, v)| v).collect();
        sql::expand(&statement, &args)
    }

    fn update_statement(
        &self,
        values: Vec<(&'static str, Value)>,
        key: Value,
    ) -> RepoResult<(String, Vec<Value>)> {
        if values.is_empty() {
            return Err(RepoError::validation("update requires at least one column"));
        }
        let assignments: Vec<String> = values.iter().map(|(c, _)| format!("{c} = ?")).collect();
        let statement = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            T::TABLE,
            assignments.join(", "),
            T::ID_COLUMN
        );
        let mut args: Vec<Value> = values.into_iter().map(|(_, v)| v).collect();
        args.push(key);
        sql::expand(&statement, &args)
    }

    fn delete_statement(&self, filter: &[ClauseEntry]) -> RepoResult<(String, Vec<Value>)> {
        let compiled = clause::compile(filter, ident::verbatim)?
            .ok_or_else(|| RepoError::validation("delete requires a filter"))?;
        let statement = format!("DELETE FROM {} WHERE {}", T::TABLE, compiled.sql);
        sql::expand(&statement, &compiled.args)
    }

    fn id_filter(&self, id: impl Into<Value>) -> Vec<ClauseEntry> {
        vec![ClauseEntry::cond(T::ID_COLUMN, Condition::eq(id))]
    }

    fn ids_filter<I, V>(&self, ids: I) -> Vec<ClauseEntry>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        vec![ClauseEntry::cond(T::ID_COLUMN, Condition::in_list(ids))]
    }

    fn id_and_created_by_filter(
        &self,
        id: impl Into<Value>,
        principal: &str,
    ) -> Vec<ClauseEntry> {
        vec![ClauseEntry::predicate(vec![
            (T::ID_COLUMN.to_string(), Condition::eq(id)),
            ("created_by".to_string(), Condition::eq(principal)),
        ])]
    }

    // ==================== Reads ====================

    /// Fetch every row of the table.
    pub async fn find_all(&self, conn: &impl GenericClient) -> RepoResult<Vec<T>> {
        self.find_where(conn, &[]).await
    }

    /// Fetch the rows matching an ordered filter sequence.
    pub async fn find_where(
        &self,
        conn: &impl GenericClient,
        filter: &[ClauseEntry],
    ) -> RepoResult<Vec<T>> {
        let (statement, args) = self.select_statement(filter, None)?;
        self.fetch(conn, &statement, &args).await
    }

    /// Fetch one page of rows matching the filter.
    pub async fn find_page(
        &self,
        conn: &impl GenericClient,
        offset: u64,
        limit: u64,
        filter: &[ClauseEntry],
    ) -> RepoResult<Vec<T>> {
        let (statement, args) = self.select_statement(filter, Some((offset, limit)))?;
        self.fetch(conn, &statement, &args).await
    }

    /// Fetch the row with the given primary key.
    ///
    /// Returns [`RepoError::NotFound`] when no row matches.
    pub async fn find_by_id(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
    ) -> RepoResult<T> {
        let (statement, args) = self.select_statement(&self.id_filter(id), None)?;
        tracing::debug!(table = T::TABLE, sql = %statement, "find_by_id");
        let row = conn
            .query_one(&statement, &params_ref(&args))
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => RepoError::not_found(T::TABLE),
                other => other,
            })?;
        T::from_row(&row)
    }

    /// Fetch the rows whose primary keys are in `ids`.
    pub async fn find_by_ids<I, V>(&self, conn: &impl GenericClient, ids: I) -> RepoResult<Vec<T>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let (statement, args) = self.select_statement(&self.ids_filter(ids), None)?;
        self.fetch(conn, &statement, &args).await
    }

    /// Fetch the rows created by the given principal.
    pub async fn find_by_created_by(
        &self,
        conn: &impl GenericClient,
        principal: &str,
    ) -> RepoResult<Vec<T>> {
        let filter = vec![ClauseEntry::cond("created_by", Condition::eq(principal))];
        let (statement, args) = self.select_statement(&filter, None)?;
        self.fetch(conn, &statement, &args).await
    }

    /// Fetch the row with the given primary key, scoped to its creator.
    ///
    /// Returns [`RepoError::NotFound`] when no row matches both.
    pub async fn find_by_id_and_created_by(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
        principal: &str,
    ) -> RepoResult<T> {
        let filter = self.id_and_created_by_filter(id, principal);
        let (statement, args) = self.select_statement(&filter, None)?;
        tracing::debug!(table = T::TABLE, sql = %statement, "find_by_id_and_created_by");
        let row = conn
            .query_one(&statement, &params_ref(&args))
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => RepoError::not_found(T::TABLE),
                other => other,
            })?;
        T::from_row(&row)
    }

    /// Count the rows matching the filter.
    pub async fn count(
        &self,
        conn: &impl GenericClient,
        filter: &[ClauseEntry],
    ) -> RepoResult<i64> {
        let (statement, args) = self.count_statement(filter)?;
        tracing::debug!(table = T::TABLE, sql = %statement, "count");
        let row = conn.query_one(&statement, &params_ref(&args)).await?;
        row.try_get(0).map_err(RepoError::from_db_error)
    }

    /// Count the rows whose primary keys are in `ids`.
    pub async fn count_by_ids<I, V>(&self, conn: &impl GenericClient, ids: I) -> RepoResult<i64>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.count(conn, &self.ids_filter(ids)).await
    }

    /// Whether a row with the given primary key exists.
    pub async fn exists_by_id(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
    ) -> RepoResult<bool> {
        let count = self.count(conn, &self.id_filter(id)).await?;
        Ok(count > 0)
    }

    /// Whether a row with the given column value exists.
    ///
    /// The column name is caller input here, so it passes the
    /// safe-identifier check before reaching any SQL; a malformed name is
    /// rejected, not queried.
    pub async fn exists_by(
        &self,
        conn: &impl GenericClient,
        column: &str,
        value: impl Into<Value>,
    ) -> RepoResult<bool> {
        let normalized = (self.normalizer)(column);
        if !ident::is_safe_identifier(&normalized) {
            return Err(RepoError::unsafe_identifier(normalized));
        }
        let filter = vec![ClauseEntry::cond(column, Condition::eq(value))];
        let count = self.count(conn, &filter).await?;
        Ok(count > 0)
    }

    /// Whether a row with the given primary key and creator exists.
    pub async fn exists_by_id_and_created_by(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
        principal: &str,
    ) -> RepoResult<bool> {
        let filter = self.id_and_created_by_filter(id, principal);
        let count = self.count(conn, &filter).await?;
        Ok(count > 0)
    }

    /// Error with [`RepoError::NotFound`] unless the primary key exists.
    pub async fn must_exist_by_id(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
    ) -> RepoResult<()> {
        if self.exists_by_id(conn, id).await? {
            Ok(())
        } else {
            Err(RepoError::not_found(T::TABLE))
        }
    }

    // ==================== Writes ====================

    /// Insert a record, applying the create lifecycle hooks first.
    ///
    /// When the record carries an [`Audit`](crate::Audit) block this stamps
    /// the creation metadata and assigns a fresh key if none is set.
    pub async fn insert(&self, conn: &impl GenericClient, entity: &mut T) -> RepoResult<u64> {
        self.apply_create_hooks(entity)?;
        let (statement, args) = self.insert_statement(entity.insert_values())?;
        tracing::debug!(table = T::TABLE, sql = %statement, "insert");
        conn.execute(&statement, &params_ref(&args)).await
    }

    /// Insert several records, applying the create hooks to each.
    pub async fn insert_many(
        &self,
        conn: &impl GenericClient,
        entities: &mut [T],
    ) -> RepoResult<u64> {
        let mut affected = 0;
        for entity in entities.iter_mut() {
            affected += self.insert(conn, entity).await?;
        }
        Ok(affected)
    }

    /// Update a record by primary key, applying the update lifecycle hooks.
    pub async fn update(&self, conn: &impl GenericClient, entity: &mut T) -> RepoResult<u64> {
        self.apply_update_hooks(entity)?;
        let key = entity
            .key()
            .ok_or_else(|| RepoError::validation("update requires a primary key"))?;
        let (statement, args) = self.update_statement(entity.update_values(), key.into())?;
        tracing::debug!(table = T::TABLE, sql = %statement, "update");
        conn.execute(&statement, &params_ref(&args)).await
    }

    /// Insert when the record has no key yet, update otherwise.
    pub async fn save(&self, conn: &impl GenericClient, entity: &mut T) -> RepoResult<u64> {
        if entity.key().is_none() {
            self.insert(conn, entity).await
        } else {
            self.update(conn, entity).await
        }
    }

    /// Save several records.
    pub async fn save_many(
        &self,
        conn: &impl GenericClient,
        entities: &mut [T],
    ) -> RepoResult<u64> {
        let mut affected = 0;
        for entity in entities.iter_mut() {
            affected += self.save(conn, entity).await?;
        }
        Ok(affected)
    }

    /// Delete a record by its primary key.
    pub async fn delete(&self, conn: &impl GenericClient, entity: &T) -> RepoResult<u64> {
        let key = entity
            .key()
            .ok_or_else(|| RepoError::validation("delete requires a primary key"))?;
        self.delete_by_id(conn, key).await
    }

    /// Delete the row with the given primary key.
    pub async fn delete_by_id(
        &self,
        conn: &impl GenericClient,
        id: impl Into<Value>,
    ) -> RepoResult<u64> {
        let (statement, args) = self.delete_statement(&self.id_filter(id))?;
        tracing::debug!(table = T::TABLE, sql = %statement, "delete_by_id");
        conn.execute(&statement, &params_ref(&args)).await
    }

    /// Delete the rows whose primary keys are in `ids`.
    pub async fn delete_by_ids<I, V>(&self, conn: &impl GenericClient, ids: I) -> RepoResult<u64>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let (statement, args) = self.delete_statement(&self.ids_filter(ids))?;
        tracing::debug!(table = T::TABLE, sql = %statement, "delete_by_ids");
        conn.execute(&statement, &params_ref(&args)).await
    }

    // ==================== Internals ====================

    async fn fetch(
        &self,
        conn: &impl GenericClient,
        statement: &str,
        args: &[Value],
    ) -> RepoResult<Vec<T>> {
        tracing::debug!(table = T::TABLE, sql = %statement, "find");
        let rows = conn.query(statement, &params_ref(args)).await?;
        rows.iter().map(T::from_row).collect()
    }

    fn apply_create_hooks(&self, entity: &mut T) -> RepoResult<()> {
        if let Some(audit) = entity.audit_mut() {
            let principal = self.principal.current()?;
            audit.touch_created(&principal, &self.generators, self.key_kind)?;
        }
        Ok(())
    }

    fn apply_update_hooks(&self, entity: &mut T) -> RepoResult<()> {
        if let Some(audit) = entity.audit_mut() {
            let principal = self.principal.current()?;
            audit.touch_updated(&principal);
        }
        Ok(())
    }
}

/// Append `" WHERE <compiled>"` when the filter compiles to something.
fn push_where(
    statement: &mut String,
    filter: &[ClauseEntry],
    normalizer: fn(&str) -> String,
) -> RepoResult<Vec<Value>> {
    match clause::compile(filter, normalizer)? {
        Some(compiled) => {
            statement.push_str(" WHERE ");
            statement.push_str(&compiled.sql);
            Ok(compiled.args)
        }
        None => Ok(Vec::new()),
    }
}

fn params_ref(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}
