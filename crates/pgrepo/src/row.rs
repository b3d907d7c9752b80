//! Row mapping traits and utilities

use crate::error::{RepoError, RepoResult};
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

/// Map a database row into a Rust type.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> RepoResult<Self>;
}

/// Convenience accessors on [`Row`] that surface decode failures as
/// [`RepoError::Decode`] with the offending column name.
pub trait RowExt {
    fn try_col<'a, T: FromSql<'a>>(&'a self, column: &str) -> RepoResult<T>;
}

impl RowExt for Row {
    fn try_col<'a, T: FromSql<'a>>(&'a self, column: &str) -> RepoResult<T> {
        self.try_get(column)
            .map_err(|e| RepoError::decode(column, e.to_string()))
    }
}
