//! Transaction helper macros.
//!
//! Repository methods accept any [`GenericClient`](crate::GenericClient), so
//! they run unchanged inside or outside a transaction. The macros here own
//! the commit/rollback bookkeeping: exactly one scope decides the outcome,
//! and inner scopes (savepoints) can fail without aborting the outer
//! transaction.
//!
//! # Example
//!
//! ```ignore
//! use pgrepo::RepoResult;
//!
//! # async fn demo(client: &mut tokio_postgres::Client) -> RepoResult<()> {
//! pgrepo::transaction!(client, tx, {
//!     users.insert(&tx, &mut user).await?;
//!     pgrepo::nested_transaction!(tx, inner, {
//!         profiles.insert(&inner, &mut profile).await?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! # Ok(()) }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for anonymous savepoint naming.
static SAVEPOINT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Runs the given block inside a database transaction.
///
/// - Begins a transaction via `$client.transaction().await`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`; a rollback failure is folded into the error.
///
/// The block must evaluate to `pgrepo::RepoResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($client:expr, $tx:ident, $body:block) => {{
        let mut $tx = ($client)
            .transaction()
            .await
            .map_err($crate::RepoError::from_db_error)?;

        let __pgrepo_tx_result = async { $body }.await;
        match __pgrepo_tx_result {
            Ok(value) => {
                $tx.commit()
                    .await
                    .map_err($crate::RepoError::from_db_error)?;
                Ok(value)
            }
            Err(error) => match $tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::RepoError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}

/// Runs the given block inside a savepoint within an existing transaction.
///
/// - Creates a savepoint on `$tx`.
/// - Releases on `Ok(_)`.
/// - Rolls back to the savepoint on `Err(_)`.
///
/// Releasing or rolling back a savepoint never commits or aborts the outer
/// transaction; the outermost scope keeps sole control of the final outcome.
#[macro_export]
macro_rules! savepoint {
    // Named savepoint
    ($tx:expr, $name:expr, $sp:ident, $body:block) => {{
        let mut $sp = ($tx)
            .savepoint($name)
            .await
            .map_err($crate::RepoError::from_db_error)?;

        let __pgrepo_sp_result = async { $body }.await;
        match __pgrepo_sp_result {
            Ok(value) => {
                $sp.commit()
                    .await
                    .map_err($crate::RepoError::from_db_error)?;
                Ok(value)
            }
            Err(error) => match $sp.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::RepoError::Other(format!(
                    "{error} (savepoint rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
    // Anonymous savepoint
    ($tx:expr, $sp:ident, $body:block) => {{
        let __pgrepo_sp_name = $crate::transaction::next_savepoint_name();
        $crate::savepoint!($tx, &__pgrepo_sp_name, $sp, $body)
    }};
}

/// Runs the given block inside a nested transaction (savepoint).
///
/// The inner block gets child semantics: its failure rolls back only its own
/// work, and its success becomes permanent only when the outer transaction
/// commits.
#[macro_export]
macro_rules! nested_transaction {
    ($tx:expr, $inner:ident, $body:block) => {{
        let __pgrepo_sp_name = $crate::transaction::next_savepoint_name();
        $crate::savepoint!($tx, &__pgrepo_sp_name, $inner, $body)
    }};
}

/// Generate a unique anonymous savepoint name.
///
/// Used by the `savepoint!` and `nested_transaction!` macros. Not intended
/// for direct use.
#[doc(hidden)]
pub fn next_savepoint_name() -> String {
    let n = SAVEPOINT_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("pgrepo_sp_{n}")
}
