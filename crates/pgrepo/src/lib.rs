//! # pgrepo
//!
//! Ordered WHERE-clause composition and a small repository layer for
//! PostgreSQL.
//!
//! ## Features
//!
//! - **Ordered filters**: conditions compile in the order they were
//!   declared, with explicit AND/OR connectors between them
//! - **Safe by construction**: values are always bound as parameters;
//!   column names pass a restrictive identifier check or the whole
//!   compile rejects
//! - **Typed arguments**: a closed [`Value`] sum over the scalar kinds the
//!   driver accepts
//! - **Transaction-friendly**: pass a transaction anywhere a
//!   [`GenericClient`] is expected
//! - **Lifecycle hooks**: audit stamps and key generation applied by the
//!   repository on insert/update
//!
//! ## Composing filters
//!
//! ```ignore
//! use pgrepo::{clause, ident, ClauseBuilder};
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
//!
//! // PostgreSQL numbering and IN-list expansion happen at the edge:
//! let (sql, args) = pgrepo::sql::expand(&compiled.sql, &compiled.args)?;
//! assert_eq!(sql, "status = $1 AND age >= $2 OR role IN ($3, $4)");
//! # Ok::<(), pgrepo::RepoError>(())
//! ```

pub mod clause;
pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod id;
pub mod ident;
pub mod record;
pub mod repo;
pub mod row;
pub mod sql;
pub mod transaction;
pub mod value;

pub use clause::{ClauseBuilder, ClauseEntry, CompiledWhere, Connector};
pub use client::GenericClient;
pub use condition::Condition;
pub use config::{Config, PrincipalSource, StaticPrincipal};
pub use error::{RepoError, RepoResult};
pub use id::{Key, KeyGenerator, KeyGenerators, KeyKind, TextUuidKeys, UuidKeys};
pub use record::{Audit, Record};
pub use repo::Repo;
pub use row::{FromRow, RowExt};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{connect, create_pool};
