//! Connection pool construction and connect-with-retry.

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::config::Config;
use crate::error::{RepoError, RepoResult};

/// Build a connection pool from the configuration.
///
/// Uses `NoTls`, suitable for local networks and development. The pool is
/// lazy: no connection is attempted until first use. Use [`connect`] to
/// verify reachability up front.
pub fn create_pool(config: &Config) -> RepoResult<Pool> {
    config.validate()?;
    let pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| RepoError::Connection(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| RepoError::Pool(e.to_string()))
}

/// Build a pool and probe it until the database answers.
///
/// Retries up to `config.connect_retries` times, `config.retry_interval`
/// apart, then gives up with [`RepoError::Connection`].
pub async fn connect(config: &Config) -> RepoResult<Pool> {
    let pool = create_pool(config)?;
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match pool.get().await {
            Ok(_) => {
                tracing::debug!(attempt, "database connection established");
                return Ok(pool);
            }
            Err(err) if attempt < config.connect_retries => {
                tracing::warn!(attempt, error = %err, "database not reachable, retrying");
                tokio::time::sleep(config.retry_interval).await;
            }
            Err(err) => {
                return Err(RepoError::Connection(format!(
                    "giving up after {attempt} attempts: {err}"
                )));
            }
        }
    }
}
