//! Startup readiness protocol for the standalone migrator
//!
//! Two phases. WAIT probes the database until it answers, sleeping a fixed
//! delay between attempts; running out of attempts is fatal and schema work
//! is never started. MIGRATE creates the table if absent, checks it is listed,
//! and reports the current row count; any failure there is fatal with no
//! retry.

pub mod mysql_target;

use crate::core::config::MigrationConfig;
use crate::core::error::{MigrationError, StoreError};
use crate::stores::schema::USERS_TABLE;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, warn};

/// Database operations the migrator needs
#[async_trait]
pub trait SchemaTarget: Send + Sync {
    /// Open a connection, run a trivial query, close it
    async fn probe(&self) -> Result<(), StoreError>;

    async fn create_schema(&self) -> Result<(), StoreError>;

    async fn table_exists(&self, table: &str) -> Result<bool, StoreError>;

    async fn row_count(&self) -> Result<i64, StoreError>;

    /// Release whatever connection the target holds
    async fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay: Duration::from_secs(2),
        }
    }
}

impl From<&MigrationConfig> for RetryPolicy {
    fn from(config: &MigrationConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            delay: config.retry_delay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Probe attempt on which the database answered
    pub attempts: u32,
    /// Rows in the users table after migration
    pub rows: i64,
}

/// Phase WAIT. Returns the attempt number that succeeded.
pub async fn wait_for_database<T>(target: &T, policy: &RetryPolicy) -> Result<u32, MigrationError>
where
    T: SchemaTarget + ?Sized,
{
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        info!(attempt, max_attempts = policy.max_attempts, "Connecting to database");

        match target.probe().await {
            Ok(()) => {
                info!(attempt, "Database ready");
                return Ok(attempt);
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt < policy.max_attempts {
                    warn!(
                        attempt,
                        error = %e,
                        retry_in_secs = policy.delay.as_secs_f64(),
                        "Database not ready yet"
                    );
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    error!(
        attempts = policy.max_attempts,
        error = %last_error,
        "Could not connect to database"
    );

    Err(MigrationError::Unreachable {
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Phase MIGRATE. The target is closed on every path.
pub async fn migrate<T>(target: &T) -> Result<i64, MigrationError>
where
    T: SchemaTarget + ?Sized,
{
    let result = apply_schema(target).await;
    target.close().await;

    if let Err(e) = &result {
        error!(error = %e, "Migration failed");
    }
    result
}

async fn apply_schema<T>(target: &T) -> Result<i64, MigrationError>
where
    T: SchemaTarget + ?Sized,
{
    info!(table = USERS_TABLE, "Creating table if absent");
    target.create_schema().await?;

    if !target.table_exists(USERS_TABLE).await? {
        return Err(MigrationError::VerificationFailed(USERS_TABLE.to_string()));
    }
    info!(table = USERS_TABLE, "Table present");

    let rows = target.row_count().await?;
    info!(table = USERS_TABLE, rows, "Current row count");

    Ok(rows)
}

/// Run both phases
pub async fn run<T>(target: &T, policy: &RetryPolicy) -> Result<MigrationReport, MigrationError>
where
    T: SchemaTarget + ?Sized,
{
    let attempts = match wait_for_database(target, policy).await {
        Ok(attempts) => attempts,
        Err(e) => {
            target.close().await;
            return Err(e);
        }
    };

    let rows = migrate(target).await?;

    info!(attempts, rows, "Migrations completed successfully");

    Ok(MigrationReport { attempts, rows })
}
