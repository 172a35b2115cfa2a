use crate::core::config::DatabaseConfig;
use crate::core::error::StoreError;
use crate::migration::SchemaTarget;
use crate::stores::pool::connect_options;
use crate::stores::schema::{COUNT_USERS, CREATE_USERS_TABLE, TABLE_EXISTS};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;

/// MySQL backend for the migrator
///
/// Probes open a throwaway connection each time. Schema work shares a single
/// lazily opened connection that is closed by [`SchemaTarget::close`].
pub struct MySqlTarget {
    options: MySqlConnectOptions,
    session: MySqlPool,
}

impl MySqlTarget {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = connect_options(config);
        let session = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options.clone());

        Self { options, session }
    }
}

#[async_trait]
impl SchemaTarget for MySqlTarget {
    async fn probe(&self) -> Result<(), StoreError> {
        let mut conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(StoreError::Connection)?;

        let result = sqlx::query("SELECT 1").execute(&mut conn).await;
        let _ = conn.close().await;

        result.map(|_| ()).map_err(StoreError::from)
    }

    async fn create_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.session).await?;
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(TABLE_EXISTS)
            .bind(table)
            .fetch_one(&self.session)
            .await?;
        Ok(count > 0)
    }

    async fn row_count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(COUNT_USERS)
            .fetch_one(&self.session)
            .await?;
        Ok(count)
    }

    async fn close(&self) {
        self.session.close().await;
    }
}
