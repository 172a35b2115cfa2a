use crate::core::config::DatabaseConfig;
use crate::core::error::StoreError;
use crate::models::user::User;
use crate::stores::schema::CREATE_USERS_TABLE;
use crate::stores::user_store::UserStore;
use async_trait::async_trait;
use sqlx::mysql::{
    MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlQueryResult, MySqlRow,
};
use sqlx::pool::PoolConnection;
use sqlx::query::{Query, QueryAs};
use sqlx::{Connection, FromRow, MySql};
use tracing::{debug, info};

const LIST_USERS: &str = "SELECT id, fullname, study_level, age, created_at, updated_at \
     FROM users ORDER BY created_at DESC";

const FIND_USER: &str = "SELECT id, fullname, study_level, age, created_at, updated_at \
     FROM users WHERE id = ?";

/// Process-wide bounded pool of MySQL connections
///
/// Created once at boot and closed once at shutdown. Connections handed out by
/// [`PoolManager::acquire`] go back to the pool when dropped, so every exit
/// path releases them, including `?` returns.
#[derive(Clone)]
pub struct PoolManager {
    pool: MySqlPool,
}

pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
}

impl PoolManager {
    /// Open the pool. Fails if the first connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            pool_size = config.pool_size,
            "Opening database pool"
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(connect_options(config))
            .await
            .map_err(StoreError::Connection)?;

        Ok(Self { pool })
    }

    pub async fn acquire(&self) -> Result<PoolConnection<MySql>, StoreError> {
        self.pool.acquire().await.map_err(StoreError::Connection)
    }

    /// Hand a connection back before it goes out of scope
    pub fn release(&self, conn: PoolConnection<MySql>) {
        drop(conn);
    }

    /// Check out and return one connection
    pub async fn verify(&self) -> Result<(), StoreError> {
        let conn = self.acquire().await?;
        self.release(conn);
        debug!(
            size = self.pool.size(),
            idle = self.pool.num_idle(),
            "Database connectivity verified"
        );
        Ok(())
    }

    /// Run one statement on a checked-out connection
    ///
    /// The connection is released whether the statement succeeds or not.
    pub async fn execute<'q>(
        &self,
        query: Query<'q, MySql, MySqlArguments>,
    ) -> Result<MySqlQueryResult, StoreError> {
        let mut conn = self.acquire().await?;
        let result = query.execute(&mut *conn).await;
        self.release(conn);
        Ok(result?)
    }

    /// Run one query on a checked-out connection and map every row
    pub async fn fetch_all<'q, T>(
        &self,
        query: QueryAs<'q, MySql, T, MySqlArguments>,
    ) -> Result<Vec<T>, StoreError>
    where
        T: Send + Unpin + for<'r> FromRow<'r, MySqlRow>,
    {
        let mut conn = self.acquire().await?;
        let result = query.fetch_all(&mut *conn).await;
        self.release(conn);
        Ok(result?)
    }

    pub async fn create_schema(&self) -> Result<(), StoreError> {
        self.execute(sqlx::query(CREATE_USERS_TABLE)).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

#[async_trait]
impl UserStore for PoolManager {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.fetch_all(sqlx::query_as::<_, User>(LIST_USERS)).await
    }

    async fn find(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users = self
            .fetch_all(sqlx::query_as::<_, User>(FIND_USER).bind(id))
            .await?;
        Ok(users.into_iter().next())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let query = sqlx::query(
            "INSERT INTO users (id, fullname, study_level, age, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.fullname)
        .bind(&user.study_level)
        .bind(user.age)
        .bind(user.created_at)
        .bind(user.updated_at);

        self.execute(query).await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<u64, StoreError> {
        let query = sqlx::query(
            "UPDATE users SET fullname = ?, study_level = ?, age = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&user.fullname)
        .bind(&user.study_level)
        .bind(user.age)
        .bind(user.updated_at)
        .bind(&user.id);

        Ok(self.execute(query).await?.rows_affected())
    }

    async fn delete(&self, id: &str) -> Result<u64, StoreError> {
        let query = sqlx::query("DELETE FROM users WHERE id = ?").bind(id);
        Ok(self.execute(query).await?.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Liveness(e.to_string()))?;
        let result = conn.ping().await;
        self.release(conn);
        result.map_err(|e| StoreError::Liveness(e.to_string()))
    }
}
