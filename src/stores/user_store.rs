use crate::core::error::StoreError;
use crate::models::user::User;
use async_trait::async_trait;

/// Single-row operations on the `users` table
///
/// Handlers only see this trait, so the pool can be swapped for a test
/// double without touching request handling.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Replace the mutable columns of `user`. Returns the number of rows affected.
    async fn update(&self, user: &User) -> Result<u64, StoreError>;

    /// Returns the number of rows affected.
    async fn delete(&self, id: &str) -> Result<u64, StoreError>;

    /// Round-trip liveness probe
    async fn ping(&self) -> Result<(), StoreError>;
}
