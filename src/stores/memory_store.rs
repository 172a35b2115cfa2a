//! In-memory `UserStore` for handler tests.

use crate::core::error::StoreError;
use crate::models::user::User;
use crate::stores::user_store::UserStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct MemoryStore {
    // Insertion order; list() sorts newest first
    users: Mutex<Vec<User>>,
    reachable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulate the database going away (or coming back)
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection(sqlx::Error::PoolTimedOut))
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        let mut indexed: Vec<(usize, User)> = users.iter().cloned().enumerate().collect();
        // Newest first; insertion order breaks timestamp ties
        indexed.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        Ok(indexed.into_iter().map(|(_, user)| user).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.check()?;
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<u64, StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                existing.fullname = user.fullname.clone();
                existing.study_level = user.study_level.clone();
                existing.age = user.age;
                existing.updated_at = user.updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &str) -> Result<u64, StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok((before - users.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Liveness(
                "connect ECONNREFUSED 127.0.0.1:3306".to_string(),
            ))
        }
    }
}
