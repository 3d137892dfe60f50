//! In-memory user store for handler and bootstrap tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use common::password::HASH_VERSION;
use uuid::Uuid;

use crate::{
    models::{NewUser, User},
    repositories::{StoreError, UserStore},
};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    failing: bool,
}

impl InMemoryUserStore {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().expect("lock").clone()
    }

    pub fn remove(&self, id: Uuid) {
        self.users.lock().expect("lock").retain(|user| user.id != id);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, StoreError> {
        self.check()?;
        let mut users = self.users.lock().expect("lock");
        if users
            .iter()
            .any(|user| user.username == new_user.username || user.email == new_user.email)
        {
            return Err(StoreError::Conflict);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            hash_version: Some(HASH_VERSION.to_string()),
            is_admin: new_user.is_admin,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().expect("lock");
        Ok(users
            .iter()
            .find(|user| user.username == identifier)
            .or_else(|| users.iter().find(|user| user.email == identifier))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .expect("lock")
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        self.check()?;
        Ok(self.users.lock().expect("lock").len() as i64)
    }
}
