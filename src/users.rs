// ==============================================================================
// users.rs - User Directory
// ==============================================================================
// Description: User lookup/create/update behind a storage trait (in-memory default)
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::User;

/// Storage seam for user handlers
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, username: String, mobile_number: String) -> User;

    /// Replace username/mobile number; `None` if the id is unknown
    async fn update(&self, id: &str, username: String, mobile_number: String) -> Option<User>;

    async fn get(&self, id: &str) -> Option<User>;
}

/// Process-local user directory (ids are 32 lowercase hex characters)
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, username: String, mobile_number: String) -> User {
        let user = User {
            id: Uuid::new_v4().simple().to_string(),
            username,
            mobile_number,
            created_at: Utc::now(),
        };

        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        user
    }

    async fn update(&self, id: &str, username: String, mobile_number: String) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id.to_ascii_lowercase())?;
        user.username = username;
        user.mobile_number = mobile_number;
        Some(user.clone())
    }

    async fn get(&self, id: &str) -> Option<User> {
        self.users
            .read()
            .await
            .get(&id.to_ascii_lowercase())
            .cloned()
    }
}
