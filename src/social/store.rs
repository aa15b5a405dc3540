use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use fxhash::{FxHashMap, FxHashSet};

use crate::social::records::{AppUser, Postcard};
use crate::traits::DocumentStore;
use crate::{PostmapError, Result};

/// Upper end of a username prefix range
const PREFIX_RANGE_END: char = '\u{f8ff}';

#[derive(Debug, Default)]
struct Collections {
    users: FxHashMap<String, AppUser>,
    postcards: FxHashMap<String, Vec<Postcard>>,
    /// user id -> ids that user follows
    following: FxHashMap<String, FxHashSet<String>>,
}

/// In-process [`DocumentStore`], used by tests and the demo binary
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| PostmapError::Store("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_user(&self, user: AppUser) -> Result<()> {
        self.lock()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<AppUser>> {
        Ok(self.lock()?.users.get(user_id).cloned())
    }

    async fn users_with_username_prefix(&self, prefix: &str) -> Result<Vec<AppUser>> {
        let end = format!("{}{}", prefix, PREFIX_RANGE_END);
        let mut users: Vec<AppUser> = self
            .lock()?
            .users
            .values()
            .filter(|u| u.username.as_str() >= prefix && u.username.as_str() < end.as_str())
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn save_postcard(&self, user_id: &str, mut postcard: Postcard) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        postcard.id = Some(id.clone());
        self.lock()?
            .postcards
            .entry(user_id.to_string())
            .or_default()
            .push(postcard);
        Ok(id)
    }

    async fn postcards(&self, user_id: &str) -> Result<Vec<Postcard>> {
        Ok(self
            .lock()?
            .postcards
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_following(&self, user_id: &str, other_id: &str) -> Result<bool> {
        Ok(self
            .lock()?
            .following
            .get(user_id)
            .map(|set| set.contains(other_id))
            .unwrap_or(false))
    }

    async fn set_following(&self, user_id: &str, other_id: &str, following: bool) -> Result<()> {
        let mut inner = self.lock()?;
        if following {
            inner
                .following
                .entry(user_id.to_string())
                .or_default()
                .insert(other_id.to_string());
        } else if let Some(set) = inner.following.get_mut(user_id) {
            set.remove(other_id);
        }
        Ok(())
    }

    async fn following(&self, user_id: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .lock()?
            .following
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn followers_of(&self, user_id: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .lock()?
            .following
            .iter()
            .filter(|(_, set)| set.contains(user_id))
            .map(|(follower, _)| follower.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
