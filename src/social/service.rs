//! User-facing social operations on top of a [`DocumentStore`].
//!
//! Reads degrade instead of failing: a search that hits a store error
//! returns no users and a failed count reads as zero, the way the screens
//! consuming them expect. Writes still return errors.

use std::sync::Arc;

use crate::social::records::{AppUser, Postcard};
use crate::traits::DocumentStore;
use crate::Result;

/// Profile header data: the user plus follow counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub user: AppUser,
    pub following_count: usize,
    pub follower_count: usize,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Registers a freshly signed-up user
    pub async fn register(&self, user: AppUser) -> Result<()> {
        log::debug!("Adding user {} to the store", user.username);
        self.store.create_user(user).await
    }

    pub async fn search_users(&self, prefix: &str) -> Vec<AppUser> {
        if prefix.is_empty() {
            log::debug!("Search prefix is empty");
            return Vec::new();
        }

        match self.store.users_with_username_prefix(prefix).await {
            Ok(users) => {
                log::debug!("Total users found for {:?}: {}", prefix, users.len());
                users
            }
            Err(e) => {
                log::warn!("Error searching users: {}", e);
                Vec::new()
            }
        }
    }

    /// Follows `other_id` if not followed yet, unfollows otherwise.
    /// Returns the new follow state.
    pub async fn toggle_follow(&self, current_user_id: &str, other_id: &str) -> Result<bool> {
        let following = self.store.is_following(current_user_id, other_id).await?;
        self.store
            .set_following(current_user_id, other_id, !following)
            .await?;
        Ok(!following)
    }

    pub async fn is_following(&self, current_user_id: &str, other_id: &str) -> bool {
        self.store
            .is_following(current_user_id, other_id)
            .await
            .unwrap_or(false)
    }

    pub async fn following_count(&self, user_id: &str) -> usize {
        match self.store.following(user_id).await {
            Ok(ids) => ids.len(),
            Err(e) => {
                log::warn!("Error getting following count: {}", e);
                0
            }
        }
    }

    pub async fn follower_count(&self, user_id: &str) -> usize {
        match self.store.followers_of(user_id).await {
            Ok(ids) => ids.len(),
            Err(e) => {
                log::warn!("Error getting follower count: {}", e);
                0
            }
        }
    }

    pub async fn save_postcard(&self, user_id: &str, postcard: Postcard) -> Result<String> {
        self.store.save_postcard(user_id, postcard).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<ProfileSummary>> {
        let Some(user) = self.store.get_user(user_id).await? else {
            return Ok(None);
        };
        Ok(Some(ProfileSummary {
            user,
            following_count: self.following_count(user_id).await,
            follower_count: self.follower_count(user_id).await,
        }))
    }
}
