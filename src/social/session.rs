use std::sync::RwLock;

use crate::traits::SessionProvider;

/// Session held in memory; sign-in state is set by the caller
#[derive(Debug, Default)]
pub struct StaticSession {
    user_id: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.into())),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        if let Ok(mut current) = self.user_id.write() {
            *current = Some(user_id.into());
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut current) = self.user_id.write() {
            *current = None;
        }
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.read().ok().and_then(|id| id.clone())
    }
}
