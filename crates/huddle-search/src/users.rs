//! User-lookup cache.

use std::collections::HashMap;
use std::sync::Arc;

use huddle_shared::{UserId, UserIdentity};
use huddle_store::DocumentStore;
use tokio::sync::RwLock;
use tracing::warn;

/// Resolves user ids to profiles, remembering every profile it has seen.
///
/// Misses are not remembered, so a user created after the first lookup
/// resolves on the next one.  Clear it on logout.
pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
    cache: RwLock<HashMap<UserId, UserIdentity>>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The profile for `uid`, or `None` if it does not exist or the store
    /// could not be reached.
    pub async fn get(&self, uid: &UserId) -> Option<UserIdentity> {
        if let Some(user) = self.cache.read().await.get(uid) {
            return Some(user.clone());
        }

        match self.store.get_user(uid).await {
            Ok(Some(user)) => {
                self.insert(user.clone()).await;
                Some(user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(user = %uid, error = %e, "User lookup failed");
                None
            }
        }
    }

    /// Display name for `uid`, if the profile resolves.
    pub async fn name_of(&self, uid: &UserId) -> Option<String> {
        self.get(uid).await.map(|u| u.user_name)
    }

    pub async fn insert(&self, user: UserIdentity) {
        self.cache.write().await.insert(user.uid.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}
