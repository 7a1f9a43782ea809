use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::AppConfig,
    dao::chug_store::ChugStore,
    error::ServiceError,
    photos::{PhotoResolver, PhotoStore},
};

pub type SharedState = Arc<AppState>;

/// Central application state holding the storage handle and photo backend.
pub struct AppState {
    store: Arc<dyn ChugStore>,
    photos: Arc<dyn PhotoStore>,
    resolver: PhotoResolver,
    config: AppConfig,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The store must already be connected; the application starts healthy.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ChugStore>,
        photos: Arc<dyn PhotoStore>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            resolver: PhotoResolver::new(config.photos.public_base_url.clone()),
            store,
            photos,
            config,
            degraded: degraded_tx,
        })
    }

    /// Store handle for request paths; refused while degraded.
    pub fn store(&self) -> Result<Arc<dyn ChugStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        Ok(self.store.clone())
    }

    /// Store handle regardless of health, for the supervisor.
    pub fn supervised_store(&self) -> Arc<dyn ChugStore> {
        self.store.clone()
    }

    /// Configured photo backend.
    pub fn photos(&self) -> Arc<dyn PhotoStore> {
        self.photos.clone()
    }

    /// Resolver built from the photo base URL.
    pub fn resolver(&self) -> &PhotoResolver {
        &self.resolver
    }

    /// Configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::chug_store::memory::MemoryStore, photos::inline::InlinePhotoStore};

    #[test]
    fn degraded_state_refuses_the_store() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(InlinePhotoStore),
        );
        let mut watcher = state.degraded_watcher();
        assert!(state.store().is_ok());

        state.update_degraded(true);
        assert!(matches!(state.store(), Err(ServiceError::Degraded)));
        assert!(watcher.has_changed().unwrap());
        assert!(*watcher.borrow_and_update());

        state.update_degraded(true);
        assert!(!watcher.has_changed().unwrap());
    }
}
