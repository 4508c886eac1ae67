//! Settings broadcast.
//!
//! The hub is the only writer of settings. Every interceptor holds a
//! [`watch::Receiver`] and copies the current value when a detection cycle
//! starts, so an update is observed by the next send attempt and never by
//! one already in flight.

use std::sync::Arc;

use tokio::sync::watch;

use super::{Settings, SettingsStore};
use crate::error::Result;

/// Owner of the persisted settings and their subscribers.
pub struct SettingsHub {
    store: Arc<dyn SettingsStore>,
    tx: watch::Sender<Settings>,
}

impl SettingsHub {
    /// Create a hub over a store. Call [`initialize`](Self::initialize)
    /// before handing out subscriptions.
    pub fn new(store: impl SettingsStore + 'static) -> Self {
        let (tx, _rx) = watch::channel(Settings::default());
        Self {
            store: Arc::new(store),
            tx,
        }
    }

    /// Load settings from the store, seeding defaults on first run.
    pub fn initialize(&self) -> Result<Settings> {
        let settings = if let Some(stored) = self.store.load()? {
            tracing::debug!("settings loaded from store");
            stored
        } else {
            let defaults = Settings::default();
            self.store.save(&defaults)?;
            tracing::info!("first run, default settings stored");
            defaults
        };
        self.tx.send_replace(settings.clone());
        Ok(settings)
    }

    /// Current settings.
    #[must_use]
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Persist new settings and notify every subscriber.
    pub fn update(&self, settings: Settings) -> Result<()> {
        self.store.save(&settings)?;
        self.tx.send_replace(settings);
        tracing::info!(subscribers = self.tx.receiver_count(), "settings updated");
        Ok(())
    }

    /// Apply a change to the current settings, persist and notify.
    pub fn modify(&self, f: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.current();
        f(&mut settings);
        self.update(settings.clone())?;
        Ok(settings)
    }

    /// Subscribe to settings changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl std::fmt::Debug for SettingsHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsHub")
            .field("current", &*self.tx.borrow())
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
