//! Pro-version unlock state.
//!
//! The purchase collaborator (app store billing) reports transaction
//! outcomes as events; this service folds them into a single persisted
//! "pro unlocked" flag the UI gates features on.

use anyhow::Result;
use log::{error, info};
use std::sync::{Arc, Mutex};

use crate::backend::storage::traits::{Connection, SettingsStorage};

/// Outcome of a purchase-queue transaction, as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseEvent {
    Purchased,
    Restored,
    Failed { reason: String },
}

#[derive(Clone)]
pub struct ProService<C: Connection> {
    settings_repository: C::SettingsRepository,
    unlocked: Arc<Mutex<bool>>,
}

impl<C: Connection> ProService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            settings_repository: connection.create_settings_repository(),
            unlocked: Arc::new(Mutex::new(false)),
        }
    }

    /// Load the persisted unlock flag; called once at startup
    pub fn load_persisted_status(&self) -> Result<bool> {
        let settings = self.settings_repository.get_settings()?;
        *self.unlocked.lock().unwrap() = settings.pro_unlocked;
        Ok(settings.pro_unlocked)
    }

    /// Whether pro features are currently unlocked
    pub fn is_unlocked(&self) -> bool {
        *self.unlocked.lock().unwrap()
    }

    /// Fold one purchase event into the unlock state.
    ///
    /// Purchased and Restored both unlock and persist; a failure is logged
    /// and leaves the state as it was. Returns the resulting state.
    pub fn handle_purchase_event(&self, event: PurchaseEvent) -> Result<bool> {
        match event {
            PurchaseEvent::Purchased | PurchaseEvent::Restored => {
                let mut settings = self.settings_repository.get_settings()?;
                settings.pro_unlocked = true;
                self.settings_repository.update_settings(&settings)?;
                *self.unlocked.lock().unwrap() = true;
                info!("Pro version unlocked");
            }
            PurchaseEvent::Failed { reason } => {
                error!("Purchase transaction failed: {}", reason);
            }
        }
        Ok(self.is_unlocked())
    }
}
