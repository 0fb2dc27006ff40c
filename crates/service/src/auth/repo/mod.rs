//! Concrete `UserStore` backends and the factory that picks one from config.

pub mod memory;

use std::sync::Arc;

use configs::StoreConfig;
use tracing::info;

use super::errors::StoreError;
use super::repository::UserStore;
use memory::{demo_users, seed_user, InMemoryUserStore};

/// Build the user store described by `cfg`.
pub fn build_user_store(cfg: &StoreConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    match cfg {
        StoreConfig::InMemory { seed_demo_users, users } => {
            let mut seed = if *seed_demo_users { demo_users() } else { Vec::new() };
            seed.extend(users.iter().map(seed_user));
            let count = seed.len();
            let store = InMemoryUserStore::with_users(seed)?;
            info!(backend = "in_memory", seeded = count, "user store ready");
            Ok(Arc::new(store))
        }
    }
}
