//! Per-visitor carts held in memory.
//!
//! The session only carries a [`CartId`]; the cart itself lives here behind a
//! per-cart lock. Every command runs under that lock, so concurrent requests
//! from one visitor (two tabs, a double submit) are applied one after another
//! and never overwrite each other.
//!
//! Carts are evicted after the session expiry without access, mirroring the
//! session store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bookstore_core::{CartCommand, CartEvent, CartState};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Identifier of a visitor's cart, stored in their session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(Uuid);

impl CartId {
    /// Generate a fresh random cart id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// In-memory carts keyed by [`CartId`].
///
/// Cheap to clone; clones share the same carts.
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<CartId, Arc<Mutex<CartState>>>,
}

impl CartStore {
    /// Create a store holding at most `max_carts` carts, each dropped after
    /// `idle` without access.
    #[must_use]
    pub fn new(max_carts: u64, idle: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(max_carts)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// Current contents of a cart; an unknown id is an empty cart.
    pub async fn snapshot(&self, id: CartId) -> CartState {
        match self.carts.get(&id).await {
            Some(cart) => cart.lock().await.clone(),
            None => CartState::new(),
        }
    }

    /// Apply one command to a cart, creating it if needed.
    ///
    /// Returns the cart as it stands right after this command.
    pub async fn apply(&self, id: CartId, command: CartCommand) -> (CartState, CartEvent) {
        let cart = self
            .carts
            .get_with(id, async { Arc::new(Mutex::new(CartState::new())) })
            .await;

        let mut cart = cart.lock().await;
        let event = cart.apply(command);
        (cart.clone(), event)
    }

    /// Number of carts currently held.
    pub async fn cart_count(&self) -> u64 {
        self.carts.run_pending_tasks().await;
        self.carts.entry_count()
    }
}
