use std::sync::Arc;

use slotswap_core::negotiation::NegotiationEngine;
use slotswap_core::ports::Stores;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Built once at startup and cloned per request; every field is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Store handles (slots, swap requests, users, health).
    pub stores: Stores,
    /// Negotiation engine over the same stores.
    pub engine: NegotiationEngine,
    /// Server configuration (read by the auth extractor and handlers).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(stores: Stores, config: ServerConfig) -> Self {
        let engine = NegotiationEngine::from_stores(&stores);
        Self {
            stores,
            engine,
            config: Arc::new(config),
        }
    }
}
