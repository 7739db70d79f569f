// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AccessPolicy, TokenCodec};
use crate::store::InMemoryStore;

/// Shared application state.
///
/// The codec and policy are fixed at startup; only the store is mutable.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenCodec>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(store: InMemoryStore, tokens: TokenCodec) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            tokens: Arc::new(tokens),
            policy: Arc::new(AccessPolicy::clinic()),
        }
    }

    /// Replace the access policy.
    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }
}
