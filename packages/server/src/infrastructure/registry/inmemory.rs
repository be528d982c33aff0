//! InMemory Connection Registry 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Binding, ConnectionId, ConnectionRegistry};

#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    bindings: Mutex<HashMap<ConnectionId, Binding>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn bind(&self, identity: ConnectionId, binding: Binding) {
        let mut bindings = self.bindings.lock().await;
        tracing::debug!(
            "Bound '{}' to {}/{}",
            identity,
            binding.room_code,
            binding.display_name
        );
        bindings.insert(identity, binding);
    }

    async fn resolve(&self, identity: &ConnectionId) -> Option<Binding> {
        let bindings = self.bindings.lock().await;
        bindings.get(identity).cloned()
    }

    async fn unbind(&self, identity: &ConnectionId) -> Option<Binding> {
        let mut bindings = self.bindings.lock().await;
        bindings.remove(identity)
    }

    async fn count(&self) -> usize {
        let bindings = self.bindings.lock().await;
        bindings.len()
    }
}
