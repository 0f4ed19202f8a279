// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::db::{Database, StoreHandle};
use crate::envelope::EnvelopeCodec;
use crate::error::ApiError;
use crate::events::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub codec: EnvelopeCodec,
    pub auth: Arc<AuthConfig>,
    pub events: EventBus,
}

impl AppState {
    pub fn new(db: Database, codec: EnvelopeCodec, auth: AuthConfig) -> Self {
        Self {
            db: Arc::new(db),
            codec,
            auth: Arc::new(auth),
            events: EventBus::new(),
        }
    }

    /// The shared store, mapped into a handler error on connection failure.
    pub async fn store(&self) -> Result<StoreHandle, ApiError> {
        Ok(self.db.connection().await?)
    }

    /// State over a pre-populated store with fixed test secrets.
    #[cfg(test)]
    pub fn for_tests(store: crate::store::InMemoryStore) -> Self {
        Self::new(
            Database::with_store(store),
            EnvelopeCodec::from_secret(crate::test_support::RESPONSE_SECRET)
                .expect("test secret is long enough"),
            AuthConfig::new(crate::test_support::JWT_SECRET, "token"),
        )
    }
}
