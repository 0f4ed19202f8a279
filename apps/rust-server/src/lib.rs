// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Agora - community platform API server
//!
//! Every data-carrying response is sealed in an authenticated-encryption
//! envelope `{ v, iv, data }`; the browser holds the shared secret and opens
//! it before use.
//!
//! ## Modules
//!
//! - `envelope` - Response envelope codec (AES-256-GCM)
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session authentication (HS256 JWT)
//! - `client` - Consuming fetch layer for sealed responses
//! - `db` / `store` - Lazily connected in-memory content store
//! - `events` - Typed in-process event bus

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod events;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
