// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session JWT verification for the Agora API.
//!
//! ## Auth Flow
//!
//! 1. The login flow (password plus optional two-factor step, handled
//!    outside this service) issues an HS256 session JWT
//! 2. The browser sends it back as the session cookie (`token` by default);
//!    non-browser clients may send `Authorization: Bearer <JWT>` instead
//! 3. The server:
//!    - verifies signature and expiry in [`middleware::session_middleware`]
//!    - attaches the [`AuthenticatedUser`] to the request
//!    - handlers pull it out with the [`Auth`] / [`ModeratorOnly`] / [`AdminOnly`]
//!      extractors
//!
//! ## Security
//!
//! - A present-but-invalid token is rejected outright, never treated as
//!   anonymous
//! - Rejections go through the response envelope like any other failure
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, ModeratorOnly};
pub use roles::Role;
pub use token::AuthConfig;
