// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encrypted Response Envelope
//!
//! Every API route that returns user or domain data sends its JSON body
//! through this module instead of `axum::Json`. The body is sealed with
//! AES-256-GCM under a key derived from the server-held secret, so the
//! plaintext never appears on the wire.
//!
//! ## Wire Format
//!
//! ```text
//! {
//!   "v":    1,                       // envelope version (bound as AAD)
//!   "iv":   "<base64, 12 bytes>",    // random nonce, fresh per response
//!   "data": "<base64 ciphertext+tag>"
//! }
//! ```
//!
//! The plaintext is the complete response object, including the
//! application-level `success` flag, e.g.
//! `{"boardMembers":[{"name":"Ada"}],"success":true}`.
//!
//! ## Exemptions
//!
//! Only two kinds of responses bypass the envelope, and both carry no user
//! or domain data:
//!
//! - deprecated routes, which answer `410 Gone` with a plain `{ "message" }`
//!   notice (see [`crate::api::deprecated`])
//! - liveness/readiness probes under `/health`
//!
//! ## Failure Semantics
//!
//! - Encoding fails closed: a payload that cannot be serialized is replaced
//!   by a sealed generic failure with status 500.
//! - Decoding never returns partial data: malformed envelopes, bit flips in
//!   the nonce or ciphertext, and wrong secrets all surface as a
//!   [`DecodeError`].

pub mod codec;
pub mod key;

pub use codec::{
    DecodeError, EncodeError, EncodeOptions, EnvelopeCodec, FailureBody, SealedEnvelope,
    ENVELOPE_VERSION,
};
pub use key::{EnvelopeKey, KeyError, MIN_SECRET_LEN};
