//! Shared building blocks for Snippetbox.
//!
//! This crate holds the small pieces every other layer agrees on:
//!
//! - **Identifiers** ([`UserId`], [`SnippetId`]) — newtypes so a user
//!   reference can never be passed where a snippet reference is expected.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how session values are
//!   turned into bytes before they reach a session store, and back.
//! - **Errors** ([`CodecError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! ```text
//! Models (users, snippets) ─┐
//!                           ├─→ Core (ids, codec)
//! Session (tokens, values) ─┘
//! ```
//!
//! Nothing in here knows about sessions, stores, or requests.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::CodecError;
pub use types::{ParseSnippetIdError, SnippetId, UserId};
