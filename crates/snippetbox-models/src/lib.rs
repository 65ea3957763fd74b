//! Snippet and user persistence for Snippetbox.
//!
//! The rest of the system reaches storage only through two narrow traits:
//!
//! - [`SnippetModel`] — insert, fetch, and list short-lived snippets
//! - [`UserModel`] — register users and check their credentials
//!
//! Both report failures through the closed [`ModelError`] enum so call sites
//! can match every case. In-memory implementations ([`MemorySnippets`],
//! [`MemoryUsers`]) back tests, demos, and single-process deployments;
//! a relational implementation only has to honour the same traits.

#![allow(async_fn_in_trait)]

mod error;
mod snippet;
mod user;

pub use error::ModelError;
pub use snippet::{LATEST_LIMIT, MemorySnippets, Snippet, SnippetModel};
pub use user::{MemoryUsers, User, UserModel};
