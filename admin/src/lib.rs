//! Async host for the Trash Clean client core.
//!
//! # Overview
//! `trashclean-core` builds requests and interprets responses without doing
//! any I/O. This crate supplies the I/O: a reqwest transport with a deadline,
//! a file-backed admin session, an async admin view that runs listing
//! fetches as cancellable tasks, and the configuration the `trashclean`
//! binary runs with.

pub mod config;
pub mod store;
pub mod submit;
pub mod transport;
pub mod view;

pub use config::AdminConfig;
pub use store::FileSessionStore;
pub use submit::{attachment_from_path, submit};
pub use transport::{HttpTransport, ReqwestTransport};
pub use view::{AdminView, Confirm};
