//! Remote store for Haven: the Cloudflare D1 HTTP query API.
//!
//! Each statement is one `POST .../query` carrying `{"sql", "params"}` and a
//! bearer token. Responses arrive in D1's `{success, result, errors}`
//! envelope and are unwrapped into plain [`haven_core::Row`]s.

mod client;
mod config;
mod envelope;

pub mod error;

pub use client::RemoteStore;
pub use config::{DEFAULT_API_BASE, RemoteConfig, is_placeholder};
pub use envelope::rows_from_result;
pub use error::{Error, Result};
