//! qn-kodo: Kodo HTTP adapter for qncli
//!
//! This crate implements the StorageGateway trait from qn-core over the Kodo
//! REST endpoints using reqwest. It is the only crate that talks to the
//! network or knows the request signing scheme.

pub mod auth;
pub mod client;
mod model;

pub use auth::{Auth, encode_entry, urlsafe_b64};
pub use client::KodoClient;
