//! Core types and trait definitions for the Roster user directory.
//!
//! Free of HTTP and database dependencies; every other crate builds on it.

// Store methods spell out `Send` futures explicitly.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod export;
pub mod service;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
pub use service::UserDirectory;
