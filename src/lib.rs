//! Library crate for userdesk.
//!
//! This crate exposes the building blocks of the console:
//! - HTTP boundary to the user service (`api`)
//! - Application state and update loop (`app`)
//! - Command-line configuration (`config`)
//! - Error types (`error`)
//! - The add-user draft (`form`)
//! - Response shape normalization (`normalize`)
//! - Toast notifications (`notify`)
//! - In-memory search (`search`)
//! - The canonical user list and its single-flight operations (`store`)
//! - UI rendering (`ui`)
//!
//! It is used by the `userdesk` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod search;
pub mod store;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
pub use error::{Result, StoreError, TransportError, ValidationError};
pub use model::UserRecord;
