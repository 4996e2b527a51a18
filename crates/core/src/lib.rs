//! # FIH Core
//!
//! Core business logic for the Freetown International Hospital management system.
//!
//! This crate contains the record model and everything that changes it:
//! - [`store`]: the snapshot-backed record store and the single-writer task that owns it
//! - [`workflow`]: pure patient visit transitions (consultation, lab order, lab completion)
//! - [`coordinator`]: the in-memory view desks read from, and the only issuer of writes
//! - [`search`], [`export`], [`auth`]: list queries, CSV export and role passphrases
//!
//! **No presentation concerns**: rendering, printing and view routing belong to whatever front
//! end drives the [`Coordinator`]. Advisory calls live in `fih-advisory`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod export;
pub mod model;
pub mod search;
pub mod store;
pub mod validation;
pub mod workflow;

mod error;

pub use config::CoreConfig;
pub use coordinator::{Coordinator, SyncStatus};
pub use error::{HospitalError, HospitalResult};
