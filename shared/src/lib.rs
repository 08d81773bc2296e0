//! Shared types and domain logic for the Cannabis Wholesale Management Platform
//!
//! This crate contains the models and pure computation core shared between the
//! backend, the frontend (via WASM), and other components of the system.

pub mod catalog;
pub mod insights;
pub mod models;
pub mod ordering;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use insights::*;
pub use models::*;
pub use ordering::*;
pub use types::*;
pub use validation::*;
