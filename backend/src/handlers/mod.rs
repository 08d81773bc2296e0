//! HTTP handlers for the Cannabis Wholesale Management Platform

pub mod auth;
pub mod dispensary;
pub mod health;
pub mod insights;
pub mod order;
pub mod product;
pub mod reporting;
pub mod role;

pub use auth::*;
pub use dispensary::*;
pub use health::*;
pub use insights::*;
pub use order::*;
pub use product::*;
pub use reporting::*;
pub use role::*;
