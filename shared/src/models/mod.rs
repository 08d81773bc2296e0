//! Domain models for the Cannabis Wholesale Management Platform

pub mod dispensary;
pub mod insights;
pub mod order;
pub mod product;
pub mod user;

pub use dispensary::*;
pub use insights::*;
pub use order::*;
pub use product::*;
pub use user::*;
