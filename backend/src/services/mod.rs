//! Business logic services for the Cannabis Wholesale Management Platform

pub mod auth;
pub mod catalog;
pub mod dispensary;
pub mod insights;
pub mod order;
pub mod reporting;
pub mod role;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use dispensary::DispensaryService;
pub use insights::InsightsService;
pub use order::OrderService;
pub use reporting::ReportingService;
pub use role::RoleService;
