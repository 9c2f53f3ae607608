//! Business logic services layer

pub mod dashboard_service;
pub mod leave_service;
pub mod stats;

pub use dashboard_service::DashboardService;
pub use leave_service::LeaveService;
