//! Business logic services for the application layer.

pub mod acquisition_service;
pub mod auth_service;
pub mod management_service;

pub use acquisition_service::{
    AcquisitionService, DeployReport, UpdateCheckRequest, UpdateCheckResult,
};
pub use auth_service::AuthService;
pub use management_service::ManagementService;
