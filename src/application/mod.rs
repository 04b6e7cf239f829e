//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::Storage`] trait and
//! provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::acquisition_service::AcquisitionService`] - Update checks and status reports
//! - [`services::management_service::ManagementService`] - Apps, deployments and releases
//! - [`services::auth_service::AuthService`] - Access key authentication

pub mod services;
