//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to one router factory in [`crate::api`].

pub mod acquisition;
pub mod auth;
pub mod health;
pub mod management;

pub use acquisition::{
    download_handler, report_deploy_handler, report_download_handler, update_check_handler,
    update_check_snake_handler,
};
pub use health::health_handler;
pub use management::{
    account_handler, create_app_handler, list_apps_handler, list_deployments_handler,
    release_handler,
};
