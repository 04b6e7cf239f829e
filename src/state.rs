//! Per-router shared state.

use std::sync::Arc;

use crate::application::services::{AcquisitionService, ManagementService};
use crate::domain::repositories::Storage;

#[derive(Clone)]
pub struct AcquisitionState {
    pub service: Arc<AcquisitionService>,
    /// Absolute base URL prefixed to package download links.
    pub public_url: Arc<str>,
}

#[derive(Clone)]
pub struct HealthState {
    pub storage: Arc<dyn Storage>,
}

#[derive(Clone)]
pub struct ManagementState {
    pub service: Arc<ManagementService>,
}
