//! Core domain entities representing the release data model.
//!
//! Entities are plain data structures. Persistence lives behind
//! [`crate::domain::repositories::Storage`].
//!
//! # Entity Types
//!
//! - [`Account`] - A user of the management API
//! - [`App`] - An application registered by an account
//! - [`Deployment`] - A named release channel of an app (`Staging`, `Production`, ...)
//! - [`Package`] - A released update bundle
//! - [`StatusReport`] - A deploy/download report sent by a client SDK

pub mod account;
pub mod app;
pub mod package;

pub use account::Account;
pub use app::{App, DEFAULT_DEPLOYMENTS, Deployment};
pub use package::{DeploymentStatus, NewPackage, Package, PackageMetrics, StatusReport};
