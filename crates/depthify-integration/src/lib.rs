//! Depthify Integration - Depthify backend API client
//!
//! Provides image upload, processing, artifact download, and the read-only
//! project, gallery, and account endpoints.

pub mod error;
pub mod types;
pub mod upload;
pub mod auth;
pub mod projects;
pub mod gallery;
pub mod backend;
pub mod client;

pub use backend::JobBackend;
pub use client::{ClientConfig, IntegrationClient, PendingRequest};
pub use error::{IntegrationError, Operation};
pub use types::*;
pub use upload::{validate_image, UploadJob};
