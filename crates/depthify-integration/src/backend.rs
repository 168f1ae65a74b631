//! Data-access seam used by the job workflow

use crate::client::PendingRequest;
use crate::types::{ProcessResponse, ProjectId};
use crate::upload::UploadJob;

/// The three calls one conversion job makes. Implemented by
/// [`IntegrationClient`](crate::IntegrationClient) against the real backend;
/// tests and offline front ends can supply their own.
pub trait JobBackend {
    /// Upload the image and create a project
    fn upload(&self, job: UploadJob) -> PendingRequest<ProjectId>;

    /// Run the conversion for an uploaded project
    fn process(&self, project_id: ProjectId) -> PendingRequest<ProcessResponse>;

    /// Fetch the artifact of a completed project
    fn download(&self, project_id: ProjectId) -> PendingRequest<Vec<u8>>;
}
