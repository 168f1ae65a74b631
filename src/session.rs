//! One conversion job at a time: file selection, upload, processing, and downloads
//!
//! The session is polled once per frame. Replies from the backend arrive through
//! [`PendingRequest`] handles tagged with the job they belong to, so a reply that
//! lands after a reset or a new selection is dropped instead of applied.

use std::time::Duration;

use depthify_integration::{
    validate_image, DownloadArtifact, DownloadFormat, IntegrationError, JobBackend, ObjectType,
    PendingRequest, ProcessResponse, ProjectId, ProjectResult, UploadJob, UserId,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::phases::{PhaseSequencer, ProcessingPhase};
use crate::state::JobState;

/// Identifies one job attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JobId(Uuid);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Image chosen for the current job
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

enum Request {
    Upload(PendingRequest<ProjectId>),
    Process(PendingRequest<ProcessResponse>),
    Download(ProjectId, DownloadFormat, PendingRequest<Vec<u8>>),
}

enum Reply {
    Upload(Result<ProjectId, IntegrationError>),
    Process(Result<ProcessResponse, IntegrationError>),
    Download(ProjectId, DownloadFormat, Result<Vec<u8>, IntegrationError>),
}

impl Request {
    fn try_recv(&self) -> Option<Reply> {
        match self {
            Request::Upload(pending) => pending.try_recv().map(Reply::Upload),
            Request::Process(pending) => pending.try_recv().map(Reply::Process),
            Request::Download(id, format, pending) => pending
                .try_recv()
                .map(|result| Reply::Download(id.clone(), *format, result)),
        }
    }
}

struct InFlight {
    job: JobId,
    request: Request,
}

/// Client-side workflow for converting one image into a model
pub struct JobSession<B: JobBackend> {
    backend: B,
    owner: UserId,
    phase_dwell: Duration,

    job: JobId,
    state: JobState,
    file: Option<SelectedFile>,
    project_id: Option<ProjectId>,
    sequencer: Option<PhaseSequencer>,
    /// Processing reply held until the phase sequence finishes
    processed: Option<ProjectResult>,
    result: Option<ProjectResult>,
    error: Option<IntegrationError>,

    downloading: Option<DownloadFormat>,
    download_error: Option<IntegrationError>,
    artifact: Option<DownloadArtifact>,

    in_flight: Vec<InFlight>,
}

impl<B: JobBackend> JobSession<B> {
    pub fn new(backend: B, owner: UserId, phase_dwell: Duration) -> Self {
        Self {
            backend,
            owner,
            phase_dwell,
            job: JobId::new(),
            state: JobState::Empty,
            file: None,
            project_id: None,
            sequencer: None,
            processed: None,
            result: None,
            error: None,
            downloading: None,
            download_error: None,
            artifact: None,
            in_flight: Vec::new(),
        }
    }

    /// Choose an image. Starts a new job; anything still in flight for the
    /// previous one is ignored when it resolves.
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.begin_job();
        let name = name.into();
        debug!("Selected '{}' ({} bytes)", name, bytes.len());
        self.file = Some(SelectedFile { name, bytes });
        self.transition(JobState::FileSelected);
    }

    /// Send the selected image. A file that is not an accepted image moves the
    /// job to `Error` without contacting the backend.
    pub fn submit(&mut self, project_name: &str, object_type: ObjectType) -> Result<(), IntegrationError> {
        let file = match (&self.file, self.state) {
            (Some(file), JobState::FileSelected) => file,
            _ => return Err(IntegrationError::Validation("Select an image file first".into())),
        };

        if let Err(err) = validate_image(&file.bytes) {
            self.fail(err.clone());
            return Err(err);
        }

        let job = UploadJob::new(
            file.name.clone(),
            file.bytes.clone(),
            project_name,
            object_type,
            self.owner.clone(),
        );
        info!("Uploading '{}' as '{}' ({})", job.file_name, job.effective_project_name(), object_type);

        let pending = self.backend.upload(job);
        self.track(Request::Upload(pending));
        self.transition(JobState::Uploading);
        Ok(())
    }

    /// Start processing the uploaded project and the phase sequence alongside it
    pub fn process(&mut self) -> Result<(), IntegrationError> {
        let project_id = match (&self.project_id, self.state) {
            (Some(id), JobState::Uploaded) => id.clone(),
            _ => return Err(IntegrationError::Validation("Upload an image before processing".into())),
        };

        info!("Processing project {}", project_id);
        let pending = self.backend.process(project_id);
        self.track(Request::Process(pending));
        self.sequencer = Some(PhaseSequencer::new(self.phase_dwell));
        self.processed = None;
        self.transition(JobState::Processing);
        Ok(())
    }

    /// Request the model in `format`. Failures are reported through
    /// [`JobSession::download_error`] and leave the completed result in place.
    pub fn download(&mut self, format: DownloadFormat) -> Result<(), IntegrationError> {
        let project_id = match (&self.project_id, self.state) {
            (Some(id), JobState::Completed) => id.clone(),
            _ => return Err(IntegrationError::Download("The model is not ready yet".into())),
        };
        if self.downloading.is_some() {
            return Err(IntegrationError::Download("A download is already in progress".into()));
        }

        info!("Downloading project {} as {}", project_id, format);
        let pending = self.backend.download(project_id.clone());
        self.track(Request::Download(project_id, format, pending));
        self.downloading = Some(format);
        self.download_error = None;
        Ok(())
    }

    /// Clear the job and return to `Empty`. Requests already sent are not
    /// cancelled; their replies are dropped.
    pub fn reset(&mut self) {
        self.begin_job();
        self.transition(JobState::Empty);
    }

    /// Advance the phase sequence by `delta` and apply any replies that arrived.
    /// Returns the processing phase entered during this call, if any.
    pub fn poll(&mut self, delta: Duration) -> Option<ProcessingPhase> {
        let entered = match (&mut self.sequencer, self.state) {
            (Some(sequencer), JobState::Processing) => sequencer.advance(delta),
            _ => None,
        };

        let mut ready = Vec::new();
        self.in_flight.retain(|flight| match flight.request.try_recv() {
            Some(reply) => {
                ready.push((flight.job, reply));
                false
            }
            None => true,
        });

        for (job, reply) in ready {
            if job != self.job {
                debug!("Dropping reply from an abandoned job");
                continue;
            }
            self.apply(reply);
        }

        self.try_complete();
        entered
    }

    fn apply(&mut self, reply: Reply) {
        match reply {
            Reply::Upload(Ok(project_id)) => {
                info!("Upload created project {}", project_id);
                self.project_id = Some(project_id);
                self.transition(JobState::Uploaded);
            }
            Reply::Process(Ok(response)) => {
                let result = ProjectResult::from_response(&response);
                debug!(
                    "Processing finished on the server: {} vertices, {} faces",
                    result.vertex_count, result.face_count
                );
                self.processed = Some(result);
            }
            Reply::Upload(Err(err)) | Reply::Process(Err(err)) => self.fail(err),
            Reply::Download(project_id, format, Ok(bytes)) => {
                self.downloading = None;
                let artifact = DownloadArtifact::new(project_id, format, bytes);
                info!("Downloaded {} ({} bytes)", artifact.file_name, artifact.bytes.len());
                self.artifact = Some(artifact);
            }
            Reply::Download(_, format, Err(err)) => {
                self.downloading = None;
                warn!("{} download failed: {}", format, err);
                self.download_error = Some(err);
            }
        }
    }

    /// Completed only once the server has answered and every phase was shown
    fn try_complete(&mut self) {
        if self.state != JobState::Processing {
            return;
        }
        let sequence_done = self.sequencer.as_ref().map_or(true, PhaseSequencer::is_finished);
        if !sequence_done || self.processed.is_none() {
            return;
        }

        self.result = self.processed.take();
        self.sequencer = None;
        self.transition(JobState::Completed);
        info!("Project {:?} completed", self.project_id.as_ref().map(ProjectId::as_str));
    }

    fn fail(&mut self, err: IntegrationError) {
        warn!("Job failed: {}", err);
        self.error = Some(err);
        self.sequencer = None;
        self.processed = None;
        self.transition(JobState::Error);
    }

    fn begin_job(&mut self) {
        let abandoned = self.in_flight.iter().filter(|f| f.job == self.job).count();
        if abandoned > 0 {
            debug!("Abandoning {} in-flight request(s)", abandoned);
        }
        self.job = JobId::new();
        self.file = None;
        self.project_id = None;
        self.sequencer = None;
        self.processed = None;
        self.result = None;
        self.error = None;
        self.downloading = None;
        self.download_error = None;
        self.artifact = None;
    }

    fn track(&mut self, request: Request) {
        self.in_flight.push(InFlight { job: self.job, request });
    }

    fn transition(&mut self, next: JobState) {
        debug_assert!(self.state.allows(next), "{:?} -> {:?}", self.state, next);
        debug!("Job state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    /// Metrics of the completed project
    pub fn result(&self) -> Option<&ProjectResult> {
        self.result.as_ref()
    }

    /// Why the job entered `Error`
    pub fn error(&self) -> Option<&IntegrationError> {
        self.error.as_ref()
    }

    /// Phase label to show while processing
    pub fn current_phase(&self) -> Option<ProcessingPhase> {
        match (&self.sequencer, self.state) {
            (Some(sequencer), JobState::Processing) => Some(sequencer.current()),
            _ => None,
        }
    }

    pub fn phase_progress(&self) -> f32 {
        self.sequencer.as_ref().map_or(0.0, PhaseSequencer::progress)
    }

    /// Formats offered once the job has completed
    pub fn download_options(&self) -> &'static [DownloadFormat] {
        if self.state == JobState::Completed {
            &DownloadFormat::ALL
        } else {
            &[]
        }
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading.is_some()
    }

    pub fn download_error(&self) -> Option<&IntegrationError> {
        self.download_error.as_ref()
    }

    /// Hand over a finished download
    pub fn take_artifact(&mut self) -> Option<DownloadArtifact> {
        self.artifact.take()
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
