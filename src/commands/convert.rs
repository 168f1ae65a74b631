//! `depthify convert`: upload an image, process it, and save the model

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use depthify_core::FrameTime;
use depthify_integration::{DownloadFormat, IntegrationClient, JobBackend, ObjectType, UserId};
use tracing::{debug, info};

use crate::session::JobSession;
use crate::settings::Settings;
use crate::state::JobState;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Image to convert (PNG, JPEG, GIF, BMP or WebP)
    pub image: PathBuf,

    /// Project name; defaults to the file name without its extension
    #[arg(long, default_value = "")]
    pub name: String,

    /// Object-type hint: auto, fruit, geometric, organic, or flat
    #[arg(long, default_value_t = ObjectType::Auto)]
    pub object_type: ObjectType,

    /// Formats to download once processing completes
    #[arg(long = "format", value_delimiter = ',', default_values_t = vec![DownloadFormat::Ply])]
    pub formats: Vec<DownloadFormat>,

    /// Directory downloaded models are written to
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Upload on behalf of this user instead of the configured one
    #[arg(long, conflicts_with = "email")]
    pub user_id: Option<String>,

    /// Sign in before uploading and upload as that user
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    #[arg(long, requires = "email")]
    pub password: Option<String>,
}

/// Explicit `--user-id` wins, then the signed-in user, then the configured owner.
fn upload_owner(explicit: Option<String>, signed_in: Option<UserId>, settings: &Settings) -> UserId {
    explicit
        .map(UserId::new)
        .or(signed_in)
        .unwrap_or_else(|| settings.api.user_id())
}

/// Polls a session at the configured frame rate, printing phase changes
struct FramePump {
    time: FrameTime,
    last: Instant,
    state: JobState,
}

impl FramePump {
    fn new(settings: &Settings) -> Self {
        Self {
            time: FrameTime::new(settings.time_config()),
            last: Instant::now(),
            state: JobState::Empty,
        }
    }

    fn until<B: JobBackend>(&mut self, session: &mut JobSession<B>, mut done: impl FnMut(&JobSession<B>) -> bool) {
        let interval = self.time.config.frame_interval();
        while !done(session) {
            thread::sleep(interval);
            let now = Instant::now();
            self.time.update(now - self.last);
            self.last = now;

            if let Some(phase) = session.poll(self.time.delta()) {
                println!("  [{:>3.0}%] {}", session.phase_progress() * 100.0, phase.label());
            }
            if session.state() != self.state {
                self.state = session.state();
                debug!("Job: {}", self.state);
            }
        }
    }
}

fn ensure_not_failed<B: JobBackend>(session: &JobSession<B>) -> Result<()> {
    if session.state() == JobState::Error {
        let message = session.error().map(|e| e.message()).unwrap_or_default();
        bail!(message);
    }
    Ok(())
}

pub fn run(settings: &Settings, args: ConvertArgs) -> Result<()> {
    let bytes = fs::read(&args.image).with_context(|| format!("Failed to read {}", args.image.display()))?;
    let file_name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let client = IntegrationClient::new(settings.client_config())?;
    if let (Some(email), Some(password)) = (args.email, args.password) {
        let user = client.login(email, password).wait()?;
        println!("Signed in as {}", user.display_name());
    }
    let owner = upload_owner(args.user_id, client.current_user_id(), settings);

    let mut session = JobSession::new(client, owner, settings.processing.phase_dwell());
    let mut pump = FramePump::new(settings);

    session.select_file(file_name, bytes);
    session.submit(&args.name, args.object_type)?;
    if let Some(file) = session.file() {
        println!("Uploading {} ({} KB)...", file.name, file.bytes.len() / 1024);
    }
    pump.until(&mut session, |s| s.state() != JobState::Uploading);
    ensure_not_failed(&session)?;

    session.process()?;
    if let Some(phase) = session.current_phase() {
        println!("  [  0%] {}", phase.label());
    }
    pump.until(&mut session, |s| s.state() != JobState::Processing);
    ensure_not_failed(&session)?;

    let project_id = session
        .project_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    if let Some(result) = session.result() {
        println!("Model ready (project {})", project_id);
        println!("  Vertices:        {}", result.vertices_display());
        println!("  Faces:           {}", result.faces_display());
        println!("  Processing time: {}", result.processing_time_display());
    }

    let directory = args.output.unwrap_or_else(|| settings.downloads.directory.clone());
    let mut failures = 0;
    for format in args.formats {
        session.download(format)?;
        pump.until(&mut session, |s| !s.is_downloading());

        if let Some(err) = session.download_error() {
            eprintln!("{}: {}", format.label(), err);
            failures += 1;
            continue;
        }
        if let Some(artifact) = session.take_artifact() {
            fs::create_dir_all(&directory)
                .with_context(|| format!("Failed to create {}", directory.display()))?;
            let path = directory.join(&artifact.file_name);
            fs::write(&path, &artifact.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {:?}", artifact.bytes.len(), path);
            println!("Saved {}", path.display());
        }
    }

    if failures > 0 {
        bail!("{} download(s) failed", failures);
    }
    Ok(())
}
