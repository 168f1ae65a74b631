use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::auth::AuthManager;
use crate::backend::JobBackend;
use crate::error::IntegrationError;
use crate::gallery::GalleryApi;
use crate::projects::ProjectApi;
use crate::types::*;
use crate::upload::UploadJob;

/// Backend address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// A non-blocking handle to an in-flight async request.
/// Call `try_recv()` each frame to check for results without blocking the caller's loop.
pub struct PendingRequest<T> {
    receiver: mpsc::Receiver<Result<T, IntegrationError>>,
}

impl<T> PendingRequest<T> {
    /// Create a handle together with the sender that completes it
    pub fn channel() -> (mpsc::Sender<Result<T, IntegrationError>>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { receiver: rx })
    }

    /// A handle that is already resolved
    pub fn ready(result: Result<T, IntegrationError>) -> Self {
        let (tx, pending) = Self::channel();
        let _ = tx.send(result);
        pending
    }

    /// Non-blocking check for the result. Returns `None` if still pending.
    pub fn try_recv(&self) -> Option<Result<T, IntegrationError>> {
        self.receiver.try_recv().ok()
    }

    /// Blocking wait for the result. Only use outside a frame loop.
    pub fn wait(self) -> Result<T, IntegrationError> {
        self.receiver
            .recv()
            .map_err(|_| IntegrationError::Runtime("request channel closed".into()))?
    }
}

/// Connection settings for [`IntegrationClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash
    pub base_url: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Facade for all backend interactions.
/// Owns a background tokio runtime and dispatches async work via channels.
pub struct IntegrationClient {
    runtime: tokio::runtime::Runtime,
    auth: Arc<AuthManager>,
    project_api: Arc<ProjectApi>,
    gallery_api: Arc<GalleryApi>,
    online: Arc<AtomicBool>,
}

impl IntegrationClient {
    /// Create a new integration client with a background tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self, IntegrationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| IntegrationError::Runtime(format!("Failed to create runtime: {}", e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| IntegrationError::Runtime(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("Integration client targeting {}", base_url);

        Ok(Self {
            runtime,
            auth: Arc::new(AuthManager::new(client.clone(), base_url.clone())),
            project_api: Arc::new(ProjectApi::new(client.clone(), base_url.clone())),
            gallery_api: Arc::new(GalleryApi::new(client, base_url)),
            online: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Run a request on the background runtime, recording reachability from its outcome
    fn spawn<T, F>(&self, request: F) -> PendingRequest<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, IntegrationError>> + Send + 'static,
    {
        let (tx, pending) = PendingRequest::channel();
        let online = Arc::clone(&self.online);

        self.runtime.spawn(async move {
            let result = request.await;
            match &result {
                Ok(_) => online.store(true, Ordering::Relaxed),
                Err(IntegrationError::Validation(_)) => {}
                Err(_) => online.store(false, Ordering::Relaxed),
            }
            let _ = tx.send(result);
        });

        pending
    }

    /// Log in with email and password.
    pub fn login(&self, email: String, password: String) -> PendingRequest<UserInfo> {
        let auth = Arc::clone(&self.auth);
        self.spawn(async move { auth.login(email, password).await })
    }

    /// Create an account and sign in as it.
    pub fn signup(&self, request: SignupRequest) -> PendingRequest<UserInfo> {
        let auth = Arc::clone(&self.auth);
        self.spawn(async move { auth.signup(request).await })
    }

    /// List the projects of a user.
    pub fn list_projects(&self, user_id: UserId) -> PendingRequest<Vec<Project>> {
        let api = Arc::clone(&self.project_api);
        self.spawn(async move { api.list(&user_id).await })
    }

    /// Fetch a project by ID.
    pub fn fetch_project(&self, project_id: ProjectId) -> PendingRequest<Project> {
        let api = Arc::clone(&self.project_api);
        self.spawn(async move { api.get(&project_id).await })
    }

    /// Fetch the public gallery.
    pub fn gallery(&self) -> PendingRequest<Vec<GalleryItem>> {
        let api = Arc::clone(&self.gallery_api);
        self.spawn(async move { api.gallery().await })
    }

    /// Check backend health.
    pub fn health(&self) -> PendingRequest<HealthStatus> {
        let api = Arc::clone(&self.gallery_api);
        self.spawn(async move { api.health().await })
    }

    /// Fetch aggregate counters.
    pub fn stats(&self) -> PendingRequest<Stats> {
        let api = Arc::clone(&self.gallery_api);
        self.spawn(async move { api.stats().await })
    }

    /// Whether the server appears to be online (based on last request result).
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// The signed-in user's ID, if any.
    pub fn current_user_id(&self) -> Option<UserId> {
        self.auth.user_id()
    }
}

impl JobBackend for IntegrationClient {
    fn upload(&self, job: UploadJob) -> PendingRequest<ProjectId> {
        // Rejected files never reach the runtime.
        if let Err(err) = job.validate() {
            return PendingRequest::ready(Err(err));
        }
        let api = Arc::clone(&self.project_api);
        self.spawn(async move { api.upload(job).await })
    }

    fn process(&self, project_id: ProjectId) -> PendingRequest<ProcessResponse> {
        let api = Arc::clone(&self.project_api);
        self.spawn(async move { api.process(&project_id).await })
    }

    fn download(&self, project_id: ProjectId) -> PendingRequest<Vec<u8>> {
        let api = Arc::clone(&self.project_api);
        self.spawn(async move { api.download(&project_id).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_request_try_recv_none_then_result() {
        let (tx, pending) = PendingRequest::<String>::channel();

        // Before sending, should return None
        assert!(pending.try_recv().is_none());

        tx.send(Ok("hello".to_string())).unwrap();

        let result = pending.try_recv();
        assert!(result.is_some());
        assert_eq!(result.unwrap().unwrap(), "hello");
    }

    #[test]
    fn test_pending_request_wait() {
        let (tx, pending) = PendingRequest::<u32>::channel();
        tx.send(Ok(42)).unwrap();
        assert_eq!(pending.wait().unwrap(), 42);
    }

    #[test]
    fn test_pending_request_ready_error() {
        let pending: PendingRequest<String> =
            PendingRequest::ready(Err(IntegrationError::Download("Download failed".into())));
        let result = pending.try_recv();
        assert!(matches!(result, Some(Err(IntegrationError::Download(_)))));
    }

    #[test]
    fn test_wait_on_dropped_sender_is_an_error() {
        let (tx, pending) = PendingRequest::<u32>::channel();
        drop(tx);
        assert!(pending.wait().is_err());
    }

    #[test]
    fn test_upload_of_non_image_resolves_without_network() {
        let client = IntegrationClient::new(ClientConfig {
            // Nothing listens here; a request would fail with an Upload error instead.
            base_url: "http://127.0.0.1:9".into(),
            timeout: Some(Duration::from_secs(1)),
        })
        .unwrap();
        let job = UploadJob::new("notes.txt", b"plain text".to_vec(), "notes", ObjectType::Auto, UserId::new("1"));

        let result = client.upload(job).wait();
        assert!(matches!(result, Err(IntegrationError::Validation(_))));
        assert!(!client.is_online());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig {
            base_url: "http://example.test/".into(),
            timeout: None,
        };
        assert!(IntegrationClient::new(config).is_ok());
    }
}
