use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{IntegrationError, Operation};
use crate::types::{
    server_message, ProcessResponse, Project, ProjectDetail, ProjectId, ProjectList, UploadResponse, UserId,
};
use crate::upload::UploadJob;

/// API client for the upload / process / download lifecycle and project reads
pub struct ProjectApi {
    client: Client,
    base_url: String,
}

impl ProjectApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Upload an image and create a project. Validation runs before any request is built.
    pub async fn upload(&self, job: UploadJob) -> Result<ProjectId, IntegrationError> {
        let mime = job.validate()?;
        let project_name = job.effective_project_name();

        let part = Part::bytes(job.bytes)
            .file_name(job.file_name.clone())
            .mime_str(mime)
            .map_err(|e| Operation::Upload.transport(e))?;
        let form = Form::new()
            .part("file", part)
            .text("project_name", project_name.clone())
            .text("object_type", job.object_type.as_str())
            .text("user_id", job.owner_id.to_string());

        let url = format!("{}/api/upload", self.base_url);
        let response = self.client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Operation::Upload.transport(e))?;

        let uploaded: UploadResponse = handle_response(Operation::Upload, response).await?;
        info!("Uploaded '{}' as project {}", project_name, uploaded.project_id);
        Ok(uploaded.project_id)
    }

    /// Trigger server-side conversion and wait for it to finish
    pub async fn process(&self, project_id: &ProjectId) -> Result<ProcessResponse, IntegrationError> {
        let url = format!("{}/api/process/{}", self.base_url, project_id);
        let response = self.client
            .post(&url)
            .send()
            .await
            .map_err(|e| Operation::Process.transport(e))?;

        let processed: ProcessResponse = handle_response(Operation::Process, response).await?;
        info!("Project {} processed", project_id);
        Ok(processed)
    }

    /// Fetch the mesh artifact of a completed project
    pub async fn download(&self, project_id: &ProjectId) -> Result<Vec<u8>, IntegrationError> {
        let url = format!("{}/api/projects/{}/download", self.base_url, project_id);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Operation::Download.transport(e))?;

        let response = check_status(Operation::Download, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Operation::Download.transport(e))?;
        debug!("Downloaded {} bytes for project {}", bytes.len(), project_id);
        Ok(bytes.to_vec())
    }

    /// List the projects owned by a user, newest first
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Project>, IntegrationError> {
        let url = format!("{}/api/projects", self.base_url);
        let response = self.client
            .get(&url)
            .query(&[("user_id", user_id.to_string())])
            .send()
            .await
            .map_err(|e| Operation::Fetch.transport(e))?;

        let list: ProjectList = handle_response(Operation::Fetch, response).await?;
        Ok(list.projects)
    }

    /// Get a single project
    pub async fn get(&self, project_id: &ProjectId) -> Result<Project, IntegrationError> {
        let url = format!("{}/api/projects/{}", self.base_url, project_id);
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Operation::Fetch.transport(e))?;

        let detail: ProjectDetail = handle_response(Operation::Fetch, response).await?;
        Ok(detail.project)
    }
}

/// Turn a non-success status into the operation's error, reading `{error}` from the body
pub(crate) async fn check_status(
    op: Operation,
    response: reqwest::Response,
) -> Result<reqwest::Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    warn!("{} returned {}: {}", op, status.as_u16(), text);
    Err(op.error(server_message(&text)))
}

pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
    op: Operation,
    response: reqwest::Response,
) -> Result<T, IntegrationError> {
    let response = check_status(op, response).await?;
    response.json().await.map_err(|e| op.transport(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectType;
    use std::future::Future;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = find(&buf, b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = buf.len() - (end + 4);
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());
            match content_length {
                Some(len) if body_len >= len => break,
                Some(_) => {}
                None if head.contains("transfer-encoding: chunked") => {
                    if buf.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                }
                None => break,
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answer one request with a canned response; the handle yields the raw request
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (base_url, handle)
    }

    fn png_job() -> UploadJob {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(256, 0);
        UploadJob::new("apple.png", bytes, "", ObjectType::Fruit, UserId::new("7"))
    }

    /// The text value of a multipart field
    fn form_field<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        let marker = format!("name=\"{}\"", name);
        let start = request.find(&marker)?;
        let rest = &request[start..];
        let value_start = rest.find("\r\n\r\n")? + 4;
        let value = &rest[value_start..];
        let value_end = value.find("\r\n")?;
        Some(&value[..value_end])
    }

    #[test]
    fn test_upload_sends_form_fields() {
        let (result, request) = block_on(async {
            let (base_url, server) = serve_once(
                "200 OK",
                "application/json",
                r#"{"message": "File uploaded successfully", "project_id": 42}"#,
            )
            .await;
            let api = ProjectApi::new(client(), base_url);
            let result = api.upload(png_job()).await;
            (result, server.await.unwrap())
        });

        assert_eq!(result, Ok(ProjectId::new("42")));
        assert!(request.starts_with("POST /api/upload "));
        assert!(request.contains("name=\"file\"; filename=\"apple.png\""));
        assert!(request.contains("image/png"));
        assert_eq!(form_field(&request, "project_name"), Some("apple"));
        assert_eq!(form_field(&request, "object_type"), Some("fruit"));
        assert_eq!(form_field(&request, "user_id"), Some("7"));
    }

    #[test]
    fn test_upload_rejection_carries_server_message() {
        let result = block_on(async {
            let (base_url, server) =
                serve_once("400 Bad Request", "application/json", r#"{"error": "Invalid file type"}"#).await;
            let result = ProjectApi::new(client(), base_url).upload(png_job()).await;
            server.await.unwrap();
            result
        });

        assert_eq!(result, Err(IntegrationError::Upload("Invalid file type".into())));
    }

    #[test]
    fn test_download_html_error_uses_fallback() {
        let result = block_on(async {
            let (base_url, server) = serve_once(
                "500 Internal Server Error",
                "text/html",
                "<html><body>Internal Server Error</body></html>",
            )
            .await;
            let result = ProjectApi::new(client(), base_url)
                .download(&ProjectId::new("9"))
                .await;
            server.await.unwrap();
            result
        });

        assert_eq!(result, Err(IntegrationError::Download("Download failed".into())));
    }

    #[test]
    fn test_download_returns_body() {
        let (result, request) = block_on(async {
            let (base_url, server) = serve_once("200 OK", "application/octet-stream", "ply\nformat ascii 1.0\n").await;
            let result = ProjectApi::new(client(), base_url)
                .download(&ProjectId::new("9"))
                .await;
            (result, server.await.unwrap())
        });

        assert_eq!(result.unwrap(), b"ply\nformat ascii 1.0\n".to_vec());
        assert!(request.starts_with("GET /api/projects/9/download "));
    }

    #[test]
    fn test_unparseable_success_body_uses_fallback() {
        let result = block_on(async {
            let (base_url, server) = serve_once("200 OK", "text/plain", "not json").await;
            let result = ProjectApi::new(client(), base_url)
                .list(&UserId::new("1"))
                .await;
            server.await.unwrap();
            result
        });

        assert_eq!(result.unwrap_err(), IntegrationError::Fetch("Failed to fetch data".into()));
    }

    #[test]
    fn test_unreachable_server_uses_fallback() {
        let result = block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            drop(listener);
            ProjectApi::new(client(), base_url)
                .process(&ProjectId::new("3"))
                .await
        });

        assert_eq!(result.unwrap_err(), IntegrationError::Processing("Processing failed".into()));
    }
}
