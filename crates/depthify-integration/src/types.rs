use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Vertex count shown when the process response omits `vertices_count`
pub const FALLBACK_VERTEX_COUNT: u64 = 15420;
/// Face count shown when the process response omits `faces_count`
pub const FALLBACK_FACE_COUNT: u64 = 30840;
/// Processing time shown when the process response omits `processing_time`
pub const FALLBACK_PROCESSING_SECONDS: f64 = 2.3;

/// The backend emits integer ids; accept text too and keep them opaque.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Server-assigned project identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(#[serde(deserialize_with = "opaque_id")] pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the user owning uploads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(#[serde(deserialize_with = "opaque_id")] pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hint telling the backend which depth heuristics to favour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    #[default]
    Auto,
    Fruit,
    Geometric,
    Organic,
    Flat,
}

impl ObjectType {
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Auto,
        ObjectType::Fruit,
        ObjectType::Geometric,
        ObjectType::Organic,
        ObjectType::Flat,
    ];

    /// Wire value sent as the `object_type` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Fruit => "fruit",
            Self::Geometric => "geometric",
            Self::Organic => "organic",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown object type '{}' (expected auto, fruit, geometric, organic or flat)", s))
    }
}

/// Server-side lifecycle of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A project record as returned by the backend. Everything but the id is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub vertices_count: Option<u64>,
    #[serde(default)]
    pub faces_count: Option<u64>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Extract the `error` field from a failure body, if it has one
pub fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

/// Response from `POST /api/upload`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub project_id: ProjectId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Metrics block inside the process response. Parsed leniently so that a
/// partial record still yields a result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessedProject {
    #[serde(default)]
    pub vertices_count: Option<u64>,
    #[serde(default)]
    pub faces_count: Option<u64>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

/// Response from `POST /api/process/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub project: Option<ProcessedProject>,
}

/// Result metrics surfaced to the user once processing has finished
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectResult {
    pub vertex_count: u64,
    pub face_count: u64,
    pub processing_time_seconds: f64,
}

impl ProjectResult {
    /// Read metrics from a process response, substituting the fixed fallback
    /// for every field the server left out.
    pub fn from_response(response: &ProcessResponse) -> Self {
        let project = response.project.clone().unwrap_or_default();
        Self {
            vertex_count: project.vertices_count.unwrap_or(FALLBACK_VERTEX_COUNT),
            face_count: project.faces_count.unwrap_or(FALLBACK_FACE_COUNT),
            processing_time_seconds: project.processing_time.unwrap_or(FALLBACK_PROCESSING_SECONDS),
        }
    }

    pub fn vertices_display(&self) -> String {
        format_count(self.vertex_count)
    }

    pub fn faces_display(&self) -> String {
        format_count(self.face_count)
    }

    pub fn processing_time_display(&self) -> String {
        format!("{}s", self.processing_time_seconds)
    }
}

/// Group digits in thousands: `20000` becomes `"20,000"`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Mesh formats offered for download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadFormat {
    Ply,
    Stl,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 2] = [DownloadFormat::Ply, DownloadFormat::Stl];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ply => "ply",
            Self::Stl => "stl",
        }
    }

    /// Button label for this format
    pub fn label(&self) -> String {
        format!("Download {}", self.extension().to_uppercase())
    }

    /// Client-side file name for a downloaded artifact
    pub fn file_name(&self, project_id: &ProjectId) -> String {
        format!("model_{}.{}", project_id, self.extension())
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DownloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown download format '{}' (expected ply or stl)", s))
    }
}

/// A downloaded mesh file, held only for the duration of one download action
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub project_id: ProjectId,
    pub format: DownloadFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn new(project_id: ProjectId, format: DownloadFormat, bytes: Vec<u8>) -> Self {
        let file_name = format.file_name(&project_id);
        Self {
            project_id,
            format,
            file_name,
            bytes,
        }
    }
}

/// Envelope of `GET /api/projects`
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Envelope of `GET /api/projects/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDetail {
    pub project: Project,
}

/// A completed project shown in the public gallery
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryItem {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub creator: String,
}

/// Envelope of `GET /api/gallery`
#[derive(Debug, Clone, Deserialize)]
pub struct Gallery {
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
}

/// Response from `GET /api/health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Response from `GET /api/stats`
#[derive(Debug, Clone, Deserialize)]
pub struct Stats {
    pub total_users: u64,
    pub total_projects: u64,
    pub completed_projects: u64,
    pub success_rate: f64,
}

/// User record returned by the auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl UserInfo {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Response from `/api/auth/login` and `/api/auth/signup`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: UserInfo,
}

/// Request body for `/api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `/api/auth/signup`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}
