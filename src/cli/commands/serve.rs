//! HTTP API server.
//!
//! Accepts PDF uploads, converts them in the background and lets clients
//! poll for status and download the finished audio.

use crate::cli::Output;
use crate::config::Settings;
use crate::jobs::{new_job_id, JobStatus, JobTracker};
use crate::orchestrator::Orchestrator;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Shared application state.
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    jobs: Arc<JobTracker>,
    work_dir: PathBuf,
    allowed_extensions: Vec<String>,
    max_upload_bytes: usize,
}

impl AppState {
    /// Create state with an empty job tracker.
    pub fn new(orchestrator: Orchestrator, settings: &Settings) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            jobs: Arc::new(JobTracker::new()),
            work_dir: settings.work_dir(),
            allowed_extensions: settings
                .server
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_upload_bytes: settings.server.max_upload_bytes,
        }
    }

    pub fn jobs(&self) -> &JobTracker {
        &self.jobs
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/status/{job_id}", get(job_status))
        .route("/download/{job_id}", get(download))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(settings.work_dir())?;

    let orchestrator = Orchestrator::new(&settings)?;
    let state = Arc::new(AppState::new(orchestrator, &settings));
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("ChatCast API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload", "POST /upload");
    Output::kv("Status", "GET  /status/:job_id");
    Output::kv("Download", "GET  /download/:job_id");
    println!();
    Output::kv("Work dir", &settings.work_dir().display().to_string());
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct UploadResponse {
    job_id: String,
    status: JobStatus,
    status_url: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: JobStatus,
    filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "chatcast",
        "version": env!("CARGO_PKG_VERSION"),
        "upload": "POST /upload (multipart field \"file\")",
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let original = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((original, bytes));
                        break;
                    }
                    Err(e) => return error_response(e.status(), e.body_text()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return error_response(e.status(), e.body_text()),
        }
    }

    let Some((original, bytes)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file part");
    };
    if original.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No selected file");
    }
    if !has_allowed_extension(&original, &state.allowed_extensions) {
        let kinds = state
            .allowed_extensions
            .iter()
            .map(|e| e.to_uppercase())
            .collect::<Vec<_>>()
            .join("/");
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Only {} files are allowed", kinds),
        );
    }

    let filename = match secure_filename(&original) {
        name if name.is_empty() => format!(
            "document.{}",
            state.allowed_extensions.first().map(String::as_str).unwrap_or("pdf")
        ),
        name => name,
    };

    let job_id = new_job_id();
    let job_dir = state.work_dir.join(&job_id);
    let input_path = job_dir.join(&filename);
    let output_path = job_dir.join(format!("{}.wav", file_stem(&filename)));

    if let Err(e) = tokio::fs::create_dir_all(&job_dir).await {
        error!("Failed to create job directory {}: {}", job_dir.display(), e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload");
    }
    if let Err(e) = tokio::fs::write(&input_path, &bytes).await {
        error!("Failed to save upload {}: {}", input_path.display(), e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload");
    }

    // Registered before the task starts so an immediate status poll finds it.
    state.jobs.create(&job_id, &filename, input_path.clone());
    info!("Accepted {} ({} bytes) as job {}", filename, bytes.len(), job_id);

    tokio::spawn(process_job(
        state.orchestrator.clone(),
        state.jobs.clone(),
        job_id.clone(),
        input_path,
        output_path,
    ));

    Json(UploadResponse {
        status_url: format!("/status/{}", job_id),
        job_id,
        status: JobStatus::Processing,
    })
    .into_response()
}

/// Run one job to completion and record its terminal status.
///
/// The pipeline runs in its own task so that even a panic ends up recorded
/// as a failure instead of leaving the job in `processing`.
pub async fn process_job(
    orchestrator: Arc<Orchestrator>,
    jobs: Arc<JobTracker>,
    job_id: String,
    input_path: PathBuf,
    output_path: PathBuf,
) {
    let run = tokio::spawn(async move { orchestrator.run(&input_path, &output_path).await });

    match run.await {
        Ok(Ok(outcome)) => {
            info!(
                "Job {} completed: {} lines, {} bytes",
                job_id, outcome.synthesis.lines_spoken, outcome.synthesis.bytes_written
            );
            jobs.complete(&job_id, outcome.output_path);
        }
        Ok(Err(e)) => {
            error!("Job {} failed: {}", job_id, e);
            jobs.fail(&job_id, e.to_string());
        }
        Err(e) => {
            error!("Job {} aborted: {}", job_id, e);
            jobs.fail(&job_id, format!("Job aborted: {}", e));
        }
    }
}

async fn job_status(State(state): State<Arc<AppState>>, Path(job_id): Path<String>) -> Response {
    let Some(job) = state.jobs.get(&job_id) else {
        return error_response(StatusCode::NOT_FOUND, "Job not found");
    };

    let (download_url, error) = match job.status {
        JobStatus::Completed => (Some(format!("/download/{}", job_id)), None),
        JobStatus::Failed => (None, job.error.clone()),
        JobStatus::Processing => (None, None),
    };

    Json(StatusResponse {
        status: job.status,
        filename: job.filename,
        download_url,
        error,
    })
    .into_response()
}

async fn download(State(state): State<Arc<AppState>>, Path(job_id): Path<String>) -> Response {
    let Some(job) = state.jobs.get(&job_id) else {
        return error_response(StatusCode::NOT_FOUND, "Job not found");
    };
    let (JobStatus::Completed, Some(output_path)) = (job.status, job.output_path.as_ref()) else {
        return error_response(StatusCode::BAD_REQUEST, "Audio not ready yet");
    };

    let file = match tokio::fs::File::open(output_path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Audio for job {} unreadable: {}", job_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Audio file unavailable");
        }
    };

    let mut headers = vec![
        (header::CONTENT_TYPE, "audio/wav".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.wav\"", file_stem(&job.filename)),
        ),
    ];
    if let Ok(metadata) = file.metadata().await {
        headers.push((header::CONTENT_LENGTH, metadata.len().to_string()));
    }

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    for (name, value) in headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

// === Upload helpers ===

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("hardcoded filename pattern"));

/// Reduce a client-supplied filename to a safe basename.
///
/// Directory components are dropped, whitespace becomes `_`, anything
/// outside `[A-Za-z0-9_.-]` is removed and leading dots are stripped.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn has_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| allowed.iter().any(|a| a == &ext.to_lowercase()))
        .unwrap_or(false)
}

fn file_stem(filename: &str) -> &str {
    std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("podcast")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::error::ChatcastError;
    use crate::test_support::{FakeSpeech, ScriptedModel, StaticExtractor};
    use axum::extract::FromRequest;
    use axum::http::Request;
    use std::time::Duration;

    const SCRIPT: &str = "**Host:** Welcome!\n**Michael Scott:** Thanks...\n";

    fn test_state(work_dir: &std::path::Path, replies: Vec<crate::error::Result<String>>) -> Arc<AppState> {
        let mut settings = Settings::default();
        settings.general.work_dir = work_dir.display().to_string();

        let orchestrator = Orchestrator::with_components(
            &settings,
            Credentials::new(Some("google-key".to_string()), Some("murf-key".to_string())),
            Arc::new(StaticExtractor::new("Study shows X improves Y.")),
            Arc::new(ScriptedModel::new(replies)),
            Arc::new(FakeSpeech::new()),
        )
        .unwrap();

        Arc::new(AppState::new(orchestrator, &settings))
    }

    async fn multipart(field: &str, filename: &str, content: &str) -> Multipart {
        let boundary = "chatcast-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n{content}\r\n--{b}--\r\n",
            b = boundary,
            field = field,
            filename = filename,
            content = content,
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn wait_for_terminal(state: &AppState, job_id: &str) -> JobStatus {
        for _ in 0..200 {
            let status = state.jobs().get(job_id).unwrap().status;
            if status.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Paper (final).pdf"), "My_Paper_final.pdf");
        assert_eq!(secure_filename("../../etc/passwd.pdf"), "passwd.pdf");
        assert_eq!(secure_filename("C:\\Users\\me\\notes.PDF"), "notes.PDF");
        assert_eq!(secure_filename("..hidden.pdf"), "hidden.pdf");
        assert_eq!(secure_filename("///"), "");
    }

    #[test]
    fn test_allowed_extension() {
        let allowed = vec!["pdf".to_string()];
        assert!(has_allowed_extension("paper.pdf", &allowed));
        assert!(has_allowed_extension("PAPER.PDF", &allowed));
        assert!(!has_allowed_extension("paper.docx", &allowed));
        assert!(!has_allowed_extension("pdf", &allowed));
    }

    #[tokio::test]
    async fn test_upload_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![]);

        let response = upload(State(state.clone()), multipart("file", "notes.txt", "hello").await).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Only PDF files are allowed");
        assert!(state.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![]);

        let response = upload(State(state.clone()), multipart("document", "paper.pdf", "%PDF").await).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file part");

        let response = upload(State(state), multipart("file", "", "%PDF").await).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No selected file");
    }

    #[tokio::test]
    async fn test_upload_to_download() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![Ok("- X improves Y".to_string()), Ok(SCRIPT.to_string())],
        );

        let response = upload(
            State(state.clone()),
            multipart("file", "My Study.pdf", "%PDF-1.4 fake").await,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "processing");
        let job_id = body["job_id"].as_str().unwrap().to_string();
        assert_eq!(body["status_url"], format!("/status/{}", job_id));

        // Visible immediately, before the background task can finish.
        assert!(state.jobs().get(&job_id).is_some());

        assert_eq!(wait_for_terminal(&state, &job_id).await, JobStatus::Completed);

        let response = job_status(State(state.clone()), Path(job_id.clone())).await;
        let body = json_body(response).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["filename"], "My_Study.pdf");
        assert_eq!(body["download_url"], format!("/download/{}", job_id));
        assert!(body.get("error").is_none());

        let response = download(State(state), Path(job_id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"My_Study.wav\""
        );
        let audio = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            audio.to_vec(),
            b"<en-US-natalie:Welcome!><en-US-terrell:Thanks...>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_failed_job_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![Err(ChatcastError::LanguageModel("quota exceeded".to_string()))],
        );

        let response = upload(State(state.clone()), multipart("file", "paper.pdf", "%PDF").await).await;
        let job_id = json_body(response).await["job_id"].as_str().unwrap().to_string();
        assert_eq!(wait_for_terminal(&state, &job_id).await, JobStatus::Failed);

        let body = json_body(job_status(State(state.clone()), Path(job_id.clone())).await).await;
        assert_eq!(body["status"], "failed");
        assert!(body["error"].as_str().unwrap().contains("quota exceeded"));
        assert!(body.get("download_url").is_none());

        let response = download(State(state), Path(job_id)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_job_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![]);

        let response = job_status(State(state.clone()), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body, serde_json::json!({"error": "Job not found"}));

        let response = download(State(state), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_streams_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![]);
        let audio: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let path = dir.path().join("episode.wav");
        std::fs::write(&path, &audio).unwrap();

        state.jobs().create("long", "episode.pdf", dir.path().join("episode.pdf"));
        state.jobs().complete("long", path);

        let response = download(State(state), Path("long".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            audio.len().to_string().as_str()
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.len(), audio.len());
        assert!(body.to_vec() == audio);
    }

    #[tokio::test]
    async fn test_download_missing_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![]);
        state.jobs().create("gone", "paper.pdf", dir.path().join("paper.pdf"));
        state.jobs().complete("gone", dir.path().join("paper.wav"));

        let response = download(State(state), Path("gone".to_string())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Audio file unavailable");
    }

    #[tokio::test]
    async fn test_processing_job_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![]);
        state
            .jobs()
            .create("pending", "paper.pdf", dir.path().join("paper.pdf"));
        std::fs::write(dir.path().join("paper.wav"), b"partial").unwrap();

        let response = download(State(state.clone()), Path("pending".to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Audio not ready yet");

        let body = json_body(job_status(State(state), Path("pending".to_string())).await).await;
        assert_eq!(body["status"], "processing");
        assert!(body.get("download_url").is_none());
    }
}
