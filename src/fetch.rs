//! Task list sources - the PNC REST endpoint or a local JSON file

use crate::config::Config;
use crate::core::{transform, GraphSnapshot, Task};
use reqwest::Client as HttpClient;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

/// Why a task list could not be obtained
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode task list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that yields the full task list in one response
pub trait TaskSource {
    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<Task>, FetchError>> + Send;

    /// Human readable origin, for logs and the header
    fn describe(&self) -> String;
}

/// `GET {base}/rest/tasks`
#[derive(Debug, Clone)]
pub struct HttpTaskSource {
    http: HttpClient,
    url: String,
}

impl HttpTaskSource {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            url: config.tasks_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TaskSource for HttpTaskSource {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError> {
        log::info!("Fetching tasks from {}", self.url);

        let resp = self.http.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
            });
        }

        // Read the body first so that a malformed payload is a decode
        // error rather than a transport one
        let body = resp.bytes().await?;
        let tasks: Vec<Task> = serde_json::from_slice(&body)?;

        log::info!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Task list stored as JSON on disk
#[derive(Debug, Clone)]
pub struct FileTaskSource {
    path: PathBuf,
}

impl FileTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TaskSource for FileTaskSource {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError> {
        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        let tasks: Vec<Task> = serde_json::from_slice(&content)?;
        log::info!("Read {} tasks from {}", tasks.len(), self.path.display());
        Ok(tasks)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetch the task list and derive the laid out graph from it
pub async fn fetch_snapshot<S: TaskSource>(
    source: &S,
    detail_base: &str,
) -> Result<GraphSnapshot, FetchError> {
    let tasks = source.fetch_tasks().await?;
    Ok(transform(&tasks, detail_base))
}
