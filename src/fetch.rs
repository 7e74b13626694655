//! Best-effort retrieval of per-day observation files.
//!
//! Each historical day lives in its own file, addressed by URL or local
//! path. Days are fetched concurrently with a bounded degree of
//! parallelism, and a day that cannot be retrieved is skipped rather
//! than failing the batch; the prediction core only ever sees the blobs
//! that arrived.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

/// Fetches one URL and returns its body as text. Non-2xx statuses are
/// errors; the caller decides whether to skip or abort.
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);
    let resp = client.execute(req).await?;
    let resp = resp.error_for_status()?;
    Ok(resp.text().await?)
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads one day's blob from a URL or a local file path.
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<String> {
    if is_url(source) {
        fetch_text(client, source).await
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {source}"))
    }
}

/// Gathers per-day blobs from `sources`, at most `concurrency` in
/// flight at a time.
///
/// Results come back in source order so the record collection handed to
/// the index is deterministic. A failed source is warn-logged and
/// dropped from the output; it contributes zero records, exactly like
/// an empty file.
pub async fn load_day_blobs(sources: &[String], concurrency: usize) -> Vec<String> {
    let semaphore = std::sync::Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));

    let mut tasks = Vec::with_capacity(sources.len());
    for source in sources {
        let sem = semaphore.clone();
        let source = source.clone();
        tasks.push(tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return None;
            };
            let client = BasicClient::new();
            match load_source(&client, &source).await {
                Ok(blob) => {
                    debug!(source = %source, bytes = blob.len(), "Day file loaded");
                    Some(blob)
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "Skipping day file");
                    None
                }
            }
        }));
    }

    let mut blobs = Vec::new();
    for task in tasks {
        if let Ok(Some(blob)) = task.await {
            blobs.push(blob);
        }
    }
    blobs
}
