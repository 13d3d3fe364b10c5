//! Bulk product ingestion: CSV template, CSV upload and image upload
//!
//! The image upload shows a simulated progress counter. It is driven by a
//! [`ProgressTicker`], a spawned interval task owned by a guard: the task stops
//! when the guard drops, so it cannot outlive the upload that started it.

use crate::context::{Context, Outcome};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storedesk_core::ingest::{
    CsvUpload, CsvUploadOutcome, ImageUpload, ImageUploadOutcome, StagedFile, TEMPLATE_FILENAME,
    UploadPhase,
};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Advances simulated upload progress on a fixed interval
///
/// One tick per period while the upload is running, never past the staged
/// count. Dropping the ticker aborts its task.
#[derive(Debug)]
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Start ticking `state` every `period`; must be called inside a Tokio runtime
    #[must_use]
    pub fn start(state: Arc<Mutex<ImageUpload>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let mut upload = state.lock();
                if upload.phase() != UploadPhase::Uploading {
                    break;
                }
                let before = upload.progress();
                if upload.tick() == before {
                    break;
                }
            }
            tracing::trace!("progress ticker finished");
        });
        Self { handle }
    }

    /// Whether the task has stopped on its own
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// CSV template download and CSV bulk upload
#[derive(Debug)]
pub struct CsvWorkflow {
    ctx: Context,
    state: CsvUpload,
}

impl CsvWorkflow {
    /// Nothing selected
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: CsvUpload::default(),
        }
    }

    /// Upload state: selected file, phase, last outcome
    #[must_use]
    pub const fn state(&self) -> &CsvUpload {
        &self.state
    }

    /// Select the CSV file to upload; anything not `text/csv` is rejected
    pub fn select(&mut self, path: impl Into<PathBuf>) -> Outcome {
        match self.state.select(StagedFile::from_path(path)) {
            Ok(()) => Outcome::Applied,
            Err(e) => self.ctx.invalid(e.to_string()),
        }
    }

    /// Drop the selection
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Send the selected file
    ///
    /// Success clears the selection; failure keeps it so the admin can retry.
    pub async fn upload(&mut self) -> Outcome {
        let file = match self.state.begin() {
            Ok(file) => file,
            Err(e) => return self.ctx.invalid(e.to_string()),
        };
        tracing::info!(file = %file.name, "uploading product CSV");

        let outcome = match self.ctx.client.bulk_upload_csv(&file).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "CSV upload failed");
                CsvUploadOutcome::transport_failure(e.to_string())
            }
        };
        let outcome = self.state.finish(outcome);

        if outcome.success {
            let message = if outcome.created_count > 0 {
                format!("Successfully created {} products", outcome.created_count)
            } else {
                outcome.message.clone()
            };
            self.ctx.applied(message)
        } else {
            let message = if outcome.message.is_empty() {
                "Failed to upload CSV file".to_string()
            } else {
                outcome.message.clone()
            };
            self.ctx.notifications.error(message.clone());
            Outcome::Failed(message)
        }
    }

    /// Save the CSV template into `dir` as `product_upload_template.csv`
    pub async fn download_template(&self, dir: &Path) -> Option<PathBuf> {
        let bytes = match self.ctx.client.download_csv_template().await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.ctx.fetch_failed(&e, "Failed to download CSV template");
                return None;
            }
        };

        let path = dir.join(TEMPLATE_FILENAME);
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), size = bytes.len(), "CSV template saved");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "could not save CSV template");
                self.ctx.notifications.error("Failed to download CSV template");
                None
            }
        }
    }
}

/// Bulk image staging and upload
#[derive(Debug)]
pub struct ImageWorkflow {
    ctx: Context,
    state: Arc<Mutex<ImageUpload>>,
    tick: Duration,
}

impl ImageWorkflow {
    /// Nothing staged; the tick period comes from the dashboard settings
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        let tick = Duration::from_millis(ctx.settings.progress_tick_ms);
        Self {
            ctx,
            state: Arc::new(Mutex::new(ImageUpload::default())),
            tick,
        }
    }

    /// Stage another batch; a batch breaking any rule is rejected whole
    pub fn stage(&self, paths: impl IntoIterator<Item = PathBuf>) -> Outcome {
        let batch: Vec<StagedFile> = paths.into_iter().map(StagedFile::from_path).collect();
        let result = self.state.lock().stage(batch);
        match result {
            Ok(added) => {
                tracing::debug!(added, "images staged");
                Outcome::Applied
            }
            Err(e) => self.ctx.invalid(e.to_string()),
        }
    }

    /// Unstage one file
    pub fn remove(&self, index: usize) -> Option<StagedFile> {
        self.state.lock().remove(index)
    }

    /// Unstage everything
    pub fn clear(&self) {
        self.state.lock().clear();
    }

    /// Files waiting to be sent
    #[must_use]
    pub fn staged(&self) -> Vec<StagedFile> {
        self.state.lock().staged().to_vec()
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> UploadPhase {
        self.state.lock().phase()
    }

    /// `(done, total)` of the simulated progress
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let upload = self.state.lock();
        (upload.progress(), upload.staged().len())
    }

    /// Last outcome
    #[must_use]
    pub fn outcome(&self) -> Option<ImageUploadOutcome> {
        self.state.lock().outcome().cloned()
    }

    /// Send every staged image while the progress ticker runs
    ///
    /// Success clears the staged files; failure keeps them.
    pub async fn upload(&self) -> Outcome {
        let begun = self.state.lock().begin();
        let files = match begun {
            Ok(files) => files,
            Err(e) => return self.ctx.invalid(e.to_string()),
        };
        tracing::info!(count = files.len(), "uploading images");

        let ticker = ProgressTicker::start(Arc::clone(&self.state), self.tick);
        let result = self.ctx.client.bulk_upload_images(&files).await;
        drop(ticker);

        let outcome = result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "image upload failed");
            ImageUploadOutcome::transport_failure(e.to_string())
        });
        let success = outcome.success;
        let message = outcome.message.clone();
        self.state.lock().finish(outcome);

        if success {
            self.ctx.applied(message)
        } else {
            let message = if message.is_empty() {
                "Failed to upload images".to_string()
            } else {
                message
            };
            self.ctx.notifications.error(message.clone());
            Outcome::Failed(message)
        }
    }

    /// URL of one uploaded image, for copying
    #[must_use]
    pub fn copy_url(&self, index: usize) -> Option<String> {
        let url = self
            .state
            .lock()
            .outcome()
            .and_then(|outcome| outcome.urls().get(index).map(|url| (*url).to_string()))?;
        self.ctx.notifications.success("URL copied to clipboard!");
        Some(url)
    }

    /// Every uploaded URL joined with `|` for the CSV images column
    #[must_use]
    pub fn copy_all(&self) -> Option<String> {
        let joined = self
            .state
            .lock()
            .outcome()
            .map(ImageUploadOutcome::joined_urls)
            .filter(|joined| !joined.is_empty())?;
        self.ctx.notifications.success("All image URLs copied to clipboard!");
        Some(joined)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn uploading(n: usize) -> Arc<Mutex<ImageUpload>> {
        let mut upload = ImageUpload::default();
        upload
            .stage(
                (0..n)
                    .map(|i| StagedFile::from_path(format!("/tmp/batch/img{i}.jpg")))
                    .collect(),
            )
            .unwrap();
        upload.begin().unwrap();
        Arc::new(Mutex::new(upload))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_advances_once_per_period() {
        let state = uploading(5);
        let _ticker = ProgressTicker::start(Arc::clone(&state), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(state.lock().progress(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_at_staged_count() {
        let state = uploading(3);
        let ticker = ProgressTicker::start(Arc::clone(&state), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(state.lock().progress(), 3);
        assert!(ticker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_ticker_stops_progress() {
        let state = uploading(5);
        let ticker = ProgressTicker::start(Arc::clone(&state), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(ticker);

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(state.lock().progress(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_upload_finishes() {
        let state = uploading(10);
        let ticker = ProgressTicker::start(Arc::clone(&state), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        state
            .lock()
            .finish(ImageUploadOutcome::transport_failure("connection reset"));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(ticker.is_finished());
        // a failed upload is forced to the staged count and stays there
        assert_eq!(state.lock().progress(), 10);
    }
}
