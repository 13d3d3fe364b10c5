//! Bulk product ingestion: CSV upload and bulk image staging
//!
//! Each upload type runs its own small state machine:
//! `Idle -> Uploading -> {Succeeded | Failed}`, returning to `Idle` on the next
//! selection or an explicit clear. The machines here only hold state and
//! enforce the client-side rules; the network calls live in the client crate.

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, path::PathBuf};

use crate::utils::{self, CSV_CONTENT_TYPE, IMAGE_CONTENT_TYPES};

/// Maximum number of images staged for one bulk upload
pub const MAX_BULK_IMAGES: usize = 50;

/// Row errors shown before the "... and N more" line
pub const ROW_ERROR_PREVIEW: usize = 10;

/// File name used when saving the CSV template
pub const TEMPLATE_FILENAME: &str = "product_upload_template.csv";

/// Separator for the CSV images column
pub const IMAGE_URL_SEPARATOR: &str = "|";

/// A locally selected file that has not been sent yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    /// File name as shown to the user and sent in the multipart part
    pub name: String,
    /// Reported content type
    pub content_type: String,
    /// Location on disk
    pub path: PathBuf,
}

impl StagedFile {
    /// Stage a path, deriving name and content type from it
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = utils::content_type_for(&path).to_string();
        Self {
            name,
            content_type,
            path,
        }
    }
}

/// Where an upload stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum UploadPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Request outstanding; the trigger is disabled
    Uploading,
    /// Last request succeeded
    Succeeded,
    /// Last request failed
    Failed,
}

/// Row-level problem reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// CSV row number, when the backend knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<serde_json::Value>,
    /// What went wrong
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.row {
            Some(serde_json::Value::String(row)) => write!(f, "Row {row}: {}", self.message),
            Some(row) => write!(f, "Row {row}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Row errors cut down for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowErrorSummary {
    /// At most [`ROW_ERROR_PREVIEW`] formatted rows
    pub shown: Vec<String>,
    /// How many were left out
    pub hidden: usize,
}

impl RowErrorSummary {
    /// Summarize a full error list
    #[must_use]
    pub fn new(errors: &[RowError]) -> Self {
        Self {
            shown: errors
                .iter()
                .take(ROW_ERROR_PREVIEW)
                .map(ToString::to_string)
                .collect(),
            hidden: errors.len().saturating_sub(ROW_ERROR_PREVIEW),
        }
    }

    /// Display lines, ending with the overflow line when rows were hidden
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.shown.clone();
        if self.hidden > 0 {
            lines.push(format!("... and {} more errors", self.hidden));
        }
        lines
    }
}

/// Body returned by the CSV bulk-upload endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CsvUploadResponse {
    /// Backend success flag
    #[serde(default)]
    pub success: bool,
    /// Backend message
    #[serde(default)]
    pub message: String,
    /// Products created
    #[serde(default)]
    pub products: Option<Vec<serde_json::Value>>,
    /// Rows that failed
    #[serde(default)]
    pub errors: Vec<RowError>,
}

/// Result of one CSV upload as shown to the admin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvUploadOutcome {
    /// Whether the request succeeded
    pub success: bool,
    /// Backend or fallback message
    pub message: String,
    /// Number of products created
    pub created_count: usize,
    /// Row errors
    pub errors: Vec<RowError>,
}

impl CsvUploadOutcome {
    /// Outcome of a request the backend answered; `ok` is the HTTP status class.
    /// A 2xx body carrying `success: false` is a failure.
    #[must_use]
    pub fn from_response(ok: bool, response: CsvUploadResponse) -> Self {
        let ok = ok && response.success;
        Self {
            success: ok,
            message: response.message,
            created_count: if ok {
                response.products.as_ref().map_or(0, Vec::len)
            } else {
                0
            },
            errors: response.errors,
        }
    }

    /// Outcome of a request that never got an answer
    #[must_use]
    pub fn transport_failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: "Failed to upload CSV file".to_string(),
            created_count: 0,
            errors: vec![RowError {
                row: None,
                message: detail.into(),
            }],
        }
    }

    /// Truncated row errors
    #[must_use]
    pub fn error_summary(&self) -> RowErrorSummary {
        RowErrorSummary::new(&self.errors)
    }
}

/// CSV upload state
#[derive(Debug, Clone, Default)]
pub struct CsvUpload {
    file: Option<StagedFile>,
    phase: UploadPhase,
    outcome: Option<CsvUploadOutcome>,
}

impl CsvUpload {
    /// Selected file, if any
    #[must_use]
    pub const fn file(&self) -> Option<&StagedFile> {
        self.file.as_ref()
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Last outcome
    #[must_use]
    pub const fn outcome(&self) -> Option<&CsvUploadOutcome> {
        self.outcome.as_ref()
    }

    /// Select a file; anything but `text/csv` is rejected and the selection kept as it was
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileRejected`] for a non-CSV file, or
    /// [`crate::Error::InvalidState`] while an upload is running.
    pub fn select(&mut self, file: StagedFile) -> crate::Result<()> {
        if self.phase == UploadPhase::Uploading {
            return Err(crate::Error::invalid_state("A CSV upload is already in progress"));
        }
        if file.content_type != CSV_CONTENT_TYPE {
            return Err(crate::Error::file_rejected("Please select a valid CSV file"));
        }
        self.file = Some(file);
        self.outcome = None;
        self.phase = UploadPhase::Idle;
        Ok(())
    }

    /// Drop the selection and any previous outcome
    pub fn clear(&mut self) {
        if self.phase != UploadPhase::Uploading {
            self.file = None;
            self.outcome = None;
            self.phase = UploadPhase::Idle;
        }
    }

    /// Enter `Uploading` and hand out the file to send
    ///
    /// # Errors
    ///
    /// Rejects when no file is selected or an upload is already running.
    pub fn begin(&mut self) -> crate::Result<StagedFile> {
        if self.phase == UploadPhase::Uploading {
            return Err(crate::Error::invalid_state("A CSV upload is already in progress"));
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| crate::Error::file_rejected("Please select a CSV file first"))?;
        self.phase = UploadPhase::Uploading;
        self.outcome = None;
        Ok(file)
    }

    /// Record the outcome; success clears the file, failure keeps it for a retry
    pub fn finish(&mut self, outcome: CsvUploadOutcome) -> &CsvUploadOutcome {
        if outcome.success {
            self.file = None;
            self.phase = UploadPhase::Succeeded;
        } else {
            self.phase = UploadPhase::Failed;
        }
        self.outcome.insert(outcome)
    }
}

/// Storage location of one uploaded image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedImage {
    /// Public URL
    #[serde(default)]
    pub url: String,
}

/// One image the backend stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Name of the file the admin picked
    #[serde(default)]
    pub original_name: String,
    /// Where it now lives
    #[serde(default)]
    pub cloudinary: Option<HostedImage>,
}

impl UploadedImage {
    /// Hosted URL, when present and non-empty
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.cloudinary
            .as_ref()
            .map(|c| c.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// One image the backend could not store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageError {
    /// File it concerns
    #[serde(default, alias = "filename", alias = "file")]
    pub original_name: Option<String>,
    /// Message
    #[serde(default)]
    pub message: Option<String>,
    /// Alternative message key some backends use
    #[serde(default)]
    pub error: Option<String>,
}

impl ImageError {
    /// Best available description
    #[must_use]
    pub fn text(&self) -> String {
        let detail = self
            .message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("Unknown error");
        match &self.original_name {
            Some(name) => format!("{name}: {detail}"),
            None => detail.to_string(),
        }
    }
}

/// Totals reported by the bulk image endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Files received
    #[serde(default)]
    pub total: u32,
    /// Files stored
    #[serde(default)]
    pub successful: u32,
    /// Files rejected
    #[serde(default)]
    pub failed: u32,
}

/// Body returned by the bulk image endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    /// Backend success flag
    #[serde(default)]
    pub success: bool,
    /// Backend message
    #[serde(default)]
    pub message: String,
    /// Stored images
    #[serde(default)]
    pub uploaded_images: Vec<UploadedImage>,
    /// Rejected images
    #[serde(default)]
    pub errors: Vec<ImageError>,
    /// Totals
    #[serde(default)]
    pub summary: Option<UploadSummary>,
}

/// Result of one bulk image upload as shown to the admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUploadOutcome {
    /// Whether the request succeeded
    pub success: bool,
    /// Backend or fallback message
    pub message: String,
    /// Stored images
    pub uploaded: Vec<UploadedImage>,
    /// Rejected images
    pub errors: Vec<ImageError>,
    /// Totals, when reported
    pub summary: Option<UploadSummary>,
}

impl ImageUploadOutcome {
    /// Outcome of a request the backend answered; `ok` is the HTTP status class
    #[must_use]
    pub fn from_response(ok: bool, response: ImageUploadResponse) -> Self {
        let ok = ok && response.success;
        Self {
            success: ok,
            message: response.message,
            uploaded: if ok { response.uploaded_images } else { Vec::new() },
            errors: response.errors,
            summary: if ok { response.summary } else { None },
        }
    }

    /// Outcome of a request that never got an answer
    #[must_use]
    pub fn transport_failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: "Failed to upload images".to_string(),
            uploaded: Vec::new(),
            errors: vec![ImageError {
                message: Some(detail.into()),
                ..ImageError::default()
            }],
            summary: None,
        }
    }

    /// URLs of every stored image, in response order
    #[must_use]
    pub fn urls(&self) -> Vec<&str> {
        self.uploaded.iter().filter_map(UploadedImage::url).collect()
    }

    /// Every stored URL joined for the CSV images column
    #[must_use]
    pub fn joined_urls(&self) -> String {
        self.urls().join(IMAGE_URL_SEPARATOR)
    }
}

/// Bulk image staging and upload state
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    staged: Vec<StagedFile>,
    phase: UploadPhase,
    progress: usize,
    outcome: Option<ImageUploadOutcome>,
}

impl ImageUpload {
    /// Files waiting to be sent
    #[must_use]
    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Simulated progress, in files
    #[must_use]
    pub const fn progress(&self) -> usize {
        self.progress
    }

    /// Last outcome
    #[must_use]
    pub const fn outcome(&self) -> Option<&ImageUploadOutcome> {
        self.outcome.as_ref()
    }

    /// Add a batch; any rule violation rejects the whole batch and leaves the staged set as is
    ///
    /// Rules run in order: total capacity, content types, then duplicate names
    /// (against staged files and within the batch).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileRejected`] with the user-facing explanation, or
    /// [`crate::Error::InvalidState`] while an upload is running.
    pub fn stage(&mut self, batch: Vec<StagedFile>) -> crate::Result<usize> {
        if self.phase == UploadPhase::Uploading {
            return Err(crate::Error::invalid_state("An image upload is already in progress"));
        }

        let current = self.staged.len();
        if current + batch.len() > MAX_BULK_IMAGES {
            tracing::debug!(current, incoming = batch.len(), "image batch over capacity");
            return Err(crate::Error::file_rejected(format!(
                "Cannot add {} images. You can only have a maximum of {MAX_BULK_IMAGES} images total. Currently selected: {current}",
                batch.len()
            )));
        }

        let invalid: Vec<&str> = batch
            .iter()
            .filter(|f| !IMAGE_CONTENT_TYPES.contains(&f.content_type.as_str()))
            .map(|f| f.name.as_str())
            .collect();
        if !invalid.is_empty() {
            return Err(crate::Error::file_rejected(format!(
                "Invalid file types detected: {}. Please upload only JPEG, PNG, or WebP images.",
                invalid.join(", ")
            )));
        }

        let duplicates = {
            let mut seen: HashSet<&str> = self.staged.iter().map(|f| f.name.as_str()).collect();
            batch
                .iter()
                .map(|f| f.name.as_str())
                .filter(|name| !seen.insert(*name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        if !duplicates.is_empty() {
            return Err(crate::Error::file_rejected(format!(
                "Duplicate files detected: {duplicates}. These files are already selected."
            )));
        }

        let added = batch.len();
        self.staged.extend(batch);
        tracing::debug!(added, staged = self.staged.len(), "staged images");
        self.outcome = None;
        self.phase = UploadPhase::Idle;
        Ok(added)
    }

    /// Unstage one file by index
    pub fn remove(&mut self, index: usize) -> Option<StagedFile> {
        if self.phase == UploadPhase::Uploading || index >= self.staged.len() {
            return None;
        }
        self.outcome = None;
        Some(self.staged.remove(index))
    }

    /// Unstage everything
    pub fn clear(&mut self) {
        if self.phase != UploadPhase::Uploading {
            self.staged.clear();
            self.outcome = None;
            self.progress = 0;
            self.phase = UploadPhase::Idle;
        }
    }

    /// Enter `Uploading`, reset progress and hand out the files to send
    ///
    /// # Errors
    ///
    /// Rejects when nothing is staged or an upload is already running.
    pub fn begin(&mut self) -> crate::Result<Vec<StagedFile>> {
        if self.phase == UploadPhase::Uploading {
            return Err(crate::Error::invalid_state("An image upload is already in progress"));
        }
        if self.staged.is_empty() {
            return Err(crate::Error::file_rejected("Please select images to upload"));
        }
        self.phase = UploadPhase::Uploading;
        self.progress = 0;
        self.outcome = None;
        Ok(self.staged.clone())
    }

    /// Advance simulated progress by one file, never past the staged count
    pub fn tick(&mut self) -> usize {
        if self.phase == UploadPhase::Uploading && self.progress < self.staged.len() {
            self.progress += 1;
        }
        self.progress
    }

    /// Record the outcome; success clears staged files and progress, failure keeps them
    pub fn finish(&mut self, outcome: ImageUploadOutcome) -> &ImageUploadOutcome {
        self.progress = self.staged.len();
        if outcome.success {
            self.staged.clear();
            self.progress = 0;
            self.phase = UploadPhase::Succeeded;
        } else {
            self.phase = UploadPhase::Failed;
        }
        self.outcome.insert(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn file(name: &str) -> StagedFile {
        StagedFile::from_path(format!("/tmp/upload/{name}"))
    }

    fn images(prefix: &str, n: usize) -> Vec<StagedFile> {
        (0..n).map(|i| file(&format!("{prefix}{i}.jpg"))).collect()
    }

    #[test]
    fn test_staged_file_from_path() {
        let f = file("Frame.PNG");
        assert_eq!(f.name, "Frame.PNG");
        assert_eq!(f.content_type, "image/png");
    }

    #[test]
    fn test_csv_select_rejects_non_csv() {
        let mut upload = CsvUpload::default();
        let err = upload.select(file("products.xlsx")).unwrap_err();
        assert_eq!(err.to_string(), "Please select a valid CSV file");
        assert!(upload.file().is_none());
    }

    #[test]
    fn test_csv_begin_without_file() {
        let mut upload = CsvUpload::default();
        let err = upload.begin().unwrap_err();
        assert_eq!(err.to_string(), "Please select a CSV file first");
        assert_eq!(upload.phase(), UploadPhase::Idle);
    }

    #[test]
    fn test_csv_success_clears_file() {
        let mut upload = CsvUpload::default();
        upload.select(file("products.csv")).unwrap();
        upload.begin().unwrap();
        assert!(upload.begin().is_err());

        let response: CsvUploadResponse = serde_json::from_value(json!({
            "success": true,
            "message": "Bulk upload completed",
            "products": [{}, {}, {}],
            "errors": [{"row": 4, "message": "Missing price"}]
        }))
        .unwrap();
        let outcome = upload.finish(CsvUploadOutcome::from_response(true, response));

        assert_eq!(outcome.created_count, 3);
        assert_eq!(outcome.error_summary().lines(), vec!["Row 4: Missing price"]);
        assert!(upload.file().is_none());
        assert_eq!(upload.phase(), UploadPhase::Succeeded);
    }

    #[test]
    fn test_csv_failure_keeps_file() {
        let mut upload = CsvUpload::default();
        upload.select(file("products.csv")).unwrap();
        upload.begin().unwrap();
        upload.finish(CsvUploadOutcome::transport_failure("connection refused"));

        assert_eq!(upload.phase(), UploadPhase::Failed);
        assert_eq!(upload.file().unwrap().name, "products.csv");
        assert_eq!(upload.outcome().unwrap().message, "Failed to upload CSV file");
        assert!(upload.begin().is_ok());
    }

    #[test]
    fn test_csv_rejected_body_keeps_file() {
        let mut upload = CsvUpload::default();
        upload.select(file("products.csv")).unwrap();
        upload.begin().unwrap();

        let response: CsvUploadResponse = serde_json::from_value(json!({
            "success": false,
            "message": "No valid rows",
            "products": [{}],
            "errors": [{"row": 2, "message": "Missing name"}]
        }))
        .unwrap();
        let outcome = upload.finish(CsvUploadOutcome::from_response(true, response));

        assert!(!outcome.success);
        assert_eq!(outcome.created_count, 0);
        assert_eq!(outcome.error_summary().lines(), vec!["Row 2: Missing name"]);
        assert_eq!(upload.phase(), UploadPhase::Failed);
        assert_eq!(upload.file().unwrap().name, "products.csv");
    }

    #[test]
    fn test_row_error_summary_caps_at_ten() {
        let errors: Vec<RowError> = (1..=14)
            .map(|i| RowError {
                row: Some(json!(i)),
                message: "bad".to_string(),
            })
            .collect();
        let lines = RowErrorSummary::new(&errors).lines();

        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "Row 1: bad");
        assert_eq!(lines[10], "... and 4 more errors");
    }

    #[test]
    fn test_stage_rejects_over_capacity() {
        let mut upload = ImageUpload::default();
        upload.stage(images("a", 48)).unwrap();

        let err = upload.stage(images("b", 3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot add 3 images. You can only have a maximum of 50 images total. Currently selected: 48"
        );
        assert_eq!(upload.staged().len(), 48);
        assert_eq!(upload.stage(images("b", 2)).unwrap(), 2);
    }

    #[test]
    fn test_stage_rejects_whole_batch_with_one_gif() {
        let mut upload = ImageUpload::default();
        let mut batch = images("ok", 3);
        batch.push(file("spinner.gif"));

        let err = upload.stage(batch).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file types detected: spinner.gif. Please upload only JPEG, PNG, or WebP images."
        );
        assert!(upload.staged().is_empty());
    }

    #[test]
    fn test_stage_rejects_duplicates() {
        let mut upload = ImageUpload::default();
        upload.stage(vec![file("a.jpg"), file("b.png")]).unwrap();

        let err = upload.stage(vec![file("c.jpg"), file("b.png")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate files detected: b.png. These files are already selected."
        );

        let err = upload.stage(vec![file("d.jpg"), file("d.jpg")]).unwrap_err();
        assert!(err.to_string().contains("d.jpg"));
        assert_eq!(upload.staged().len(), 2);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut upload = ImageUpload::default();
        upload.stage(images("x", 3)).unwrap();

        assert_eq!(upload.remove(1).unwrap().name, "x1.jpg");
        assert!(upload.remove(9).is_none());
        assert_eq!(upload.staged().len(), 2);

        upload.clear();
        assert!(upload.staged().is_empty());
    }

    #[test]
    fn test_image_begin_requires_staged_files() {
        let mut upload = ImageUpload::default();
        assert_eq!(
            upload.begin().unwrap_err().to_string(),
            "Please select images to upload"
        );
    }

    #[test]
    fn test_progress_ticks_up_to_staged_count() {
        let mut upload = ImageUpload::default();
        upload.stage(images("p", 2)).unwrap();
        assert_eq!(upload.tick(), 0);

        upload.begin().unwrap();
        assert_eq!(upload.tick(), 1);
        assert_eq!(upload.tick(), 2);
        assert_eq!(upload.tick(), 2);
        assert!(upload.stage(images("q", 1)).is_err());
    }

    #[test]
    fn test_image_success_clears_and_joins_urls_with_pipe() {
        let mut upload = ImageUpload::default();
        upload.stage(images("p", 3)).unwrap();
        upload.begin().unwrap();

        let response: ImageUploadResponse = serde_json::from_value(json!({
            "success": true,
            "message": "2 of 3 images uploaded",
            "uploadedImages": [
                {"originalName": "p0.jpg", "cloudinary": {"url": "https://cdn/p0.jpg"}},
                {"originalName": "p1.jpg", "cloudinary": {"url": ""}},
                {"originalName": "p2.jpg", "cloudinary": {"url": "https://cdn/p2.jpg"}}
            ],
            "errors": [{"originalName": "p1.jpg", "error": "too large"}],
            "summary": {"total": 3, "successful": 2, "failed": 1}
        }))
        .unwrap();
        let outcome = upload.finish(ImageUploadOutcome::from_response(true, response)).clone();

        assert_eq!(outcome.joined_urls(), "https://cdn/p0.jpg|https://cdn/p2.jpg");
        assert_eq!(outcome.errors[0].text(), "p1.jpg: too large");
        assert_eq!(outcome.summary.unwrap().failed, 1);
        assert!(upload.staged().is_empty());
        assert_eq!(upload.progress(), 0);
        assert_eq!(upload.phase(), UploadPhase::Succeeded);
    }

    #[test]
    fn test_image_failure_keeps_staged_files() {
        let mut upload = ImageUpload::default();
        upload.stage(images("p", 4)).unwrap();
        upload.begin().unwrap();
        upload.finish(ImageUploadOutcome::transport_failure("timed out"));

        assert_eq!(upload.staged().len(), 4);
        assert_eq!(upload.progress(), 4);
        assert_eq!(upload.phase(), UploadPhase::Failed);
        assert_eq!(upload.outcome().unwrap().message, "Failed to upload images");
    }

    #[test]
    fn test_image_rejected_body_keeps_staged_files() {
        let mut upload = ImageUpload::default();
        upload.stage(images("p", 2)).unwrap();
        upload.begin().unwrap();

        let response: ImageUploadResponse = serde_json::from_value(json!({
            "success": false,
            "message": "Cloud storage unavailable",
            "uploadedImages": [
                {"originalName": "p0.jpg", "cloudinary": {"url": "https://cdn/p0.jpg"}}
            ]
        }))
        .unwrap();
        let outcome = upload.finish(ImageUploadOutcome::from_response(true, response)).clone();

        assert!(!outcome.success);
        assert!(outcome.urls().is_empty());
        assert_eq!(upload.staged().len(), 2);
        assert_eq!(upload.phase(), UploadPhase::Failed);
    }

    proptest! {
        #[test]
        fn prop_rejected_batches_leave_staged_set_unchanged(
            first in 0usize..50,
            second in 0usize..60,
            poison in any::<bool>(),
        ) {
            let mut upload = ImageUpload::default();
            upload.stage(images("a", first)).unwrap();
            let before = upload.staged().to_vec();

            let mut batch = images("b", second);
            if poison {
                batch.push(file("bad.gif"));
            }
            let total = first + batch.len();
            let result = upload.stage(batch);

            if total > MAX_BULK_IMAGES || poison {
                prop_assert!(result.is_err());
                prop_assert_eq!(upload.staged(), before.as_slice());
            } else {
                prop_assert_eq!(upload.staged().len(), total);
            }
            prop_assert!(upload.staged().len() <= MAX_BULK_IMAGES);
        }
    }
}
