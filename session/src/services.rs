//! Collaborator seams for the scan pipeline and liveness service.
//!
//! OCR, image preprocessing, and the camera are external subsystems. The
//! pipeline talks to them through these traits so production adapters and
//! test fakes plug in interchangeably. Every future is `Send` because the
//! callers run on a multi-threaded runtime and the capture request is
//! spawned onto its own task.

use std::future::Future;
use std::io::Write;
use std::path::Path;

use idgate_types::PhotoRef;
use tempfile::TempPath;

use crate::error::ServiceError;

/// Text recognition over an image file.
pub trait OcrEngine: Send + Sync {
    /// Recognized text for the image at `image`, line breaks preserved.
    fn recognize(
        &self,
        image: &Path,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

/// Orientation/contrast normalization and cropping of source images.
///
/// Both operations stage their output into a fresh temporary file owned by
/// the returned [`StagedImage`].
pub trait ImagePreprocessor: Send + Sync {
    fn normalize(
        &self,
        src: &Path,
    ) -> impl Future<Output = Result<StagedImage, ServiceError>> + Send;

    /// The bottom `fraction` of the image, where MRZ text is conventionally
    /// printed.
    fn crop_bottom(
        &self,
        src: &Path,
        fraction: f64,
    ) -> impl Future<Output = Result<StagedImage, ServiceError>> + Send;
}

/// The camera capture primitive behind the liveness `Capture` step.
pub trait PhotoCapture: Send + Sync {
    fn take_photo(&self) -> impl Future<Output = Result<PhotoRef, ServiceError>> + Send;
}

/// A temporary intermediate image owned by the scan pipeline.
///
/// The backing file is deleted when the value drops, so an early `?` return
/// cannot leave staged artifacts behind.
#[derive(Debug)]
pub struct StagedImage {
    path: TempPath,
}

impl StagedImage {
    /// Take ownership of an already-staged temp path.
    pub fn from_temp(path: TempPath) -> Self {
        Self { path }
    }

    /// Stage `bytes` into a fresh temporary file.
    pub fn create(bytes: &[u8]) -> Result<Self, ServiceError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(bytes)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
