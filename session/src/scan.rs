//! MRZ scan pipeline.
//!
//! Drives preprocess, crop, OCR, extraction, parse, and repair for one
//! source image, or just the text half for callers that already ran OCR.
//! The pipeline is where the bottom-crop retry policy lives; the engines
//! underneath are pure.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use idgate_mrz::{decode, extract_lines, repair_document, Correction, MrzDocument};
use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::error::ServiceError;
use crate::metrics::EngineMetrics;
use crate::services::{ImagePreprocessor, OcrEngine};

/// Everything one scan produced, down to the raw OCR text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrzScanReport {
    pub raw_text: String,
    pub mrz_lines: Vec<String>,
    pub parsed: Option<MrzDocument>,
    pub corrections: Vec<Correction>,
}

/// Image-driven MRZ scanner over pluggable OCR and preprocessing services.
pub struct MrzScanner<O, P> {
    ocr: Arc<O>,
    preprocessor: Arc<P>,
    config: ScanConfig,
    metrics: Arc<EngineMetrics>,
}

impl<O: OcrEngine, P: ImagePreprocessor> MrzScanner<O, P> {
    pub fn new(
        ocr: Arc<O>,
        preprocessor: Arc<P>,
        config: ScanConfig,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            ocr,
            preprocessor,
            config,
            metrics,
        }
    }

    /// Scan one source image.
    ///
    /// OCR runs against the bottom crop first, where MRZ text sits on real
    /// documents. If that yields fewer than two candidate lines the crop
    /// guess was bad, and OCR runs once more against the whole normalized
    /// image. Staged intermediate files are deleted when this returns,
    /// success or error.
    pub async fn scan_image(&self, source: &Path) -> Result<MrzScanReport, ServiceError> {
        let started = Instant::now();
        self.metrics.scans.inc();

        let normalized = self.preprocessor.normalize(source).await?;
        let cropped = self
            .preprocessor
            .crop_bottom(normalized.path(), self.config.crop_fraction)
            .await?;

        let mut raw_text = self.ocr.recognize(cropped.path()).await?;
        let mut lines = extract_lines(&raw_text, self.config.min_line_len);

        if lines.len() < 2 {
            self.metrics.scan_retries.inc();
            tracing::debug!(
                candidates = lines.len(),
                "crop yielded too few candidate lines, retrying on full image"
            );
            raw_text = self.ocr.recognize(normalized.path()).await?;
            lines = extract_lines(&raw_text, self.config.min_line_len);
        }

        let report = build_report(raw_text, lines, &self.config);
        self.record(&report, started);
        Ok(report)
    }

    fn record(&self, report: &MrzScanReport, started: Instant) {
        if let Some(doc) = report.parsed.as_ref() {
            self.metrics.documents_parsed.inc();
            let failures = doc.failed_check_count();
            if failures > 0 {
                self.metrics.checksum_failures.inc_by(failures as u64);
            }
        }
        if !report.corrections.is_empty() {
            self.metrics
                .repairs_applied
                .inc_by(report.corrections.len() as u64);
        }
        self.metrics
            .scan_duration_seconds
            .observe(started.elapsed().as_secs_f64());
    }
}

/// Scan already-recognized text, the post-OCR half of the pipeline.
///
/// This is the server-side entry point: extraction, parse, and repair with
/// no image handling.
pub fn scan_text(raw_text: &str, config: &ScanConfig) -> MrzScanReport {
    let lines = extract_lines(raw_text, config.min_line_len);
    build_report(raw_text.to_string(), lines, config)
}

fn build_report(raw_text: String, mrz_lines: Vec<String>, config: &ScanConfig) -> MrzScanReport {
    let options = config.parse_options();
    let mut parsed = decode(&mrz_lines, &options);
    let mut corrections = Vec::new();

    if config.repair {
        if let Some(doc) = parsed.as_ref() {
            if let Some((repaired, applied)) = repair_document(doc, &options) {
                tracing::debug!(
                    count = applied.len(),
                    format = repaired.format(),
                    "applied checksum-guided corrections"
                );
                parsed = Some(repaired);
                corrections = applied;
            }
        }
    }

    if let Some(doc) = parsed.as_ref() {
        tracing::debug!(
            format = doc.format(),
            checks_passed = doc.all_checks_passed(),
            "parsed mrz document"
        );
    }

    MrzScanReport {
        raw_text,
        mrz_lines,
        parsed,
        corrections,
    }
}
