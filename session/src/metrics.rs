//! Prometheus metrics for the verification engines.
//!
//! Counters and histograms covering scan pipeline and liveness service
//! activity. The [`EngineMetrics`] struct owns a dedicated [`Registry`]
//! that an embedding application can encode into the Prometheus text
//! exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Histogram,
    HistogramOpts, IntCounter, Opts, Registry,
};

/// Central collection of all engine-level Prometheus metrics.
pub struct EngineMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Scan pipeline ───────────────────────────────────────────────────
    /// Total number of image scans started.
    pub scans: IntCounter,
    /// Total number of scans that fell back to OCR on the full image.
    pub scan_retries: IntCounter,
    /// Total number of scans that produced a parsed document.
    pub documents_parsed: IntCounter,
    /// Total number of failed check-digit validations across parsed documents.
    pub checksum_failures: IntCounter,
    /// Total number of checksum-guided corrections applied.
    pub repairs_applied: IntCounter,
    /// Time spent in one scan, end to end.
    pub scan_duration_seconds: Histogram,

    // ── Liveness service ────────────────────────────────────────────────
    /// Total number of detector frame reports evaluated.
    pub frames_evaluated: IntCounter,
    /// Total number of full session resets (face lost, off-center, crowd).
    pub session_resets: IntCounter,
    /// Total number of sessions that reached `Done`.
    pub sessions_completed: IntCounter,
    /// Total number of sessions that reached `Failed`.
    pub sessions_failed: IntCounter,
}

impl EngineMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let scans = register_int_counter_with_registry!(
            Opts::new("idgate_scans_total", "Total image scans started"),
            registry
        )
        .expect("failed to register scans counter");

        let scan_retries = register_int_counter_with_registry!(
            Opts::new(
                "idgate_scan_retries_total",
                "Total scans retried against the full image"
            ),
            registry
        )
        .expect("failed to register scan_retries counter");

        let documents_parsed = register_int_counter_with_registry!(
            Opts::new(
                "idgate_documents_parsed_total",
                "Total scans that produced a parsed MRZ document"
            ),
            registry
        )
        .expect("failed to register documents_parsed counter");

        let checksum_failures = register_int_counter_with_registry!(
            Opts::new(
                "idgate_checksum_failures_total",
                "Total failed check-digit validations"
            ),
            registry
        )
        .expect("failed to register checksum_failures counter");

        let repairs_applied = register_int_counter_with_registry!(
            Opts::new(
                "idgate_repairs_applied_total",
                "Total checksum-guided corrections applied"
            ),
            registry
        )
        .expect("failed to register repairs_applied counter");

        let scan_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new("idgate_scan_duration_seconds", "Scan duration in seconds")
                .buckets(prometheus::exponential_buckets(0.001, 2.0, 15).unwrap()),
            registry
        )
        .expect("failed to register scan_duration_seconds histogram");

        let frames_evaluated = register_int_counter_with_registry!(
            Opts::new(
                "idgate_frames_evaluated_total",
                "Total detector frame reports evaluated"
            ),
            registry
        )
        .expect("failed to register frames_evaluated counter");

        let session_resets = register_int_counter_with_registry!(
            Opts::new("idgate_session_resets_total", "Total full session resets"),
            registry
        )
        .expect("failed to register session_resets counter");

        let sessions_completed = register_int_counter_with_registry!(
            Opts::new(
                "idgate_sessions_completed_total",
                "Total liveness sessions that completed"
            ),
            registry
        )
        .expect("failed to register sessions_completed counter");

        let sessions_failed = register_int_counter_with_registry!(
            Opts::new(
                "idgate_sessions_failed_total",
                "Total liveness sessions that failed"
            ),
            registry
        )
        .expect("failed to register sessions_failed counter");

        Self {
            registry,
            scans,
            scan_retries,
            documents_parsed,
            checksum_failures,
            repairs_applied,
            scan_duration_seconds,
            frames_evaluated,
            session_resets,
            sessions_completed,
            sessions_failed,
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_under_one_registry() {
        let metrics = EngineMetrics::new();
        metrics.scans.inc();
        metrics.frames_evaluated.inc();
        metrics.scan_duration_seconds.observe(0.004);

        let families = metrics.registry.gather();
        assert_eq!(families.len(), 10);
        assert!(families
            .iter()
            .any(|f| f.get_name() == "idgate_scans_total"));
    }
}
