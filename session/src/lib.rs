//! Service layer for the idgate verification engines.
//!
//! Wires the MRZ codec and the liveness evaluator to the outside world:
//! pluggable OCR, preprocessing, and camera services, the scan pipeline,
//! the async liveness loop, plus configuration, logging, metrics, and
//! shutdown plumbing for embedding applications.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod scan;
pub mod service;
pub mod services;
pub mod shutdown;

pub use config::{EngineConfig, ScanConfig};
pub use error::{ConfigError, ServiceError};
pub use logging::{init_logging, LogFormat};
pub use metrics::EngineMetrics;
pub use scan::{scan_text, MrzScanReport, MrzScanner};
pub use service::LivenessService;
pub use services::{ImagePreprocessor, OcrEngine, PhotoCapture, StagedImage};
pub use shutdown::ShutdownController;
