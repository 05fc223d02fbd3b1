//! idgate command line tool.
//!
//! Exercises the verification engines outside an embedding application:
//! scan OCR text dumps, replay recorded liveness frame scripts, compute
//! check digits, and inspect the effective configuration.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use idgate_liveness::{
    CaptureOutcome, Command as ChallengeCommand, Evaluator, LivenessConfig, LivenessSession,
    LivenessStatus,
};
use idgate_mrz::check_digit;
use idgate_session::{init_logging, scan_text, EngineConfig, LogFormat, ScanConfig};
use idgate_types::{FrameReport, PhotoRef, Viewport};

#[derive(Parser)]
#[command(name = "idgate", about = "Identity verification engine tool")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "IDGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IDGATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, env = "IDGATE_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Scan raw OCR text for a machine-readable zone.
    Scan {
        /// Input file, or "-" for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Candidate line length gate. Without a config file this defaults
        /// to the permissive server preset.
        #[arg(long)]
        min_line_len: Option<usize>,

        /// Report checksum failures without attempting repair.
        #[arg(long)]
        no_repair: bool,
    },

    /// Replay a recorded frame script, one JSON frame report per line,
    /// through the challenge reducer at the recorded timestamps.
    Replay {
        /// Input file, or "-" for stdin.
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Viewport width the script was recorded against.
        #[arg(long, default_value_t = 390.0)]
        width: f64,

        /// Viewport height the script was recorded against.
        #[arg(long, default_value_t = 844.0)]
        height: f64,
    },

    /// Compute the ICAO 9303 check digit for a field.
    CheckDigit { data: String },

    /// Print the effective configuration as TOML.
    PrintConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::from_toml_file(path)?,
        None => EngineConfig::default(),
    };
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let format = LogFormat::from_name(cli.log_format.as_deref().unwrap_or(&config.log_format));
    init_logging(format, level);
    if let Some(path) = cli.config.as_deref() {
        tracing::info!(path = %path.display(), "loaded configuration");
    }

    match cli.command {
        Command::Scan {
            input,
            min_line_len,
            no_repair,
        } => {
            let mut scan = if cli.config.is_some() {
                config.scan.clone()
            } else {
                ScanConfig::permissive()
            };
            if let Some(len) = min_line_len {
                scan.min_line_len = len;
            }
            if no_repair {
                scan.repair = false;
            }

            let text = read_input(&input)?;
            let report = scan_text(&text, &scan);
            match report.parsed.as_ref() {
                Some(doc) => tracing::info!(
                    format = doc.format(),
                    checks_passed = doc.all_checks_passed(),
                    corrections = report.corrections.len(),
                    "document parsed"
                ),
                None => tracing::warn!(
                    candidates = report.mrz_lines.len(),
                    "no machine-readable zone recognized"
                ),
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Replay {
            input,
            width,
            height,
        } => {
            let reader = open_input(&input)?;
            let status = replay(
                reader,
                Viewport::new(width, height),
                config.liveness.clone(),
            )?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Command::CheckDigit { data } => {
            println!("{}", check_digit(&data));
        }

        Command::PrintConfig => {
            print!("{}", config.to_toml_string());
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        io::read_to_string(io::stdin()).context("reading stdin")
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Drives the challenge reducer with the exact timestamps the script
/// recorded. Recorded stamps are historical, so replaying against the wall
/// clock would expire every window instantly; the reducer only ever sees
/// script time. Photo capture is synthesized so a complete script reaches
/// `Done`.
fn replay(
    reader: impl BufRead,
    viewport: Viewport,
    config: LivenessConfig,
) -> anyhow::Result<LivenessStatus> {
    let evaluator = Evaluator::new(config);
    let mut session = LivenessSession::new(viewport);
    let mut frames = 0u64;

    for line in reader.lines() {
        let line = line.context("reading frame script")?;
        if line.trim().is_empty() {
            continue;
        }
        let report: FrameReport =
            serde_json::from_str(&line).with_context(|| format!("frame {}", frames + 1))?;
        frames += 1;

        let step_before = session.step;
        let command = evaluator.observe(&mut session, &report.faces, report.at);
        if let Some(ChallengeCommand::RequestPhoto { generation }) = command {
            evaluator.finish_capture(
                &mut session,
                generation,
                CaptureOutcome::Captured(PhotoRef::new("replay.jpg")),
            );
        }
        if session.step != step_before {
            tracing::info!(at = %report.at, from = %step_before, to = %session.step, "step transition");
        }
    }

    // Run out any deadline still armed after the last frame.
    while !session.step.is_terminal() {
        let Some(deadline) = session.next_deadline() else {
            break;
        };
        evaluator.expire(&mut session, deadline);
    }

    tracing::info!(frames, step = %session.step, "replay finished");
    Ok(session.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_liveness::ChallengeStep;
    use idgate_types::{BoundingBox, FaceFrame, Timestamp};
    use std::io::Cursor;

    fn centered() -> FaceFrame {
        FaceFrame::neutral(BoundingBox::new(150.0, 350.0, 100.0, 100.0))
    }

    fn blinking() -> FaceFrame {
        FaceFrame {
            left_eye_open: Some(0.1),
            right_eye_open: Some(0.1),
            ..centered()
        }
    }

    fn turned(yaw: f64) -> FaceFrame {
        FaceFrame { yaw, ..centered() }
    }

    fn smiling() -> FaceFrame {
        FaceFrame {
            smiling: Some(0.9),
            ..centered()
        }
    }

    fn frame(face: FaceFrame, at: u64) -> String {
        serde_json::to_string(&FrameReport::new(vec![face], Timestamp::new(at)))
            .expect("frame serializes")
    }

    fn run(script: &[String]) -> LivenessStatus {
        replay(
            Cursor::new(script.join("\n")),
            Viewport::new(400.0, 800.0),
            LivenessConfig::default(),
        )
        .expect("script replays")
    }

    #[test]
    fn complete_script_replays_to_done() {
        let mut script = vec![frame(centered(), 0), frame(centered(), 600)];
        for at in [700, 800, 900] {
            script.push(frame(blinking(), at));
        }
        script.push(frame(turned(-25.0), 1_000));
        script.push(frame(turned(-25.0), 2_100));
        script.push(frame(turned(25.0), 2_200));
        script.push(frame(turned(25.0), 3_300));
        script.push(frame(smiling(), 3_400));
        script.push(frame(centered(), 3_500));

        let status = run(&script);
        assert_eq!(status.step, ChallengeStep::Done);
        assert!(status.flags.centered);
        assert!(status.flags.blink_passed);
        assert!(status.flags.turn_right_passed);
        assert!(status.flags.turn_left_passed);
        assert!(status.flags.smile_passed);
        assert_eq!(status.captured_photo_ref, Some(PhotoRef::new("replay.jpg")));
    }

    #[test]
    fn truncated_script_runs_out_the_blink_clock() {
        let script = vec![frame(centered(), 0), frame(centered(), 600)];
        let status = run(&script);
        assert_eq!(status.step, ChallengeStep::Failed);
        assert!(!status.flags.blink_passed);
    }

    #[test]
    fn malformed_script_line_is_an_error() {
        let result = replay(
            Cursor::new("not json".to_string()),
            Viewport::new(400.0, 800.0),
            LivenessConfig::default(),
        );
        assert!(result.is_err());
    }
}
