//! FFmpeg-backed recording sessions.
//!
//! Capture is delegated to an FFmpeg child process writing 16 kHz mono FLAC.
//! A [`RecorderSession`] owns the child for the lifetime of one recording:
//! `spawn` starts it, `stop` asks it to finish (the `q` keypress on stdin),
//! escalates to a kill after a grace period, joins the stderr drain thread,
//! and hands back the finished capture file.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long to wait for FFmpeg to finalize the file after the graceful `q`
/// before escalating to a kill.
const STOP_GRACE: Duration = Duration::from_secs(4);

/// Settle time after the child exits, so the filesystem flush completes
/// before we read the capture.
const FLUSH_WAIT: Duration = Duration::from_millis(500);

/// Window after spawn in which an immediate FFmpeg exit (bad device, bad
/// flags) is reported as a start failure rather than at stop time.
const SPAWN_PROBE: Duration = Duration::from_millis(200);

const STDERR_TAIL_LINES: usize = 12;

/// Platform capture demuxer handed to FFmpeg's `-f` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureBackend {
    /// PulseAudio / PipeWire (Linux)
    Pulse,
    /// AVFoundation (macOS)
    AvFoundation,
    /// DirectShow (Windows)
    DirectShow,
}

impl CaptureBackend {
    /// The demuxer for the compiled target.
    pub fn host_default() -> Self {
        if cfg!(target_os = "windows") {
            CaptureBackend::DirectShow
        } else if cfg!(target_os = "macos") {
            CaptureBackend::AvFoundation
        } else {
            CaptureBackend::Pulse
        }
    }

    fn demuxer(self) -> &'static str {
        match self {
            CaptureBackend::Pulse => "pulse",
            CaptureBackend::AvFoundation => "avfoundation",
            CaptureBackend::DirectShow => "dshow",
        }
    }

    /// Format the `-i` argument for a device name (None = system default).
    fn input_arg(self, device_name: Option<&str>) -> String {
        match self {
            CaptureBackend::Pulse => device_name.unwrap_or("default").to_string(),
            // AVFoundation addresses audio as ":<device>"; ":default" works
            // for the system input.
            CaptureBackend::AvFoundation => {
                format!(":{}", device_name.unwrap_or("default"))
            }
            // DirectShow wants the friendly device name prefixed with
            // "audio=". FFmpeg receives it as a single argv entry, so no
            // shell quoting is needed.
            CaptureBackend::DirectShow => {
                format!("audio={}", device_name.unwrap_or("default"))
            }
        }
    }
}

/// Configuration for one recording session.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Capture device name (None = system default)
    pub device_name: Option<String>,
    /// Where the FLAC capture lands; overwritten every recording
    pub output_path: PathBuf,
    /// Capture demuxer; defaults to the host platform's
    pub backend: CaptureBackend,
}

impl RecorderConfig {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            device_name: None,
            output_path,
            backend: CaptureBackend::host_default(),
        }
    }

    pub fn with_device(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }
}

/// Build the FFmpeg argv for a capture: platform demuxer in, 16 kHz mono
/// FLAC out, overwrite allowed.
fn capture_args(
    backend: CaptureBackend,
    device_name: Option<&str>,
    output: &Path,
) -> Vec<String> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        backend.demuxer().into(),
        "-i".into(),
        backend.input_arg(device_name),
        "-acodec".into(),
        "flac".into(),
        "-ar".into(),
        "16000".into(),
        "-ac".into(),
        "1".into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ]
}

/// A live recording. Dropping the session without calling [`stop`] leaves
/// the FFmpeg child running; the CLI always resolves a session one way or
/// the other.
///
/// [`stop`]: RecorderSession::stop
pub struct RecorderSession {
    child: Child,
    drain: JoinHandle<()>,
    tail_rx: Receiver<Vec<String>>,
    output_path: PathBuf,
    started: Instant,
}

impl RecorderSession {
    /// Start FFmpeg and begin capturing.
    ///
    /// # Errors
    /// Fails if FFmpeg cannot be spawned, or if the child exits within the
    /// probe window (typically a bad device name).
    pub fn spawn(config: &RecorderConfig) -> Result<Self> {
        if let Some(dir) = config.output_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let args = capture_args(
            config.backend,
            config.device_name.as_deref(),
            &config.output_path,
        );
        crate::verbose!("ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to start FFmpeg. Make sure ffmpeg is installed.")?;

        // Drain stderr on its own thread, keeping the tail for diagnostics.
        // The drain ends when the child exits and the pipe hits EOF.
        let stderr = child
            .stderr
            .take()
            .context("FFmpeg child has no stderr pipe")?;
        let (tail_tx, tail_rx) = crossbeam_channel::bounded::<Vec<String>>(1);
        let drain = thread::spawn(move || {
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
            for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                crate::verbose!("ffmpeg: {line}");
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            let _ = tail_tx.send(tail.into_iter().collect());
        });

        // FFmpeg fails fast on a bad device; catch that here instead of
        // reporting a confusing empty capture at stop time.
        thread::sleep(SPAWN_PROBE);
        if child.try_wait()?.is_some() {
            let tail = tail_rx
                .recv_timeout(Duration::from_secs(1))
                .unwrap_or_default();
            let _ = drain.join();
            anyhow::bail!(
                "FFmpeg exited immediately:\n{}",
                render_tail(&tail)
            );
        }

        Ok(Self {
            child,
            drain,
            tail_rx,
            output_path: config.output_path.clone(),
            started: Instant::now(),
        })
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stop recording and return the path of the finished capture.
    ///
    /// Sends `q` to FFmpeg's stdin for a clean finalize, waits up to the
    /// grace period, kills on timeout, then verifies the output file is
    /// non-empty.
    pub fn stop(mut self) -> Result<PathBuf> {
        let died_early = self.child.try_wait()?.is_some();

        if !died_early {
            // Graceful stop: FFmpeg treats 'q' on stdin as quit-and-finalize.
            if let Some(mut stdin) = self.child.stdin.take() {
                let _ = stdin.write_all(b"q");
                let _ = stdin.flush();
            }

            let deadline = Instant::now() + STOP_GRACE;
            loop {
                if self.child.try_wait()?.is_some() {
                    break;
                }
                if Instant::now() >= deadline {
                    crate::verbose!("FFmpeg did not exit after 'q', killing it");
                    let _ = self.child.kill();
                    let _ = self.child.wait();
                    break;
                }
                thread::sleep(Duration::from_millis(100));
            }
        }

        let tail = self
            .tail_rx
            .recv_timeout(Duration::from_secs(2))
            .unwrap_or_default();
        let _ = self.drain.join();

        if died_early {
            anyhow::bail!(
                "FFmpeg terminated before the recording was stopped:\n{}",
                render_tail(&tail)
            );
        }

        // Let the filesystem settle before reading the capture.
        thread::sleep(FLUSH_WAIT);

        let size = std::fs::metadata(&self.output_path)
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            anyhow::bail!(
                "No recording was written to {}:\n{}",
                self.output_path.display(),
                render_tail(&tail)
            );
        }

        crate::verbose!(
            "Recording saved: {} ({size} bytes)",
            self.output_path.display()
        );
        Ok(self.output_path)
    }
}

fn render_tail(tail: &[String]) -> String {
    if tail.is_empty() {
        "(no FFmpeg output captured)".to_string()
    } else {
        tail.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_args_use_default_device() {
        let args = capture_args(CaptureBackend::Pulse, None, Path::new("/tmp/out.flac"));
        let joined = args.join(" ");
        assert!(joined.contains("-f pulse -i default"));
        assert!(joined.contains("-acodec flac -ar 16000 -ac 1"));
        assert!(joined.ends_with("-y /tmp/out.flac"));
    }

    #[test]
    fn dshow_args_prefix_device_name() {
        let args = capture_args(
            CaptureBackend::DirectShow,
            Some("Microphone (USB Audio)"),
            Path::new("out.flac"),
        );
        assert!(args.contains(&"dshow".to_string()));
        assert!(args.contains(&"audio=Microphone (USB Audio)".to_string()));
    }

    #[test]
    fn avfoundation_args_use_colon_syntax() {
        let args = capture_args(CaptureBackend::AvFoundation, Some("0"), Path::new("o.flac"));
        assert!(args.contains(&"avfoundation".to_string()));
        assert!(args.contains(&":0".to_string()));
    }
}
