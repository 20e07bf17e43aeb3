//! Test doubles shared by the pipeline tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;

use crate::convert::Converter;
use crate::error::{PipelineError, PipelineResult};

/// A converter that copies input to output instead of running a tool.
///
/// Tracks how many calls are in flight at once and how often the lifecycle
/// hooks ran. Inputs whose file name is in `fail_on` are rejected; those
/// in `panic_on` make the call panic.
#[derive(Default)]
pub(crate) struct CopyConverter {
    fail_on: HashSet<String>,
    panic_on: HashSet<String>,
    delay: Option<Duration>,
    fail_initialize: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    initialized: AtomicUsize,
    terminated: AtomicUsize,
}

impl CopyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.fail_on.insert(file_name.to_string());
        self
    }

    pub fn panicking_on(mut self, file_name: &str) -> Self {
        self.panic_on.insert(file_name.to_string());
        self
    }

    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter on every exit path.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Converter for CopyConverter {
    async fn initialize(&self) -> PipelineResult<()> {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        if self.fail_initialize {
            return Err(PipelineError::ToolUnavailable("copy converter disabled".into()));
        }
        Ok(())
    }

    async fn grayscale(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.panic_on.contains(&name) {
            panic!("converter blew up on {name}");
        }
        if self.fail_on.contains(&name) {
            return Err(PipelineError::Conversion {
                path: input.to_path_buf(),
                message: "simulated tool failure".into(),
            });
        }

        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(|e| PipelineError::Conversion {
                path: input.to_path_buf(),
                message: e.to_string(),
            })
    }

    async fn terminate(&self) {
        self.terminated.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// In-memory sink for `tracing` output emitted on the current thread.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a thread-local subscriber writing `error` events into a buffer.
    ///
    /// Only sees events from tasks polled on this thread, so use it with the
    /// default current-thread `#[tokio::test]` runtime.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .without_time()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Error lines logged by this crate.
    pub fn error_lines(&self) -> Vec<String> {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains("ERROR") && line.contains("grayfetch_core"))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
