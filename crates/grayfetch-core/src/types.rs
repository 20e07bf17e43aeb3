//! Core data types flowing through the grayfetch pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A remote resource locator for one input image.
///
/// Links are opaque: no normalization or uniqueness check is applied, so a
/// duplicated link is downloaded and converted twice under different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Link(String);

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Link {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Link {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A successfully downloaded image waiting for conversion.
///
/// Not `Clone`: a handle is moved into the staging channel and out to
/// exactly one worker.
#[derive(Debug)]
pub struct LocalImage {
    /// Positional id of the link in the input sequence
    pub id: usize,
    /// The link this file was fetched from
    pub link: Link,
    /// Location of the downloaded file in the staging directory
    pub path: PathBuf,
}

/// Stage at which an item was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Download,
    Conversion,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Download => write!(f, "download"),
            FailureStage::Conversion => write!(f, "conversion"),
        }
    }
}

/// A single item that did not make it to the output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    pub id: usize,
    pub link: Link,
    pub stage: FailureStage,
    pub message: String,
}

/// Progress notification emitted as items move through the pipeline.
///
/// Delivered from whichever task handled the item, so callbacks must be
/// `Send + Sync` and should return quickly.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Downloaded { id: usize, path: PathBuf },
    DownloadFailed { id: usize, link: Link, message: String },
    Converted { id: usize, input: PathBuf, output: PathBuf },
    ConversionFailed { id: usize, input: PathBuf, message: String },
}

/// Final tally of a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of links handed to the dispatcher
    pub total_links: usize,
    /// Downloads that produced a staging file
    pub downloaded: usize,
    /// Downloads that failed
    pub download_failures: usize,
    /// Conversions that wrote an output file
    pub converted: usize,
    /// Conversions that failed
    pub conversion_failures: usize,
    /// Details of every dropped item, in completion order
    pub failures: Vec<ItemFailure>,
    /// Wall-clock duration of the run
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl PipelineSummary {
    /// Total number of items that failed at any stage.
    pub fn failed(&self) -> usize {
        self.download_failures + self.conversion_failures
    }

    /// Whether every link produced an output file.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0 && self.converted == self.total_links
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
