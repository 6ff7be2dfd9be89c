//! Trace Stream
//!
//! Reads simulation frames from either serialized shape:
//!
//! ```text
//! Document:  { "trace": [ <frame>, <frame>, ... ] }
//! Lines:     <frame>\n<frame>\n...      (one JSON object per line)
//! ```
//!
//! The shape is chosen once, when the stream is opened, and never inside the
//! per-frame path. `frames()` restarts from the first frame on every call, so
//! the stream can be probed (for frame spacing) and then replayed.
//!
//! Frames are yielded in file order; the stream does not re-sort them.

use crate::core::clock::FrameClock;
use crate::models::frame::TraceFrame;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to read trace {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed trace frame at line {line}: {message}")]
    MalformedFrame { line: usize, message: String },

    #[error("Trace contains no frames")]
    EmptyTrace,
}

/// Serialized shape of a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Single JSON document with a `trace` array
    Document,

    /// One JSON frame object per line
    Lines,
}

impl TraceFormat {
    /// Pick the shape by peeking at the first non-blank line
    ///
    /// Every NDJSON frame starts with `{` too, so a leading brace alone is not
    /// enough: the first line must also fail to stand on its own as a frame,
    /// or carry a top-level `trace` key, for the source to be a document.
    ///
    /// # Example
    /// ```
    /// use swarm_replay_core::TraceFormat;
    ///
    /// let lines = "{\"t\":0}\n{\"t\":1}\n";
    /// assert_eq!(TraceFormat::detect(lines.as_bytes()).unwrap(), TraceFormat::Lines);
    ///
    /// let document = "{\n  \"trace\": []\n}\n";
    /// assert_eq!(TraceFormat::detect(document.as_bytes()).unwrap(), TraceFormat::Document);
    /// ```
    pub fn detect<R: BufRead>(reader: R) -> io::Result<Self> {
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim_start_matches('\u{feff}').trim();
            if trimmed.is_empty() {
                continue;
            }
            if !trimmed.starts_with('{') {
                return Ok(TraceFormat::Lines);
            }
            return Ok(match serde_json::from_str::<serde_json::Value>(trimmed) {
                Ok(serde_json::Value::Object(map)) if map.contains_key("trace") => {
                    TraceFormat::Document
                }
                Ok(_) => TraceFormat::Lines,
                Err(_) => TraceFormat::Document,
            });
        }
        Ok(TraceFormat::Lines)
    }
}

#[derive(Debug, Deserialize)]
struct TraceDocument {
    #[serde(default)]
    trace: Vec<TraceFrame>,
}

/// Where the trace bytes come from
#[derive(Debug, Clone)]
enum TraceSource {
    Path(PathBuf),
    Inline(Arc<[u8]>),
}

impl TraceSource {
    fn describe(&self) -> String {
        match self {
            TraceSource::Path(path) => path.display().to_string(),
            TraceSource::Inline(_) => "<inline>".to_string(),
        }
    }

    fn open(&self) -> Result<Box<dyn BufRead>, TraceError> {
        match self {
            TraceSource::Path(path) => {
                let file = File::open(path).map_err(|source| TraceError::Io {
                    path: self.describe(),
                    source,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            TraceSource::Inline(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }
}

/// Restartable, ordered sequence of trace frames
///
/// # Example
/// ```
/// use swarm_replay_core::TraceStream;
///
/// let stream = TraceStream::from_text("{\"t\":0}\n{\"t\":0.5}\n").unwrap();
/// let frames: Vec<_> = stream.frames().unwrap().collect::<Result<_, _>>().unwrap();
/// assert_eq!(frames.len(), 2);
/// assert_eq!(stream.frame_clock().unwrap().dt(), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct TraceStream {
    source: TraceSource,
    format: TraceFormat,
}

impl TraceStream {
    /// Open a trace file, detecting its shape
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        Self::open_with_format(path, None)
    }

    /// Open a trace file; `None` detects the shape, `Some` forces it
    pub fn open_with_format(
        path: impl AsRef<Path>,
        format: Option<TraceFormat>,
    ) -> Result<Self, TraceError> {
        Self::with_source(TraceSource::Path(path.as_ref().to_path_buf()), format)
    }

    /// Trace held in memory, detecting its shape
    pub fn from_text(text: impl Into<String>) -> Result<Self, TraceError> {
        Self::from_text_with_format(text, None)
    }

    pub fn from_text_with_format(
        text: impl Into<String>,
        format: Option<TraceFormat>,
    ) -> Result<Self, TraceError> {
        let bytes: Arc<[u8]> = Arc::from(text.into().into_bytes());
        Self::with_source(TraceSource::Inline(bytes), format)
    }

    fn with_source(source: TraceSource, format: Option<TraceFormat>) -> Result<Self, TraceError> {
        let format = match format {
            Some(format) => format,
            None => TraceFormat::detect(source.open()?).map_err(|source_err| TraceError::Io {
                path: source.describe(),
                source: source_err,
            })?,
        };
        debug!(source = %source.describe(), ?format, "opened trace");
        Ok(Self { source, format })
    }

    pub fn format(&self) -> TraceFormat {
        self.format
    }

    /// Iterate frames from the start
    pub fn frames(&self) -> Result<Frames, TraceError> {
        let reader = self.source.open()?;
        let inner = match self.format {
            TraceFormat::Lines => FramesInner::Lines {
                lines: reader.lines(),
                line: 0,
                path: self.source.describe(),
            },
            TraceFormat::Document => {
                let document: TraceDocument =
                    serde_json::from_reader(reader).map_err(|e| TraceError::MalformedFrame {
                        line: e.line(),
                        message: e.to_string(),
                    })?;
                FramesInner::Document(document.trace.into_iter())
            }
        };
        Ok(Frames { inner })
    }

    /// Frame spacing from the first two frames
    ///
    /// A single frame yields the fallback clock; zero frames is `EmptyTrace`.
    pub fn frame_clock(&self) -> Result<FrameClock, TraceError> {
        let leading = self
            .frames()?
            .take(2)
            .map(|frame| frame.map(|frame| frame.t))
            .collect::<Result<Vec<_>, _>>()?;
        if leading.is_empty() {
            return Err(TraceError::EmptyTrace);
        }
        Ok(FrameClock::from_leading(&leading))
    }
}

/// Iterator over the frames of a `TraceStream`
pub struct Frames {
    inner: FramesInner,
}

enum FramesInner {
    Lines {
        lines: io::Lines<Box<dyn BufRead>>,
        line: usize,
        path: String,
    },
    Document(std::vec::IntoIter<TraceFrame>),
}

impl Iterator for Frames {
    type Item = Result<TraceFrame, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            FramesInner::Document(frames) => frames.next().map(Ok),
            FramesInner::Lines { lines, line, path } => loop {
                let text = match lines.next()? {
                    Ok(text) => text,
                    Err(source) => {
                        return Some(Err(TraceError::Io {
                            path: path.clone(),
                            source,
                        }))
                    }
                };
                *line += 1;
                let trimmed = text.trim_start_matches('\u{feff}').trim();
                if trimmed.is_empty() {
                    continue;
                }
                return Some(serde_json::from_str(trimmed).map_err(|e| {
                    TraceError::MalformedFrame {
                        line: *line,
                        message: e.to_string(),
                    }
                }));
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_document_is_detected() {
        let text = r#"{"trace":[{"t":0},{"t":1}]}"#;
        assert_eq!(
            TraceFormat::detect(text.as_bytes()).unwrap(),
            TraceFormat::Document
        );
    }

    #[test]
    fn test_empty_source_is_lines() {
        assert_eq!(TraceFormat::detect("\n\n".as_bytes()).unwrap(), TraceFormat::Lines);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let stream = TraceStream::from_text("{\"t\":0}\n\nnot json\n").unwrap();
        let results: Vec<_> = stream.frames().unwrap().collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(TraceError::MalformedFrame { line, .. }) => assert_eq!(*line, 3),
            other => panic!("expected malformed frame, got {other:?}"),
        }
    }
}
