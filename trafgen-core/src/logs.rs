use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

mod format;

pub use format::{format_line, parse_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LogStream {
    Traffic,
    Security,
    Compromise,
    Dns,
    Statistics,
}

impl LogStream {
    pub const ALL: [Self; 5] = [
        Self::Traffic,
        Self::Security,
        Self::Compromise,
        Self::Dns,
        Self::Statistics,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Traffic => "traffic.log",
            Self::Security => "security_events.log",
            Self::Compromise => "compromised_activity.log",
            Self::Dns => "dns_activity.log",
            Self::Statistics => "statistics.log",
        }
    }

    /// Detection-relevant and statistics records reach disk as they are written so a
    /// collector tailing the files sees them without waiting for the session to end.
    /// Traffic and dns volume stays buffered until the next periodic flush.
    fn flushes_per_record(self) -> bool {
        matches!(self, Self::Security | Self::Compromise | Self::Statistics)
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug)]
struct StreamWriter {
    out: BufWriter<File>,
    last: Option<DateTime<Utc>>,
}

/// Appends session-tagged records to one file per stream.
///
/// Each stream has its own lock, so lines never interleave and the order within a file is
/// the order in which `emit` calls acquired it.
#[derive(Debug)]
pub struct LogRouter {
    session_id: String,
    dir: PathBuf,
    streams: Vec<Mutex<StreamWriter>>,
}

impl LogRouter {
    /// Create `dir` if needed and open every stream file in append mode.
    pub fn open(dir: &Path, session_id: &str) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let mut streams = Vec::with_capacity(LogStream::ALL.len());
        for stream in LogStream::ALL {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(stream.file_name()))?;
            streams.push(Mutex::new(StreamWriter {
                out: BufWriter::new(file),
                last: None,
            }));
        }

        Ok(Self {
            session_id: session_id.to_string(),
            dir: dir.to_path_buf(),
            streams,
        })
    }

    pub fn path(&self, stream: LogStream) -> PathBuf {
        self.dir.join(stream.file_name())
    }

    pub fn emit(&self, stream: LogStream, fields: &[(&str, String)]) -> io::Result<()> {
        let mut w = self.lock(stream);

        // Keep timestamps non-decreasing within a stream even if the wall clock steps back.
        let now = Utc::now();
        let ts = match w.last {
            Some(last) if last > now => last,
            _ => now,
        };
        w.last = Some(ts);

        let line = format_line(ts, &self.session_id, fields);
        w.out.write_all(line.as_bytes())?;
        w.out.write_all(b"\n")?;

        if stream.flushes_per_record() {
            w.out.flush()?;
        }
        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        for stream in LogStream::ALL {
            self.lock(stream).out.flush()?;
        }
        Ok(())
    }

    fn lock(&self, stream: LogStream) -> std::sync::MutexGuard<'_, StreamWriter> {
        self.streams[stream.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for LogRouter {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(error = %err, "failed to flush log streams");
        }
    }
}
