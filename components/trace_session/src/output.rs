//! Output sink for completed traces

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use crate::aggregator::EventBuffer;
use crate::error::Result;

/// Where a completed trace is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Write to the file at this path
    File(PathBuf),
    /// Write to standard output
    Stdout,
}

impl fmt::Display for OutputDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputDestination::File(path) => write!(f, "{}", path.display()),
            OutputDestination::Stdout => f.write_str("stdout"),
        }
    }
}

/// Serialize the buffer and write it to its destination
///
/// Diagnostics go to the log, never to stdout, since stdout may carry the
/// trace itself.
pub fn write_trace(buffer: &EventBuffer, destination: &OutputDestination) -> Result<()> {
    match destination {
        OutputDestination::File(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, buffer).map_err(std::io::Error::from)?;
            writer.flush()?;
        }
        OutputDestination::Stdout => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer(&mut writer, buffer).map_err(std::io::Error::from)?;
            writer.flush()?;
        }
    }

    info!("Wrote {} trace events to {}", buffer.len(), destination);
    Ok(())
}
