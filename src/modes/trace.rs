//! JSON-lines record of every published snapshot

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::game::GameSnapshot;

pub struct SnapshotTrace {
    writer: BufWriter<File>,
}

impl SnapshotTrace {
    /// Create (or truncate) the trace file, making parent directories as needed
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create trace file {:?}", path))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one snapshot as a single JSON line
    pub fn record(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot).context("Failed to serialize snapshot")?;
        self.writer
            .write_all(b"\n")
            .context("Failed to write trace line")?;
        self.writer.flush().context("Failed to flush trace")?;
        Ok(())
    }
}
