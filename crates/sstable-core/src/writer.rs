//! Table writer

use crate::config::TableConfig;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::format::{FOOTER_SIZE, Footer};
use crate::index::IndexEntry;
use crate::seq::encode_slice_into;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of key-value pairs written
    pub entry_count: usize,
    /// Index entries in the order they were written, one per data block
    pub index: Vec<IndexEntry>,
    /// Offset where the index block starts
    pub index_offset: u64,
    /// Total bytes written, footer included
    pub file_size: u64,
}

impl WriteSummary {
    /// Number of data blocks
    pub fn block_count(&self) -> usize {
        self.index.len()
    }
}

/// Writes a [`Dictionary`] to disk as an immutable table file.
///
/// # File Layout (version 0)
///
/// ```text
/// [DATA]   repeated: varint(len key) | key | varint(len value) | value
/// [INDEX]  repeated: varint(len key) | key | varint(block offset)
/// [FOOTER] index_offset (u64 LE) | format_version (u64 LE)
/// ```
///
/// A block closes after the pair that brings it to at least `block_size`
/// bytes, and after the final pair. Each index entry records the block's last
/// key and the offset of its first pair.
#[derive(Debug, Clone, Default)]
pub struct TableWriter {
    config: TableConfig,
}

impl TableWriter {
    /// Create a writer with the given configuration
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    /// Writer configuration
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Write `dict` to a new table file at `path`
    ///
    /// The dictionary is sorted in place first. Output goes to `<path>.tmp`,
    /// is flushed (and synced when configured), then renamed over `path`. The
    /// temporary file is removed if any step fails.
    pub fn write(&self, path: &Path, dict: &mut Dictionary) -> Result<WriteSummary> {
        self.config.validate()?;

        let tmp_path = tmp_path_for(path)?;
        debug!(
            "Writing table {:?} ({} entries, block size {})",
            path,
            dict.len(),
            self.config.block_size
        );

        let result = self.write_tmp(&tmp_path, dict).and_then(|summary| {
            fs::rename(&tmp_path, path)?;
            Ok(summary)
        });

        match result {
            Ok(summary) => {
                debug!(
                    "Wrote table {:?}: {} entries in {} blocks, {} bytes",
                    path,
                    summary.entry_count,
                    summary.block_count(),
                    summary.file_size
                );
                Ok(summary)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }

    fn write_tmp(&self, tmp_path: &Path, dict: &mut Dictionary) -> Result<WriteSummary> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(tmp_path)?;

        let mut writer = BufWriter::new(file);
        let summary = self.write_to(&mut writer, dict)?;

        let file: File = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        if self.config.sync_on_write {
            file.sync_all()?;
        }

        Ok(summary)
    }

    /// Encode `dict` as a complete table into any byte sink
    ///
    /// The dictionary is sorted in place first. The sink is flushed but not
    /// closed.
    pub fn write_to<W: Write>(&self, writer: &mut W, dict: &mut Dictionary) -> Result<WriteSummary> {
        self.config.validate()?;

        // Binary search over the index only works on sorted keys
        dict.sort();

        let block_size = self.config.block_size as u64;
        let mut index = Vec::new();
        let mut offset = 0u64;
        let mut block_start = 0u64;
        let last = dict.len().saturating_sub(1);

        for (i, pair) in dict.iter().enumerate() {
            let written =
                encode_slice_into(&pair.key, writer)? + encode_slice_into(&pair.value, writer)?;
            offset += written as u64;

            if offset - block_start >= block_size || i == last {
                trace!(
                    "Block {} closed: offset={}, size={}",
                    index.len(),
                    block_start,
                    offset - block_start
                );
                index.push(IndexEntry::new(pair.key.clone(), block_start));
                block_start = offset;
            }
        }

        let index_offset = offset;

        for entry in &index {
            offset += entry.encode_into(writer)? as u64;
        }

        writer.write_all(&Footer::new(index_offset).to_bytes()?)?;
        offset += FOOTER_SIZE as u64;

        writer.flush()?;

        Ok(WriteSummary {
            entry_count: dict.len(),
            index,
            index_offset,
            file_size: offset,
        })
    }
}

/// Write `dict` to `path` with the default configuration
pub fn write<P: AsRef<Path>>(path: P, dict: &mut Dictionary) -> Result<WriteSummary> {
    TableWriter::default().write(path.as_ref(), dict)
}

/// `<dir>/<name>.tmp` next to the destination
fn tmp_path_for(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("table path {} has no file name", path.display()),
        )
    })?;

    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}
