//! Table reader
//!
//! [`Table::open`] returns at once and loads the sparse index on a background
//! thread. Until the index is published the table answers every lookup with a
//! miss, without touching the disk. Callers that need authoritative answers
//! wait with [`Table::ready`] or [`Table::wait_ready`] first.
//!
//! ```rust,no_run
//! use sstable_core::{Dictionary, Table, write};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dict = Dictionary::new();
//! dict.insert("alice", "1").insert("bob", "2");
//! write("people.sst", &mut dict)?;
//!
//! let table = Table::open("people.sst");
//! assert!(table.wait_ready().is_live());
//! assert_eq!(table.get(b"bob")?, Some(b"2".to_vec()));
//! # Ok(())
//! # }
//! ```

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::format::Footer;
use crate::index::SparseIndex;
use crate::seq::Seq;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Name given to index loader threads
const LOADER_THREAD_NAME: &str = "sstable-load";

/// Lifecycle of a [`Table`] as seen by callers
#[derive(Debug, Clone)]
pub enum TableStatus {
    /// Index is still being read; lookups report misses
    Loading,
    /// Index is loaded; lookups are authoritative
    Live,
    /// Index could not be loaded; lookups fail
    Failed(Arc<TableError>),
}

impl TableStatus {
    /// Check if the index is still loading
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the table is ready for lookups
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Check if loading failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Load failure, if any
    pub fn error(&self) -> Option<&TableError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// State published by the loader thread
///
/// The index travels with the `Live` state, so observing `Live` through the
/// channel is what makes the index visible to readers.
#[derive(Debug, Clone)]
enum LoadState {
    Loading,
    Live(Arc<SparseIndex>),
    Failed(Arc<TableError>),
}

impl LoadState {
    fn status(&self) -> TableStatus {
        match self {
            Self::Loading => TableStatus::Loading,
            Self::Live(_) => TableStatus::Live,
            Self::Failed(e) => TableStatus::Failed(Arc::clone(e)),
        }
    }
}

/// Read handle for a table file
///
/// The file is opened anew for every lookup; no handle is kept between calls,
/// so a `Table` can be shared across threads and queried concurrently once
/// live.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    config: TableConfig,
    state: watch::Receiver<LoadState>,
}

impl Table {
    /// Open a table with the default configuration
    ///
    /// Never blocks. The returned table starts out [`TableStatus::Loading`].
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::open_with_config(path, TableConfig::default())
    }

    /// Open a table with a custom configuration
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: TableConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!("Opening table {:?}", path);

        if let Err(e) = config.validate() {
            return Self::failed(path, config, e);
        }

        let (tx, rx) = watch::channel(LoadState::Loading);
        let loader_path = path.clone();

        let spawned = thread::Builder::new()
            .name(LOADER_THREAD_NAME.into())
            .spawn(move || {
                let state = match load_index(&loader_path) {
                    Ok(index) => {
                        info!(
                            "Table {:?} live: {} blocks, data section {} bytes",
                            loader_path,
                            index.len(),
                            index.data_end()
                        );
                        LoadState::Live(Arc::new(index))
                    }
                    Err(e) => {
                        warn!("Failed to load table {:?}: {}", loader_path, e);
                        LoadState::Failed(Arc::new(e))
                    }
                };
                // Succeeds even when every table handle is already gone
                tx.send_replace(state);
            });

        match spawned {
            Ok(_) => Self {
                path,
                config,
                state: rx,
            },
            Err(e) => {
                warn!("Could not spawn index loader for {:?}: {}", path, e);
                Self::failed(path, config, TableError::Io(e))
            }
        }
    }

    /// Table that is already in its terminal failed state
    fn failed(path: PathBuf, config: TableConfig, error: TableError) -> Self {
        let (_, rx) = watch::channel(LoadState::Failed(Arc::new(error)));
        Self {
            path,
            config,
            state: rx,
        }
    }

    /// Current lifecycle status
    pub fn status(&self) -> TableStatus {
        self.state.borrow().status()
    }

    /// Wait until the table leaves [`TableStatus::Loading`]
    ///
    /// Works on any executor. Returns the terminal status.
    pub async fn ready(&self) -> TableStatus {
        let mut rx = self.state.clone();
        match rx
            .wait_for(|state| !matches!(state, LoadState::Loading))
            .await
        {
            Ok(state) => state.status(),
            // Loader went away without publishing (it panicked)
            Err(_) => TableStatus::Failed(Arc::new(TableError::LoadAborted)),
        }
    }

    /// Block the calling thread until the table leaves
    /// [`TableStatus::Loading`]
    pub fn wait_ready(&self) -> TableStatus {
        futures::executor::block_on(self.ready())
    }

    /// Loaded index, once live
    pub fn index(&self) -> Option<Arc<SparseIndex>> {
        match &*self.state.borrow() {
            LoadState::Live(index) => Some(Arc::clone(index)),
            _ => None,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reader configuration
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Look up `key`
    ///
    /// - Loading: `Ok(None)` without disk I/O.
    /// - Failed: [`TableError::Unavailable`] with the load failure.
    /// - Live: binary search of the index, then a scan of at most one block.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let index = match &*self.state.borrow() {
            LoadState::Loading => {
                trace!("Lookup on loading table {:?} reported as miss", self.path);
                return Ok(None);
            }
            LoadState::Failed(e) => return Err(TableError::Unavailable(e.to_string())),
            LoadState::Live(index) => Arc::clone(index),
        };

        // O(log B) in memory
        let Some(block) = index.search(key) else {
            trace!("Key beyond last block of {:?}", self.path);
            return Ok(None);
        };
        let Some(range) = index.block_range(block) else {
            return Ok(None);
        };

        trace!(
            "Scanning block {} [{}, {}) of {:?}",
            block, range.start, range.end, self.path
        );
        scan_block(&self.path, range, key, self.config.read_buffer_size)
    }
}

/// Sequentially decode pairs in `range` until `key` is found or passed
fn scan_block(
    path: &Path,
    range: Range<u64>,
    key: &[u8],
    buffer_size: usize,
) -> Result<Option<Vec<u8>>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(range.start))?;

    let len = range.end.saturating_sub(range.start);
    let mut reader = BufReader::with_capacity(buffer_size, file).take(len);

    while reader.limit() > 0 {
        let found_key = Seq::read_from(&mut reader)?;
        let value = Seq::read_from(&mut reader)?;

        match found_key.as_bytes().cmp(key) {
            Ordering::Equal => return Ok(Some(value.into_bytes())),
            // Keys are ascending, nothing further can match
            Ordering::Greater => return Ok(None),
            Ordering::Less => {}
        }
    }

    Ok(None)
}

/// Read a table file's footer and index block
///
/// This is the work [`Table::open`] performs in the background; it is exposed
/// for callers that want to load synchronously.
pub fn load_index(path: &Path) -> Result<SparseIndex> {
    let data = fs::read(path)?;
    debug!("Loading index of {:?} ({} bytes)", path, data.len());

    let footer = Footer::from_file_bytes(&data)?;
    footer.validate_version()?;
    let range = footer.index_range(data.len())?;

    trace!(
        "Footer of {:?}: index at [{}, {}), version {}",
        path, range.start, range.end, footer.format_version
    );

    SparseIndex::parse(&data[range], footer.index_offset)
}
