//! Immutable sorted key-value table files with a sparse block index
//!
#![allow(clippy::cast_possible_truncation)] // Offsets are bounded by file length
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::missing_errors_doc)] // Every fallible call returns TableError
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A table is written once from an in-memory [`Dictionary`] and then served
//! read-only. Lookups binary-search a small in-memory index of block
//! boundaries and then scan a single data block on disk.
//!
//! # File Layout
//!
//! ```text
//! +---------------------------+ 0
//! | data block 0              |  varint(len k) k varint(len v) v ...
//! | data block 1              |
//! | ...                       |
//! +---------------------------+ index_offset
//! | index block               |  varint(len k) k varint(block offset) ...
//! +---------------------------+ file_len - 16
//! | footer                    |  index_offset u64 LE | format_version u64 LE
//! +---------------------------+ file_len
//! ```
//!
//! # Lifecycle
//!
//! [`Table::open`] never blocks: the index loads on a background thread while
//! the table reports [`TableStatus::Loading`] and answers every lookup with a
//! miss. Once the index is published the table turns
//! [`TableStatus::Live`]; if loading fails it turns [`TableStatus::Failed`]
//! and lookups return [`TableError::Unavailable`].
//!
//! ```rust,no_run
//! use sstable_core::{Dictionary, Table, write};
//!
//! # async fn example() -> sstable_core::Result<()> {
//! let mut dict = Dictionary::new();
//! dict.insert("carol", "3").insert("alice", "1").insert("bob", "2");
//! write("people.sst", &mut dict)?;
//!
//! let table = Table::open("people.sst");
//! table.ready().await;
//! assert_eq!(table.get(b"alice")?, Some(b"1".to_vec()));
//! assert_eq!(table.get(b"dave")?, None);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dictionary;
pub mod error;
pub mod format;
pub mod index;
pub mod seq;
pub mod table;
pub mod varint;
pub mod writer;

pub use config::TableConfig;
pub use dictionary::{Dictionary, KeyValue};
pub use error::{Result, TableError};
pub use format::{DEFAULT_BLOCK_SIZE, FOOTER_SIZE, FORMAT_VERSION, Footer};
pub use index::{IndexEntry, SparseIndex};
pub use seq::{Seq, less_or_equal};
pub use table::{Table, TableStatus, load_index};
pub use writer::{TableWriter, WriteSummary, write};
