//! Configuration for table writers and readers

use crate::error::{Result, TableError};
use crate::format::DEFAULT_BLOCK_SIZE;
use serde::{Deserialize, Serialize};

/// Default buffer capacity used when scanning a data block
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration shared by [`TableWriter`](crate::TableWriter) and
/// [`Table`](crate::Table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Minimum encoded payload per data block before a new block starts
    pub block_size: usize,

    /// Buffer capacity for the sequential scan of one data block
    pub read_buffer_size: usize,

    /// Sync the file to disk before it is renamed into place
    pub sync_on_write: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            sync_on_write: true,
        }
    }
}

impl TableConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block size
    #[must_use]
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the read buffer size
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Enable or disable syncing before the final rename
    #[must_use]
    pub const fn with_sync_on_write(mut self, enable: bool) -> Self {
        self.sync_on_write = enable;
        self
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(TableError::InvalidConfig(
                "block_size must be greater than zero".into(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(TableError::InvalidConfig(
                "read_buffer_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert!(config.sync_on_write);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = TableConfig::new()
            .with_block_size(64)
            .with_read_buffer_size(256)
            .with_sync_on_write(false);
        assert_eq!(config.block_size, 64);
        assert_eq!(config.read_buffer_size, 256);
        assert!(!config.sync_on_write);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(matches!(
            TableConfig::new().with_block_size(0).validate(),
            Err(TableError::InvalidConfig(_))
        ));
        assert!(matches!(
            TableConfig::new().with_read_buffer_size(0).validate(),
            Err(TableError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TableConfig =
            serde_json::from_str(r#"{"block_size": 1024}"#).expect("Operation should succeed");
        assert_eq!(config.block_size, 1024);
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert!(config.sync_on_write);
    }
}
