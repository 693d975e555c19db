//! Stored-field writer configuration.

/// Configuration for a [`crate::StoredFieldsWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFieldsConfig {
    /// Maximum number of bytes read from a stream that does not report its
    /// size. Longer streams are truncated.
    pub unknown_size_read_limit: usize,

    /// Maximum number of characters accepted from a character stream.
    pub max_text_chars: u64,

    /// Chunk size used when bulk-copying raw documents.
    pub copy_buffer_size: usize,

    /// Whether `flush` also syncs file metadata to disk.
    pub sync_on_flush: bool,
}

impl Default for StoredFieldsConfig {
    fn default() -> Self {
        Self {
            unknown_size_read_limit: 10_000_000,
            max_text_chars: i32::MAX as u64,
            copy_buffer_size: 16 * 1024,
            sync_on_flush: false,
        }
    }
}

impl StoredFieldsConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read ceiling for streams of unknown size.
    #[must_use]
    pub const fn unknown_size_read_limit(mut self, limit: usize) -> Self {
        self.unknown_size_read_limit = limit;
        self
    }

    /// Sets the maximum character-stream length.
    #[must_use]
    pub const fn max_text_chars(mut self, max: u64) -> Self {
        self.max_text_chars = max;
        self
    }

    /// Sets the raw-copy chunk size.
    #[must_use]
    pub const fn copy_buffer_size(mut self, size: usize) -> Self {
        self.copy_buffer_size = size;
        self
    }

    /// Sets whether `flush` also syncs.
    #[must_use]
    pub const fn sync_on_flush(mut self, value: bool) -> Self {
        self.sync_on_flush = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoredFieldsConfig::default();
        assert_eq!(config.unknown_size_read_limit, 10_000_000);
        assert_eq!(config.max_text_chars, 2_147_483_647);
        assert!(!config.sync_on_flush);
    }

    #[test]
    fn builder_pattern() {
        let config = StoredFieldsConfig::new()
            .unknown_size_read_limit(64)
            .max_text_chars(8)
            .copy_buffer_size(4)
            .sync_on_flush(true);

        assert_eq!(config.unknown_size_read_limit, 64);
        assert_eq!(config.max_text_chars, 8);
        assert_eq!(config.copy_buffer_size, 4);
        assert!(config.sync_on_flush);
    }
}
