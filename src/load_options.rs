//! Options for loading XLIFF documents from disk.

use crate::xml::ParseLimits;

/// Files larger than this many bytes are parsed with relaxed limits.
pub const HUGE_FILE_THRESHOLD: u64 = 9_000_000;

/// Load behavior options for [`crate::Xliff::load_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Size above which [`ParseLimits::relaxed`] is used.
    pub huge_file_threshold: u64,
    /// Always use relaxed limits, whatever the file size.
    pub force_relaxed: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            huge_file_threshold: HUGE_FILE_THRESHOLD,
            force_relaxed: false,
        }
    }
}

impl LoadOptions {
    /// Creates default load options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the huge-file threshold, in bytes.
    pub fn with_huge_file_threshold(mut self, bytes: u64) -> Self {
        self.huge_file_threshold = bytes;
        self
    }

    /// Enables/disables relaxed limits for every file.
    pub fn with_force_relaxed(mut self, force_relaxed: bool) -> Self {
        self.force_relaxed = force_relaxed;
        self
    }

    /// Parser limits for a file of `file_size` bytes.
    pub fn limits_for(&self, file_size: u64) -> ParseLimits {
        if self.force_relaxed || file_size > self.huge_file_threshold {
            ParseLimits::relaxed()
        } else {
            ParseLimits::default()
        }
    }
}
