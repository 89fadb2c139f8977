//! Writer configuration.

use h5grid_format::property_list::{FileAccessProps, FileCreateProps};

use crate::lock::LockScope;

/// Options for [`Writer::create_with`](crate::Writer::create_with).
///
/// ```
/// use h5grid::{LockScope, WriterOptions};
///
/// let opts = WriterOptions::new()
///     .lock_scope(LockScope::PerWriter)
///     .seed(42)
///     .extension("hdf5");
/// assert_eq!(opts.extension, "hdf5");
/// ```
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub lock_scope: LockScope,
    /// Seed for the file-name generator; `None` seeds from OS entropy.
    /// Two writers with the same seed, prefix and directory pick the same
    /// file name, and the second truncates the first.
    pub seed: Option<u64>,
    /// File extension without the dot (default: `h5`).
    pub extension: String,
    pub file_create: FileCreateProps,
    pub file_access: FileAccessProps,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            lock_scope: LockScope::Global,
            seed: None,
            extension: "h5".to_string(),
            file_create: FileCreateProps::default(),
            file_access: FileAccessProps::default(),
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_scope(mut self, scope: LockScope) -> Self {
        self.lock_scope = scope;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into();
        self
    }

    pub fn file_create(mut self, fcpl: FileCreateProps) -> Self {
        self.file_create = fcpl;
        self
    }

    pub fn file_access(mut self, fapl: FileAccessProps) -> Self {
        self.file_access = fapl;
        self
    }
}
