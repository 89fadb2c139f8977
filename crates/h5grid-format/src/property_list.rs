//! Property lists: builder-style option bundles passed to file and
//! dataset creation.
//!
//! ```
//! use h5grid_format::property_list::{lib_version, FileAccessProps};
//!
//! let fapl = FileAccessProps::new()
//!     .version_bounds(lib_version::LATEST, lib_version::LATEST)
//!     .sieve_buffer(1 << 20);
//! assert_eq!(fapl.superblock_version(3), 3);
//! ```

/// Library version bound constants.
pub mod lib_version {
    /// Earliest version, maximum compatibility.
    pub const EARLIEST: u8 = 0;
    /// HDF5 1.8 features.
    pub const V18: u8 = 1;
    /// HDF5 1.10 features.
    pub const V110: u8 = 2;
    /// HDF5 1.12 features.
    pub const V112: u8 = 3;
    /// Latest version.
    pub const LATEST: u8 = 4;
}

/// File creation properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCreateProps {
    /// Requested superblock version, 2 or 3 (default: 3).
    pub superblock_version: u8,
}

impl Default for FileCreateProps {
    fn default() -> Self {
        Self {
            superblock_version: 3,
        }
    }
}

impl FileCreateProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the superblock version.
    pub fn superblock_version(mut self, version: u8) -> Self {
        self.superblock_version = version;
        self
    }
}

/// File access properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAccessProps {
    /// Library version bounds: (low, high), see [`lib_version`].
    pub lib_version_bounds: (u8, u8),
    /// Size of the staging buffer used to encode raw data on write
    /// (default: 64 KiB).
    pub sieve_buffer_size: usize,
}

impl Default for FileAccessProps {
    fn default() -> Self {
        Self {
            lib_version_bounds: (lib_version::LATEST, lib_version::LATEST),
            sieve_buffer_size: 64 * 1024,
        }
    }
}

impl FileAccessProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set library version bounds (low, high).
    pub fn version_bounds(mut self, low: u8, high: u8) -> Self {
        self.lib_version_bounds = (low, high);
        self
    }

    /// Set the raw data staging buffer size. Values below one element are
    /// rounded up.
    pub fn sieve_buffer(mut self, bytes: usize) -> Self {
        self.sieve_buffer_size = bytes.max(8);
        self
    }

    /// Superblock version actually written for a `requested` version.
    ///
    /// Version 3 superblocks need HDF5 1.10; with a lower upper bound the
    /// file falls back to version 2. Version 2 is the oldest layout this
    /// engine writes, so `EARLIEST` bounds still produce it.
    pub fn superblock_version(&self, requested: u8) -> u8 {
        if self.lib_version_bounds.1 < lib_version::V110 {
            requested.min(2)
        } else {
            requested
        }
    }
}

/// Dataset creation properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetCreateProps {
    /// Fill value recorded in the dataset header and written into the
    /// raw storage when it is allocated. `None` leaves the value
    /// undefined and the storage zeroed.
    pub fill_value: Option<f64>,
}

impl DatasetCreateProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill value.
    pub fn fill_value(mut self, value: f64) -> Self {
        self.fill_value = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let fcpl = FileCreateProps::default();
        assert_eq!(fcpl.superblock_version, 3);
        let fapl = FileAccessProps::default();
        assert_eq!(fapl.lib_version_bounds, (lib_version::LATEST, lib_version::LATEST));
        assert_eq!(fapl.sieve_buffer_size, 64 * 1024);
        assert_eq!(DatasetCreateProps::default().fill_value, None);
    }

    #[test]
    fn builders_chain() {
        let fcpl = FileCreateProps::new().superblock_version(2);
        assert_eq!(fcpl.superblock_version, 2);
        let fapl = FileAccessProps::new()
            .version_bounds(lib_version::V18, lib_version::V112)
            .sieve_buffer(4096);
        assert_eq!(fapl.lib_version_bounds, (1, 3));
        assert_eq!(fapl.sieve_buffer_size, 4096);
        let dcpl = DatasetCreateProps::new().fill_value(f64::NAN);
        assert!(dcpl.fill_value.unwrap().is_nan());
    }

    #[test]
    fn tiny_sieve_buffer_rounds_up() {
        assert_eq!(FileAccessProps::new().sieve_buffer(0).sieve_buffer_size, 8);
    }

    #[test]
    fn old_upper_bound_caps_superblock() {
        let fapl = FileAccessProps::new().version_bounds(lib_version::EARLIEST, lib_version::V18);
        assert_eq!(fapl.superblock_version(3), 2);
        let latest = FileAccessProps::new();
        assert_eq!(latest.superblock_version(3), 3);
        assert_eq!(latest.superblock_version(2), 2);
    }
}
