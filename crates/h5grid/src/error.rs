//! Error types for the writer/reader layer.

use std::collections::TryReserveError;
use std::path::PathBuf;

use h5grid_format::FormatError;
use thiserror::Error;

/// Errors raised by [`Writer`](crate::Writer) and [`Reader`](crate::Reader).
#[derive(Debug, Error)]
pub enum Error {
    #[error("directory does not exist: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("no write permission in directory: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to create HDF5 file {}", path.display())]
    FileCreationFailed {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("failed to open HDF5 file {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("failed to create dataset '{name}'")]
    DatasetCreationFailed {
        name: String,
        #[source]
        source: FormatError,
    },

    #[error("failed to open dataset '{name}'")]
    DatasetNotFound {
        name: String,
        #[source]
        source: FormatError,
    },

    #[error("failed to initialize dataset '{name}' with NaN values")]
    AllocationFailed {
        name: String,
        #[source]
        source: AllocError,
    },

    #[error("coordinate {coordinate:?} is out of bounds for '{name}' with extent {extents:?}")]
    IndexOutOfRange {
        name: String,
        coordinate: Vec<i64>,
        extents: Vec<u64>,
    },

    #[error("'{name}' has rank {actual}, expected {expected}")]
    RankMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("'{name}' holds {elements} elements, not a single scalar")]
    NotScalar { name: String, elements: u64 },

    #[error("matrix handle does not belong to this writer")]
    InvalidHandle,

    #[error("failed to write to dataset '{name}'")]
    WriteFailed {
        name: String,
        #[source]
        source: FormatError,
    },

    #[error("failed to read from dataset '{name}'")]
    ReadFailed {
        name: String,
        #[source]
        source: FormatError,
    },

    #[error("failed to close HDF5 file {}", path.display())]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// Why the NaN-filled buffer for a new matrix could not be set up.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("extent {0:?} does not fit in memory")]
    Overflow(Vec<u64>),

    #[error("cannot reserve fill buffer: {0}")]
    OutOfMemory(#[from] TryReserveError),

    #[error("cannot write fill values: {0}")]
    Write(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, Error>;
