//! Error types for the HDF5 engine.

use thiserror::Error;

/// Errors raised while encoding, decoding, or doing I/O on an HDF5 file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The HDF5 magic signature was not found at any valid offset.
    #[error("HDF5 signature not found at any valid offset")]
    SignatureNotFound,
    /// The superblock version is not supported.
    #[error("unsupported superblock version: {0}")]
    UnsupportedVersion(u8),
    /// Unexpected end of data.
    #[error("unexpected EOF: need {expected} bytes, have {available}")]
    UnexpectedEof {
        /// Number of bytes expected.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },
    /// Invalid offset size (only 8 is supported).
    #[error("invalid offset size: {0} (must be 8)")]
    InvalidOffsetSize(u8),
    /// Invalid length size (only 8 is supported).
    #[error("invalid length size: {0} (must be 8)")]
    InvalidLengthSize(u8),
    /// Invalid object header signature or version.
    #[error("invalid object header at {address:#x}")]
    InvalidObjectHeader {
        /// File address of the header.
        address: u64,
    },
    /// Unknown message type that is marked as must-understand.
    #[error("unsupported message type {0:#06x} marked as must-understand")]
    UnsupportedMessage(u16),
    /// Metadata checksum mismatch.
    #[error("checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// The checksum stored in the file.
        expected: u32,
        /// The checksum we computed.
        computed: u32,
    },
    /// A message with an unknown version byte.
    #[error("unsupported {message} message version {version}")]
    UnsupportedMessageVersion {
        /// Message kind.
        message: &'static str,
        /// Version byte found.
        version: u8,
    },
    /// Datatype other than little-endian IEEE binary64.
    #[error("unsupported datatype (class {class}, size {size})")]
    UnsupportedDatatype {
        /// HDF5 datatype class.
        class: u8,
        /// Element size in bytes.
        size: u32,
    },
    /// Storage layout other than contiguous.
    #[error("unsupported data layout class {0}")]
    UnsupportedLayout(u8),
    /// A required header message is absent.
    #[error("object header is missing a {0} message")]
    MissingMessage(&'static str),
    /// No link with the given name in the root group.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
    /// A link with the given name already exists.
    #[error("name already exists: {0}")]
    DuplicateName(String),
    /// Empty name, or a name containing `/`.
    #[error("invalid dataset name: {0:?}")]
    InvalidName(String),
    /// The dataset's byte size does not fit in 64 bits.
    #[error("dataset shape {0:?} is too large")]
    ShapeOverflow(Vec<u64>),
    /// Selection rank differs from the dataspace rank.
    #[error("selection rank {selection} does not match dataspace rank {dataspace}")]
    RankMismatch {
        /// Rank of the selection.
        selection: usize,
        /// Rank of the dataspace.
        dataspace: usize,
    },
    /// Selection extends past the dataspace extent.
    #[error("selection start {start:?} count {count:?} exceeds extent {dims:?}")]
    SelectionOutOfBounds {
        /// Selection start per dimension.
        start: Vec<u64>,
        /// Selection count per dimension.
        count: Vec<u64>,
        /// Dataspace extent.
        dims: Vec<u64>,
    },
    /// Buffer length does not match the number of selected elements.
    #[error("buffer holds {actual} elements, selection needs {expected}")]
    BufferSizeMismatch {
        /// Elements required by the selection.
        expected: u64,
        /// Elements supplied.
        actual: u64,
    },
    /// Dataset id that was not issued by this file.
    #[error("unknown dataset id {0}")]
    UnknownDataset(usize),
}
