//! Pure-Rust engine for the subset of HDF5 used by `h5grid`.
//!
//! Files are written with a v2/v3 superblock, v2 object headers, a compact
//! root group and contiguous little-endian `f64` datasets, and read back
//! through a memory map. Partial I/O goes through [`selection::Hyperslab`].
//!
//! ```no_run
//! use h5grid_format::file_reader::FileReader;
//! use h5grid_format::file_writer::FileWriter;
//! use h5grid_format::property_list::{DatasetCreateProps, FileAccessProps, FileCreateProps};
//!
//! let mut w = FileWriter::create("out.h5", &FileCreateProps::default(), &FileAccessProps::default())?;
//! let id = w.create_dataset("axis", &[3], &DatasetCreateProps::default())?;
//! w.write_all(id, &[0.5, 1.0, 1.5])?;
//! w.close()?;
//!
//! let r = FileReader::open("out.h5")?;
//! let info = r.dataset("axis")?;
//! assert_eq!(r.read_all(&info)?, vec![0.5, 1.0, 1.5]);
//! # Ok::<(), h5grid_format::error::FormatError>(())
//! ```

pub mod checksum;
pub mod data_layout;
pub mod dataspace;
pub mod datatype;
pub mod error;
pub mod file_reader;
pub mod file_writer;
pub mod fill_value;
pub mod link;
pub mod message_type;
pub mod object_header;
pub mod property_list;
pub mod selection;
pub mod signature;
pub mod superblock;

pub use error::FormatError;
pub use file_reader::{DatasetInfo, FileReader};
pub use file_writer::{DatasetId, FileWriter};
pub use selection::Hyperslab;

/// The all-ones address HDF5 uses for "not allocated".
pub const UNDEFINED_ADDRESS: u64 = u64::MAX;
