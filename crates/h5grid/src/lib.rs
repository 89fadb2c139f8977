//! Typed access to HDF5 files: scalars, 1-D axes and dense 4-D/5-D matrices
//! with point and slice random access.
//!
//! A [`Writer`] creates one uniquely named file in a directory and fills it;
//! a [`Reader`] opens an existing file read-only. Every coordinate is
//! bounds-checked before any I/O happens.
//!
//! ```no_run
//! use h5grid::{Reader, Writer};
//!
//! let writer = Writer::create("/tmp", "run")?;
//! writer.write_scalar("pressure", 101.325)?;
//! writer.write_axis("time", &[0.0, 0.5, 1.0])?;
//! let m = writer.create_matrix_4d("field", [2, 3, 4, 5])?;
//! writer.write_point_4d(m, 1.5, [1, 2, 3, 4])?;
//! let path = writer.path().to_path_buf();
//! writer.close()?;
//!
//! let reader = Reader::open(&path)?;
//! assert_eq!(reader.read_point_4d("field", [1, 2, 3, 4])?, 1.5);
//! assert!(reader.read_point_4d("field", [0, 0, 0, 0])?.is_nan());
//! assert_eq!(reader.min_over_matrix("field")?, 1.5);
//! # Ok::<(), h5grid::Error>(())
//! ```

pub mod coords;
pub mod error;
pub mod handle;
pub mod lock;
pub mod naming;
pub mod options;
pub mod reader;
pub mod writer;

pub use error::{AllocError, Error, Result};
pub use handle::MatrixHandle;
pub use lock::LockScope;
pub use options::WriterOptions;
pub use reader::Reader;
pub use writer::Writer;
