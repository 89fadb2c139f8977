//! Writing scalars, axes and NaN-initialized 4-D/5-D matrices.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use h5grid_format::property_list::DatasetCreateProps;
use h5grid_format::{DatasetId, FileWriter, FormatError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::coords;
use crate::error::{AllocError, Error, Result};
use crate::handle::{MatrixArena, MatrixHandle, OpenMatrix};
use crate::lock::{self, LockScope};
use crate::naming::generate_file_name;
use crate::options::WriterOptions;

static NEXT_WRITER_ID: AtomicU64 = AtomicU64::new(1);

/// Owns one output file and the matrices created in it.
///
/// All methods take `&self`, so a writer can be shared between threads.
/// Each call holds the writer's state lock, and with [`LockScope::Global`]
/// also the process-wide engine lock, for its whole duration.
#[derive(Debug)]
pub struct Writer {
    path: PathBuf,
    scope: LockScope,
    state: Mutex<WriterState>,
}

#[derive(Debug)]
struct WriterState {
    engine: FileWriter,
    matrices: MatrixArena,
    closed: bool,
}

fn check_directory(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        // Write access is decided by the file creation itself.
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::DirectoryNotFound {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(Error::PermissionDenied {
            path: dir.to_path_buf(),
        }),
        Err(_) => Err(Error::DirectoryNotFound {
            path: dir.to_path_buf(),
        }),
    }
}

fn nan_buffer(name: &str, dims: &[u64]) -> Result<Vec<f64>> {
    let alloc_failed = |source| Error::AllocationFailed {
        name: name.to_string(),
        source,
    };
    let count = dims
        .iter()
        .try_fold(1u64, |acc, &d| acc.checked_mul(d))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| alloc_failed(AllocError::Overflow(dims.to_vec())))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(count)
        .map_err(|e| alloc_failed(AllocError::OutOfMemory(e)))?;
    buf.resize(count, f64::NAN);
    Ok(buf)
}

impl WriterState {
    fn write_scalar(&mut self, name: &str, value: f64) -> Result<()> {
        self.write_vector(name, &[value])
    }

    fn write_vector(&mut self, name: &str, values: &[f64]) -> Result<()> {
        let id = self.create_dataset(name, &[values.len() as u64])?;
        self.engine
            .write_all(id, values)
            .map_err(|source| Error::WriteFailed {
                name: name.to_string(),
                source,
            })
    }

    fn create_dataset(&mut self, name: &str, dims: &[u64]) -> Result<DatasetId> {
        let id = self
            .engine
            .create_dataset(name, dims, &DatasetCreateProps::default())
            .map_err(|source| Error::DatasetCreationFailed {
                name: name.to_string(),
                source,
            })?;
        debug!(dataset = name, ?dims, "created dataset");
        Ok(id)
    }

    /// Drop every matrix, then flush the file.
    fn teardown(&mut self) -> std::result::Result<(), FormatError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        for matrix in self.matrices.release_all() {
            debug!(dataset = %matrix.name, "released matrix");
        }
        self.engine.flush()
    }
}

impl Writer {
    /// Create a new file `<directory>/<prefix>___<n>.h5` with default options.
    pub fn create<P: AsRef<Path>>(directory: P, prefix: &str) -> Result<Writer> {
        Self::create_with(directory, prefix, WriterOptions::default())
    }

    /// Create a new file with explicit options.
    ///
    /// Fails with [`Error::DirectoryNotFound`] before anything is created on
    /// disk, and with [`Error::PermissionDenied`] when the file cannot be
    /// created because the caller may not write into `directory`.
    pub fn create_with<P: AsRef<Path>>(
        directory: P,
        prefix: &str,
        options: WriterOptions,
    ) -> Result<Writer> {
        let _engine = lock::acquire(options.lock_scope);
        let dir = directory.as_ref();
        check_directory(dir)?;

        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let path = dir.join(generate_file_name(prefix, &options.extension, &mut rng));

        let engine = FileWriter::create(&path, &options.file_create, &options.file_access)
            .map_err(|source| {
                let denied = matches!(
                    &source,
                    FormatError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied
                );
                if denied {
                    Error::PermissionDenied {
                        path: dir.to_path_buf(),
                    }
                } else {
                    Error::FileCreationFailed {
                        path: path.clone(),
                        source,
                    }
                }
            })?;
        info!(path = %path.display(), "created HDF5 file");

        let id = NEXT_WRITER_ID.fetch_add(1, Ordering::Relaxed);
        Ok(Writer {
            path,
            scope: options.lock_scope,
            state: Mutex::new(WriterState {
                engine,
                matrices: MatrixArena::new(id),
                closed: false,
            }),
        })
    }

    /// Path of the file this writer owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut WriterState) -> Result<T>) -> Result<T> {
        let _engine = lock::acquire(self.scope);
        let mut state = self.state.lock();
        f(&mut state)
    }

    /// Store `value` as a one-element dataset called `name`.
    pub fn write_scalar(&self, name: &str, value: f64) -> Result<()> {
        self.with_state(|s| s.write_scalar(name, value))
    }

    /// Store each `(key, value)` as a scalar dataset `<name>_<key>`.
    ///
    /// Not atomic: when one entry fails, entries written before it stay.
    pub fn write_labeled_scalars(&self, name: &str, values: &HashMap<String, f64>) -> Result<()> {
        self.with_state(|s| {
            for (key, &value) in values {
                s.write_scalar(&format!("{name}_{key}"), value)?;
            }
            Ok(())
        })
    }

    /// Store `values` as a 1-D dataset.
    pub fn write_axis(&self, name: &str, values: &[f64]) -> Result<()> {
        self.with_state(|s| s.write_vector(name, values))
    }

    /// Create a 4-D matrix filled with NaN.
    pub fn create_matrix_4d(&self, name: &str, extents: [u64; 4]) -> Result<MatrixHandle> {
        self.create_matrix(name, &extents)
    }

    /// Create a 5-D matrix filled with NaN.
    pub fn create_matrix_5d(&self, name: &str, extents: [u64; 5]) -> Result<MatrixHandle> {
        self.create_matrix(name, &extents)
    }

    fn create_matrix(&self, name: &str, dims: &[u64]) -> Result<MatrixHandle> {
        let fill = nan_buffer(name, dims)?;
        let alloc_failed = |e| Error::AllocationFailed {
            name: name.to_string(),
            source: AllocError::Write(e),
        };
        self.with_state(|s| {
            let dataset = s
                .engine
                .create_dataset(name, dims, &DatasetCreateProps::default())
                .map_err(alloc_failed)?;
            debug!(dataset = name, ?dims, "created dataset");
            s.engine.write_all(dataset, &fill).map_err(alloc_failed)?;
            debug!(dataset = name, elements = fill.len(), "filled matrix with NaN");
            Ok(s.matrices.insert(OpenMatrix {
                dataset,
                name: name.to_string(),
                dims: dims.to_vec(),
            }))
        })
    }

    /// Set one element of a 4-D matrix.
    pub fn write_point_4d(&self, matrix: MatrixHandle, value: f64, coords: [i64; 4]) -> Result<()> {
        self.write_point(matrix, value, &coords)
    }

    /// Set one element of a 5-D matrix.
    pub fn write_point_5d(&self, matrix: MatrixHandle, value: f64, coords: [i64; 5]) -> Result<()> {
        self.write_point(matrix, value, &coords)
    }

    fn write_point(&self, handle: MatrixHandle, value: f64, at: &[i64]) -> Result<()> {
        self.with_state(|s| {
            let m = s.matrices.get(handle)?;
            let sel = coords::point(&m.name, at, &m.dims)?;
            let (dataset, name) = (m.dataset, m.name.clone());
            s.engine
                .write_selection(dataset, &sel, &[value])
                .map_err(|source| Error::WriteFailed { name, source })
        })
    }

    /// Release all matrices and flush the file, reporting any failure.
    pub fn close(self) -> Result<()> {
        let path = self.path.clone();
        self.with_state(|s| {
            s.teardown()
                .map_err(|source| Error::CloseFailed { path, source })
        })
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        let _engine = lock::acquire(self.scope);
        let mut state = self.state.lock();
        if let Err(e) = state.teardown() {
            warn!(path = %self.path.display(), error = %e, "failed to close HDF5 file");
        }
    }
}
