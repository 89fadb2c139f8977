//! Read-only access: axes, scalars, points, 2-D slices and matrix minima.

use std::path::Path;

use h5grid_format::{DatasetInfo, FileReader, FormatError, Hyperslab};
use tracing::debug;

use crate::coords;
use crate::error::{Error, Result};

/// An open file for reading.
///
/// No locking is done: concurrent readers of one file are fine, reading a
/// file while a writer modifies it is not.
#[derive(Debug)]
pub struct Reader {
    file: FileReader,
}

impl Reader {
    /// Open an existing file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader> {
        let path = path.as_ref();
        let file = FileReader::open(path).map_err(|source| Error::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), datasets = file.names().count(), "opened HDF5 file");
        Ok(Reader { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Names of all datasets in the file.
    pub fn dataset_names(&self) -> Vec<String> {
        self.file.names().map(str::to_string).collect()
    }

    /// Extent of a dataset.
    pub fn shape(&self, name: &str) -> Result<Vec<u64>> {
        Ok(self.dataset(name)?.dims)
    }

    fn dataset(&self, name: &str) -> Result<DatasetInfo> {
        self.file.dataset(name).map_err(|source| match source {
            FormatError::DatasetNotFound(_) => Error::DatasetNotFound {
                name: name.to_string(),
                source,
            },
            // The link resolved but its header could not be decoded.
            _ => Error::ReadFailed {
                name: name.to_string(),
                source,
            },
        })
    }

    fn dataset_of_rank(&self, name: &str, rank: usize) -> Result<DatasetInfo> {
        let info = self.dataset(name)?;
        if info.rank() != rank {
            return Err(Error::RankMismatch {
                name: name.to_string(),
                expected: rank,
                actual: info.rank(),
            });
        }
        Ok(info)
    }

    fn read(&self, info: &DatasetInfo, sel: &Hyperslab) -> Result<Vec<f64>> {
        self.file
            .read_selection(info, sel)
            .map_err(|source| Error::ReadFailed {
                name: info.name.clone(),
                source,
            })
    }

    fn read_point(&self, name: &str, at: &[i64]) -> Result<f64> {
        let info = self.dataset_of_rank(name, at.len())?;
        let sel = coords::point(name, at, &info.dims)?;
        let values = self.read(&info, &sel)?;
        values.first().copied().ok_or_else(|| Error::IndexOutOfRange {
            name: name.to_string(),
            coordinate: at.to_vec(),
            extents: info.dims.clone(),
        })
    }

    /// Whole contents of a 1-D dataset.
    pub fn read_axis(&self, name: &str) -> Result<Vec<f64>> {
        let info = self.dataset_of_rank(name, 1)?;
        self.read(&info, &Hyperslab::all(&info.dims))
    }

    /// The single element of a one-element dataset.
    pub fn read_scalar(&self, name: &str) -> Result<f64> {
        let info = self.dataset(name)?;
        let elements = info.num_elements();
        if elements != 1 {
            return Err(Error::NotScalar {
                name: name.to_string(),
                elements,
            });
        }
        let values = self.read(&info, &Hyperslab::all(&info.dims))?;
        values.first().copied().ok_or(Error::NotScalar {
            name: name.to_string(),
            elements: 0,
        })
    }

    /// The `D0 x D1` plane of a 4-D dataset at third/fourth coordinates
    /// `(i, j)`, as rows.
    pub fn read_slice_2d(&self, name: &str, i: i64, j: i64) -> Result<Vec<Vec<f64>>> {
        let info = self.dataset_of_rank(name, 4)?;
        let sel = coords::slice_2d(name, i, j, &info.dims)?;
        let flat = self.read(&info, &sel)?;
        let shape = sel.output_shape();
        let (rows, cols) = (shape[0] as usize, shape[1] as usize);
        if cols == 0 {
            return Ok(vec![Vec::new(); rows]);
        }
        Ok(flat.chunks(cols).map(<[f64]>::to_vec).collect())
    }

    /// One element of a 1-D dataset.
    pub fn read_point_1d(&self, name: &str, i: i64) -> Result<f64> {
        self.read_point(name, &[i])
    }

    /// One element of a 4-D dataset.
    pub fn read_point_4d(&self, name: &str, coords: [i64; 4]) -> Result<f64> {
        self.read_point(name, &coords)
    }

    /// One element of a 5-D dataset.
    pub fn read_point_5d(&self, name: &str, coords: [i64; 5]) -> Result<f64> {
        self.read_point(name, &coords)
    }

    /// Smallest element of a 4-D dataset.
    ///
    /// NaN never compares smaller, so unwritten cells are skipped as long
    /// as at least one real value exists. A matrix holding only NaN (or
    /// no elements) yields `f64::MAX`.
    pub fn min_over_matrix(&self, name: &str) -> Result<f64> {
        let info = self.dataset_of_rank(name, 4)?;
        let values = self.read(&info, &Hyperslab::all(&info.dims))?;
        Ok(values
            .into_iter()
            .fold(f64::MAX, |min, v| if v < min { v } else { min }))
    }
}
