//! Incremental HDF5 file writer.
//!
//! Produces files with a v2/v3 superblock, a compact root group (link info
//! plus one hard link per dataset) and contiguous little-endian `f64`
//! datasets. Unlike a build-then-serialize writer, every call updates the
//! file on disk right away:
//!
//! 1. the dataset object header and its raw storage are appended at EOF,
//! 2. a fresh root group header listing every link is appended after them,
//! 3. the superblock at offset 0 is rewritten to point at the new root.
//!
//! Step 3 is the commit point. A failure earlier leaves the previous
//! superblock, and therefore the previous file contents, in effect. Old root
//! headers are left behind as unreferenced space.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};

use crate::data_layout::DataLayout;
use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::FormatError;
use crate::fill_value::FillValue;
use crate::link::{link_info_message, LinkMessage};
use crate::message_type::MessageType;
use crate::object_header::{ObjectHeaderWriter, MSG_FLAG_CONSTANT};
use crate::property_list::{DatasetCreateProps, FileAccessProps, FileCreateProps};
use crate::selection::Hyperslab;
use crate::superblock::{Superblock, SUPERBLOCK_SIZE};

/// Largest rank HDF5 allows for a dataspace.
pub const MAX_RANK: usize = 32;

const ELEMENT_SIZE: u64 = 8;

/// Identifies a dataset created through a [`FileWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId(usize);

impl DatasetId {
    /// Position of the dataset in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct DatasetEntry {
    name: String,
    dims: Vec<u64>,
    header_address: u64,
    data_address: Option<u64>,
}

/// An HDF5 file open for writing.
#[derive(Debug)]
pub struct FileWriter {
    file: File,
    path: PathBuf,
    superblock_version: u8,
    eof: u64,
    sieve_buffer_size: usize,
    datasets: Vec<DatasetEntry>,
}

pub(crate) fn build_dataset_header(
    dims: &[u64],
    fill: &FillValue,
    layout: &DataLayout,
) -> Vec<u8> {
    let mut w = ObjectHeaderWriter::new();
    w.add_message_with_flags(
        MessageType::Datatype,
        Datatype::F64_LE.serialize(),
        MSG_FLAG_CONSTANT,
    );
    w.add_message(MessageType::Dataspace, Dataspace::simple(dims).serialize());
    w.add_message_with_flags(MessageType::FillValue, fill.serialize(), MSG_FLAG_CONSTANT);
    w.add_message(MessageType::DataLayout, layout.serialize());
    w.serialize()
}

pub(crate) fn build_group_header(links: &[LinkMessage]) -> Vec<u8> {
    let mut w = ObjectHeaderWriter::new();
    w.add_message(MessageType::LinkInfo, link_info_message());
    for link in links {
        w.add_message(MessageType::Link, link.serialize());
    }
    w.serialize()
}

fn validate_name(name: &str) -> Result<(), FormatError> {
    if name.is_empty() || name == "." || name.contains('/') || name.contains('\0') {
        return Err(FormatError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl FileWriter {
    /// Create (or truncate) the file at `path` and write an empty root group.
    pub fn create<P: AsRef<Path>>(
        path: P,
        fcpl: &FileCreateProps,
        fapl: &FileAccessProps,
    ) -> Result<FileWriter, FormatError> {
        if !(2..=3).contains(&fcpl.superblock_version) {
            return Err(FormatError::UnsupportedVersion(fcpl.superblock_version));
        }
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = FileWriter {
            file,
            path,
            superblock_version: fapl.superblock_version(fcpl.superblock_version),
            eof: SUPERBLOCK_SIZE as u64,
            sieve_buffer_size: fapl.sieve_buffer_size.max(ELEMENT_SIZE as usize),
            datasets: Vec::new(),
        };
        writer.commit_root(Vec::new())?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Superblock version in use.
    pub fn superblock_version(&self) -> u8 {
        self.superblock_version
    }

    /// Names of all datasets, in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.iter().map(|d| d.name.as_str())
    }

    /// Create a fixed-shape `f64` dataset in the root group.
    pub fn create_dataset(
        &mut self,
        name: &str,
        dims: &[u64],
        dcpl: &DatasetCreateProps,
    ) -> Result<DatasetId, FormatError> {
        validate_name(name)?;
        if self.datasets.iter().any(|d| d.name == name) {
            return Err(FormatError::DuplicateName(name.to_string()));
        }
        let byte_size = Dataspace::simple(dims)
            .num_elements()
            .and_then(|n| n.checked_mul(ELEMENT_SIZE))
            .filter(|_| dims.len() <= MAX_RANK)
            .ok_or_else(|| FormatError::ShapeOverflow(dims.to_vec()))?;

        let fill = match dcpl.fill_value {
            Some(v) => FillValue::defined(v),
            None => FillValue::undefined(),
        };

        // Header size does not depend on the address it carries.
        let header_address = self.eof;
        let probe = DataLayout::contiguous(Some(0), byte_size);
        let header_len = build_dataset_header(dims, &fill, &probe).len() as u64;
        let data_address = (byte_size > 0).then_some(header_address + header_len);
        let layout = DataLayout::contiguous(data_address, byte_size);
        let header = build_dataset_header(dims, &fill, &layout);

        let data_end = header_address
            .checked_add(header_len)
            .and_then(|end| end.checked_add(byte_size))
            .ok_or_else(|| FormatError::ShapeOverflow(dims.to_vec()))?;

        self.write_at(header_address, &header)?;
        self.file.set_len(data_end)?;
        if let (Some(addr), Some(value)) = (data_address, dcpl.fill_value) {
            // Freshly extended storage is already zero.
            if value.to_bits() != 0 {
                self.fill_region(addr, byte_size / ELEMENT_SIZE, value)?;
            }
        }

        let mut links: Vec<LinkMessage> = self
            .datasets
            .iter()
            .map(|d| LinkMessage::hard(&d.name, d.header_address))
            .collect();
        links.push(LinkMessage::hard(name, header_address));

        let saved_eof = self.eof;
        self.eof = data_end;
        if let Err(e) = self.commit_root(links) {
            self.eof = saved_eof;
            return Err(e);
        }

        self.datasets.push(DatasetEntry {
            name: name.to_string(),
            dims: dims.to_vec(),
            header_address,
            data_address,
        });
        Ok(DatasetId(self.datasets.len() - 1))
    }

    /// Extent of a dataset.
    pub fn dims(&self, id: DatasetId) -> Result<&[u64], FormatError> {
        Ok(&self.entry(id)?.dims)
    }

    /// Overwrite the whole dataset.
    pub fn write_all(&mut self, id: DatasetId, data: &[f64]) -> Result<(), FormatError> {
        let dims = self.entry(id)?.dims.clone();
        self.write_selection(id, &Hyperslab::all(&dims), data)
    }

    /// Write `data` into the hyperslab `sel`, in row-major order of the
    /// selected box.
    pub fn write_selection(
        &mut self,
        id: DatasetId,
        sel: &Hyperslab,
        data: &[f64],
    ) -> Result<(), FormatError> {
        let entry = self.entry(id)?;
        sel.check_bounds(&entry.dims)?;
        let expected = sel.num_elements();
        if data.len() as u64 != expected {
            return Err(FormatError::BufferSizeMismatch {
                expected,
                actual: data.len() as u64,
            });
        }
        let Some(base) = entry.data_address else {
            // Only empty datasets have no storage, and only empty
            // selections fit inside them.
            return Ok(());
        };

        let runs: Vec<_> = sel.runs(&entry.dims).collect();
        let mut consumed = 0usize;
        for run in runs {
            let len = run.len as usize;
            let values = &data[consumed..consumed + len];
            self.write_values(base + run.offset * ELEMENT_SIZE, values)?;
            consumed += len;
        }
        Ok(())
    }

    /// Flush buffered writes and sync file contents to disk.
    pub fn flush(&mut self) -> Result<(), FormatError> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Flush and close the file.
    pub fn close(mut self) -> Result<(), FormatError> {
        self.flush()
    }

    fn entry(&self, id: DatasetId) -> Result<&DatasetEntry, FormatError> {
        self.datasets
            .get(id.0)
            .ok_or(FormatError::UnknownDataset(id.0))
    }

    fn commit_root(&mut self, links: Vec<LinkMessage>) -> Result<(), FormatError> {
        let root = build_group_header(&links);
        let root_address = self.eof;
        let eof = root_address + root.len() as u64;
        self.write_at(root_address, &root)?;
        let sb = Superblock::new(self.superblock_version, eof, root_address);
        self.write_at(0, &sb.serialize())?;
        self.eof = eof;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<(), FormatError> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        Ok(())
    }

    /// Encode `values` through the staging buffer and write them at `offset`.
    fn write_values(&mut self, offset: u64, values: &[f64]) -> Result<(), FormatError> {
        let per_chunk = self.sieve_buffer_size / ELEMENT_SIZE as usize;
        let mut staging = vec![0u8; per_chunk.min(values.len()) * ELEMENT_SIZE as usize];
        let mut pos = offset;
        for chunk in values.chunks(per_chunk) {
            let bytes = &mut staging[..chunk.len() * ELEMENT_SIZE as usize];
            LittleEndian::write_f64_into(chunk, bytes);
            self.write_at(pos, bytes)?;
            pos += bytes.len() as u64;
        }
        Ok(())
    }

    fn fill_region(&mut self, offset: u64, count: u64, value: f64) -> Result<(), FormatError> {
        let per_chunk = (self.sieve_buffer_size as u64 / ELEMENT_SIZE).min(count);
        let chunk = vec![value; per_chunk as usize];
        let mut remaining = count;
        let mut pos = offset;
        while remaining > 0 {
            let n = remaining.min(per_chunk) as usize;
            self.write_values(pos, &chunk[..n])?;
            pos += n as u64 * ELEMENT_SIZE;
            remaining -= n as u64;
        }
        Ok(())
    }
}
