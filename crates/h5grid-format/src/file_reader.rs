//! Read-only access to HDF5 files through a memory map.
//!
//! Root-group links are indexed once at [`FileReader::open`], so datasets
//! created after that are not visible until the file is reopened. Dataset
//! headers are decoded per lookup.

use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::data_layout::DataLayout;
use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::FormatError;
use crate::fill_value::FillValue;
use crate::link::LinkMessage;
use crate::message_type::MessageType;
use crate::object_header::ObjectHeader;
use crate::selection::Hyperslab;
use crate::signature::find_signature;
use crate::superblock::Superblock;

const ELEMENT_SIZE: usize = 8;

/// Shape and storage location of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub name: String,
    pub dims: Vec<u64>,
    /// Value reported for storage that was never allocated.
    pub fill_value: Option<f64>,
    layout: DataLayout,
}

impl DatasetInfo {
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn num_elements(&self) -> u64 {
        self.dims.iter().product()
    }
}

/// An HDF5 file open for reading.
#[derive(Debug)]
pub struct FileReader {
    mmap: Mmap,
    path: PathBuf,
    /// Byte offset that file addresses are relative to.
    base: usize,
    superblock: Superblock,
    links: Vec<(String, u64)>,
}

impl FileReader {
    /// Map the file at `path`, verify its superblock and index the root group.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileReader, FormatError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        // SAFETY: read-only mapping. The caller is responsible for not
        // modifying the file while the mapping is alive.
        let mmap = unsafe { Mmap::map(&file)? };

        let sig = find_signature(&mmap)?;
        let superblock = Superblock::parse(&mmap, sig)?;
        let base = usize::try_from(superblock.base_address)
            .ok()
            .filter(|&b| b <= mmap.len())
            .ok_or(FormatError::UnexpectedEof {
                expected: usize::MAX,
                available: mmap.len(),
            })?;

        let root = ObjectHeader::parse(&mmap[base..], superblock.root_group_address)?;
        let mut links = Vec::new();
        for msg in root.find_all(MessageType::Link) {
            let link = LinkMessage::parse(&msg.data)?;
            if let Some(address) = link.address {
                links.push((link.name, address));
            }
        }

        Ok(FileReader {
            mmap,
            path,
            base,
            superblock,
            links,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// Names of all hard links in the root group, in header order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|(name, _)| name.as_str())
    }

    fn data(&self) -> &[u8] {
        &self.mmap[self.base..]
    }

    /// Look up a dataset in the root group and decode its header.
    pub fn dataset(&self, name: &str) -> Result<DatasetInfo, FormatError> {
        let address = self
            .links
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, a)| a)
            .ok_or_else(|| FormatError::DatasetNotFound(name.to_string()))?;

        let header = ObjectHeader::parse(self.data(), address)?;
        let datatype = header
            .find(MessageType::Datatype)
            .ok_or(FormatError::MissingMessage("datatype"))?;
        Datatype::parse(&datatype.data)?;
        let space = header
            .find(MessageType::Dataspace)
            .ok_or(FormatError::MissingMessage("dataspace"))?;
        let space = Dataspace::parse(&space.data)?;
        let layout = header
            .find(MessageType::DataLayout)
            .ok_or(FormatError::MissingMessage("data layout"))?;
        let layout = DataLayout::parse(&layout.data)?;
        let fill_value = match header.find(MessageType::FillValue) {
            Some(msg) => FillValue::parse(&msg.data)?.value,
            None => None,
        };

        let needed = space
            .num_elements()
            .and_then(|n| n.checked_mul(ELEMENT_SIZE as u64))
            .ok_or_else(|| FormatError::ShapeOverflow(space.dims.clone()))?;
        if layout.address.is_some() && layout.size < needed {
            return Err(FormatError::UnexpectedEof {
                expected: needed as usize,
                available: layout.size as usize,
            });
        }

        Ok(DatasetInfo {
            name: name.to_string(),
            dims: space.dims,
            fill_value,
            layout,
        })
    }

    /// Read every element of a dataset in row-major order.
    pub fn read_all(&self, info: &DatasetInfo) -> Result<Vec<f64>, FormatError> {
        self.read_selection(info, &Hyperslab::all(&info.dims))
    }

    /// Read the elements of `sel`, in row-major order of the selected box.
    pub fn read_selection(
        &self,
        info: &DatasetInfo,
        sel: &Hyperslab,
    ) -> Result<Vec<f64>, FormatError> {
        sel.check_bounds(&info.dims)?;
        let total = sel.num_elements() as usize;

        let Some(address) = info.layout.address else {
            return Ok(vec![info.fill_value.unwrap_or(0.0); total]);
        };

        let data = self.data();
        let mut out = vec![0.0f64; total];
        let mut filled = 0usize;
        for run in sel.runs(&info.dims) {
            let len = run.len as usize;
            let start = address
                .checked_add(run.offset * ELEMENT_SIZE as u64)
                .and_then(|s| usize::try_from(s).ok());
            let bytes = start
                .and_then(|s| data.get(s..s.checked_add(len * ELEMENT_SIZE)?))
                .ok_or(FormatError::UnexpectedEof {
                    expected: start.unwrap_or(usize::MAX).saturating_add(len * ELEMENT_SIZE),
                    available: data.len(),
                })?;
            LittleEndian::read_f64_into(bytes, &mut out[filled..filled + len]);
            filled += len;
        }
        Ok(out)
    }
}
