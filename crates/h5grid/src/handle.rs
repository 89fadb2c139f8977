//! Matrix handles and the per-writer arena that owns them.

use h5grid_format::DatasetId;

use crate::error::{Error, Result};

/// Opaque reference to a matrix created by a [`Writer`](crate::Writer).
///
/// Handles are only valid with the writer that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixHandle {
    writer: u64,
    slot: u32,
}

#[derive(Debug)]
pub(crate) struct OpenMatrix {
    pub(crate) dataset: DatasetId,
    pub(crate) name: String,
    pub(crate) dims: Vec<u64>,
}

/// Slot table of matrices owned by one writer.
#[derive(Debug)]
pub(crate) struct MatrixArena {
    writer: u64,
    slots: Vec<Option<OpenMatrix>>,
}

impl MatrixArena {
    pub(crate) fn new(writer: u64) -> Self {
        Self {
            writer,
            slots: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, matrix: OpenMatrix) -> MatrixHandle {
        let slot = self.slots.len() as u32;
        self.slots.push(Some(matrix));
        MatrixHandle {
            writer: self.writer,
            slot,
        }
    }

    pub(crate) fn get(&self, handle: MatrixHandle) -> Result<&OpenMatrix> {
        if handle.writer != self.writer {
            return Err(Error::InvalidHandle);
        }
        self.slots
            .get(handle.slot as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidHandle)
    }

    /// Number of live entries.
    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Release every live entry, returning them in creation order.
    pub(crate) fn release_all(&mut self) -> Vec<OpenMatrix> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}
