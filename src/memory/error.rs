use super::KernelPtr;

/// A read through an invalid, unmapped or otherwise inaccessible address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("faulted reading {len} bytes at {addr}")]
pub struct ReadFault {
    pub addr: KernelPtr,
    pub len: usize,
}

impl ReadFault {
    pub fn new(addr: KernelPtr, len: usize) -> Self {
        Self { addr, len }
    }
}

/// Errors that may occur while assembling a [`super::MemorySnapshot`].
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Load(#[from] crate::fsutil::LoadError),
    #[error("region at {addr} overlaps the region at {other}")]
    Overlap { addr: KernelPtr, other: KernelPtr },
    #[error("region at {addr} of {len} bytes wraps the address space")]
    Wraps { addr: KernelPtr, len: usize },
    #[error("region at {addr} maps the null page")]
    NullRegion { addr: KernelPtr },
}
