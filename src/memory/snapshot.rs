//! Sparse in-process image of kernel memory.
//!
//! A [`MemorySnapshot`] holds a set of non-overlapping byte regions keyed by
//! their base address. Reads that are not fully contained in a single region
//! fault, exactly like a probe read of an unmapped page would. Snapshots are
//! assembled with [`MemorySnapshot::builder`] or loaded from a JSON fixture:
//!
//! ```json
//! { "regions": [ { "addr": 4096, "bytes": [42, 0, 0, 0, 0, 0, 0, 0] } ] }
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::{KernelPtr, ReadFault, SafeMemoryReader, SnapshotError};
use crate::fsutil::{self, InputKind};

#[derive(Debug, serde::Deserialize)]
struct SnapshotFile {
    regions: Vec<RegionFile>,
}

#[derive(Debug, serde::Deserialize)]
struct RegionFile {
    addr: u64,
    bytes: Vec<u8>,
}

/// An immutable image of kernel memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    regions: BTreeMap<u64, Vec<u8>>,
}

impl MemorySnapshot {
    pub fn builder() -> MemorySnapshotBuilder {
        MemorySnapshotBuilder::default()
    }

    /// Loads a snapshot from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::Load`] if the file can't be opened or is not a valid fixture.
    /// - Any region validation error from [`MemorySnapshotBuilder::build`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = fsutil::load_json(InputKind::MemorySnapshot, path)?;
        Self::from_file(file)
    }

    fn from_json_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = fsutil::parse_json(InputKind::MemorySnapshot, reader, origin)?;
        Self::from_file(file)
    }

    fn from_file(file: SnapshotFile) -> Result<Self, SnapshotError> {
        file.regions
            .into_iter()
            .fold(Self::builder(), |builder, region| {
                builder.bytes(region.addr, region.bytes)
            })
            .build()
    }

    /// Number of contiguous mapped regions after coalescing.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    fn region_containing(&self, addr: u64) -> Option<(u64, &[u8])> {
        let (&base, bytes) = self.regions.range(..=addr).next_back()?;
        Some((base, bytes.as_slice()))
    }
}

impl SafeMemoryReader for MemorySnapshot {
    fn read(&self, dst: &mut [u8], src: KernelPtr) -> Result<(), ReadFault> {
        let fault = ReadFault::new(src, dst.len());
        if src.is_null() {
            return Err(fault);
        }

        let (base, bytes) = self.region_containing(src.addr()).ok_or(fault)?;
        let start = (src.addr() - base) as usize;
        let end = start.checked_add(dst.len()).ok_or(fault)?;
        let window = bytes.get(start..end).ok_or(fault)?;

        dst.copy_from_slice(window);
        Ok(())
    }
}

/// Collects byte regions and validates them into a [`MemorySnapshot`].
#[derive(Debug, Default)]
pub struct MemorySnapshotBuilder {
    pending: Vec<(u64, Vec<u8>)>,
}

impl MemorySnapshotBuilder {
    /// Maps `bytes` at `addr`.
    pub fn bytes(mut self, addr: u64, bytes: impl Into<Vec<u8>>) -> Self {
        self.pending.push((addr, bytes.into()));
        self
    }

    pub fn u32(self, addr: u64, value: u32) -> Self {
        self.bytes(addr, value.to_le_bytes())
    }

    pub fn u64(self, addr: u64, value: u64) -> Self {
        self.bytes(addr, value.to_le_bytes())
    }

    pub fn ptr(self, addr: u64, value: KernelPtr) -> Self {
        self.u64(addr, value.addr())
    }

    /// Maps a NUL-terminated copy of `s` at `addr`.
    pub fn c_str(self, addr: u64, s: &str) -> Self {
        let mut bytes = Vec::with_capacity(s.len() + 1);
        bytes.extend_from_slice(s.as_bytes());
        bytes.push(0);
        self.bytes(addr, bytes)
    }

    /// Sorts the collected regions, merges directly adjacent ones and rejects
    /// overlapping, wrapping or null-page regions.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::NullRegion`] if a region starts at address zero.
    /// - [`SnapshotError::Wraps`] if a region extends past the end of the address space.
    /// - [`SnapshotError::Overlap`] if two regions share any byte.
    pub fn build(mut self) -> Result<MemorySnapshot, SnapshotError> {
        self.pending.sort_by_key(|(addr, _)| *addr);

        let mut regions: BTreeMap<u64, Vec<u8>> = BTreeMap::new();
        let mut last: Option<(u64, u64)> = None;

        for (addr, bytes) in self.pending {
            if addr == 0 {
                return Err(SnapshotError::NullRegion {
                    addr: KernelPtr::new(addr),
                });
            }
            let end = addr
                .checked_add(bytes.len() as u64)
                .ok_or(SnapshotError::Wraps {
                    addr: KernelPtr::new(addr),
                    len: bytes.len(),
                })?;

            match last {
                Some((base, prev_end)) if addr < prev_end => {
                    return Err(SnapshotError::Overlap {
                        addr: KernelPtr::new(addr),
                        other: KernelPtr::new(base),
                    });
                }
                Some((base, prev_end)) if addr == prev_end => {
                    if let Some(region) = regions.get_mut(&base) {
                        region.extend_from_slice(&bytes);
                    }
                    last = Some((base, end));
                }
                _ => {
                    regions.insert(addr, bytes);
                    last = Some((addr, end));
                }
            }
        }

        Ok(MemorySnapshot { regions })
    }
}
