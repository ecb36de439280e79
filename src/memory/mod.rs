//! Bounded, non-faulting access to untrusted kernel memory.
//!
//! Every read through a kernel reference in this crate goes through
//! [`SafeMemoryReader::read`]. A reader copies exactly the requested number of
//! bytes into caller-owned storage or reports a [`ReadFault`]; it never panics
//! and never retries.
//!
//! # Key Components
//!
//! - [`KernelPtr`] — an untrusted kernel address. Computing field addresses with
//!   [`KernelPtr::offset`] never dereferences.
//! - [`SafeMemoryReader`] — the read primitive, plus native-endian helpers for
//!   the scalar and pointer fields the accessors need.
//! - [`MemorySnapshot`] — an in-process image of kernel memory used for replay
//!   and tests.
mod error;
mod snapshot;

pub use error::{ReadFault, SnapshotError};
pub use snapshot::{MemorySnapshot, MemorySnapshotBuilder};

use std::fmt;

/// Size of a kernel pointer on the supported 64-bit targets.
pub const POINTER_SIZE: u64 = 8;

/// An untrusted address in kernel memory.
///
/// A `KernelPtr` is only a number: it may be null, stale, unmapped or point
/// into memory that is being mutated concurrently.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct KernelPtr(u64);

impl KernelPtr {
    pub const NULL: KernelPtr = KernelPtr(0);

    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns the address `bytes` past this one. Wraps instead of overflowing;
    /// a wrapped address simply faults when read.
    pub const fn offset(self, bytes: u64) -> Self {
        Self(self.0.wrapping_add(bytes))
    }
}

impl fmt::Display for KernelPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Declares a typed handle over a [`KernelPtr`] for one kernel structure.
macro_rules! kernel_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name($crate::memory::KernelPtr);

        impl $name {
            pub const fn new(ptr: $crate::memory::KernelPtr) -> Self {
                Self(ptr)
            }

            pub const fn as_ptr(self) -> $crate::memory::KernelPtr {
                self.0
            }

            pub const fn is_null(self) -> bool {
                self.0.is_null()
            }

            /// Address of the field `offset` bytes into the structure.
            pub const fn field(self, offset: u64) -> $crate::memory::KernelPtr {
                self.0.offset(offset)
            }

            /// Returns `None` for a null address.
            pub fn non_null(ptr: $crate::memory::KernelPtr) -> Option<Self> {
                if ptr.is_null() { None } else { Some(Self(ptr)) }
            }
        }

        impl From<$crate::memory::KernelPtr> for $name {
            fn from(ptr: $crate::memory::KernelPtr) -> Self {
                Self(ptr)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

pub(crate) use kernel_handle;

/// A bounded, fault-tolerant copy from kernel memory.
///
/// Implementations copy exactly `dst.len()` bytes starting at `src` in a single
/// attempt. Any invalid access is reported as [`ReadFault`]; the contents of
/// `dst` are unspecified after a fault and must not be inspected.
///
/// The provided helpers decode the target's native (little-endian)
/// representation into stack locals.
pub trait SafeMemoryReader {
    fn read(&self, dst: &mut [u8], src: KernelPtr) -> Result<(), ReadFault>;

    fn read_u32(&self, src: KernelPtr) -> Result<u32, ReadFault> {
        let mut buf = [0u8; 4];
        self.read(&mut buf, src)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&self, src: KernelPtr) -> Result<u64, ReadFault> {
        let mut buf = [0u8; 8];
        self.read(&mut buf, src)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a pointer-sized field. The returned pointer is as untrusted as
    /// the one it was read through.
    fn read_ptr(&self, src: KernelPtr) -> Result<KernelPtr, ReadFault> {
        self.read_u64(src).map(KernelPtr::new)
    }
}

impl<R> SafeMemoryReader for &R
where
    R: SafeMemoryReader + ?Sized,
{
    fn read(&self, dst: &mut [u8], src: KernelPtr) -> Result<(), ReadFault> {
        (**self).read(dst, src)
    }
}
