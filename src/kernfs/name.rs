use std::fmt;

use super::NamePtr;
use crate::memory::{KernelPtr, SafeMemoryReader};

/// Capacity of the name buffer, including the terminating NUL.
pub const KN_NAME_LENGTH: usize = 128;

const NAME_CHUNK: usize = 16;

/// A kernfs node name copied out of kernel memory.
///
/// Holds at most `KN_NAME_LENGTH - 1` bytes and never contains a NUL byte.
/// Kernel names are not guaranteed to be UTF-8.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CgroupName(Box<[u8]>);

impl CgroupName {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for CgroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for CgroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CgroupName({:?})", self.to_string_lossy())
    }
}

impl serde::Serialize for CgroupName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Copies the NUL-terminated name behind `name` into an owned [`CgroupName`].
///
/// The copy is bounded to [`KN_NAME_LENGTH`] bytes and performed in a fixed
/// number of fixed-size chunks. A chunk that faults as a whole, which happens
/// when the name ends close to the end of a mapping, is retried byte by byte
/// up to its terminator. Names without a terminator inside the buffer are
/// truncated to `KN_NAME_LENGTH - 1` bytes.
///
/// Returns `None` for a null pointer or if any byte before the terminator
/// faults.
pub fn read_name<R>(reader: &R, name: NamePtr) -> Option<CgroupName>
where
    R: SafeMemoryReader + ?Sized,
{
    if name.is_null() {
        return None;
    }

    let mut buf = [0u8; KN_NAME_LENGTH];
    for start in (0..KN_NAME_LENGTH).step_by(NAME_CHUNK) {
        let addr = name.field(start as u64);
        let chunk = &mut buf[start..start + NAME_CHUNK];
        let copied = match reader.read(chunk, addr) {
            Ok(()) => NAME_CHUNK,
            Err(_) => copy_until_nul(reader, chunk, addr),
        };

        let nul = chunk[..copied].iter().position(|&b| b == 0);
        if let Some(nul) = nul {
            return Some(CgroupName(buf[..start + nul].into()));
        }
        if copied < NAME_CHUNK {
            log::trace!(
                target: "cgroup_identity",
                "reading `kernfs_node.name`: fault at {}",
                addr.offset(copied as u64)
            );
            return None;
        }
    }

    Some(CgroupName(buf[..KN_NAME_LENGTH - 1].into()))
}

/// Copies single bytes until a NUL is copied or a read faults. Returns the
/// number of bytes copied, including the NUL.
fn copy_until_nul<R>(reader: &R, chunk: &mut [u8], addr: KernelPtr) -> usize
where
    R: SafeMemoryReader + ?Sized,
{
    for (i, byte) in chunk.iter_mut().enumerate() {
        if reader
            .read(std::slice::from_mut(byte), addr.offset(i as u64))
            .is_err()
        {
            return i;
        }
        if *byte == 0 {
            return i + 1;
        }
    }
    chunk.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySnapshot;

    const ADDR: u64 = 0x7000;

    fn name_ptr() -> NamePtr {
        NamePtr::new(KernelPtr::new(ADDR))
    }

    #[test]
    fn test_short_name_at_end_of_mapping() {
        let snapshot = MemorySnapshot::builder()
            .c_str(ADDR, "foo.slice")
            .build()
            .unwrap();

        let name = read_name(&snapshot, name_ptr()).unwrap();
        assert_eq!(name.as_bytes(), b"foo.slice");
        assert_eq!(name.to_string(), "foo.slice");
    }

    #[test]
    fn test_name_spanning_several_chunks() {
        let long = "kubepods-burstable-pod12345678_90ab_cdef_1234_567890abcdef.slice";
        let snapshot = MemorySnapshot::builder().c_str(ADDR, long).build().unwrap();

        let name = read_name(&snapshot, name_ptr()).unwrap();
        assert_eq!(name.as_bytes(), long.as_bytes());
    }

    #[test]
    fn test_empty_name() {
        let snapshot = MemorySnapshot::builder().c_str(ADDR, "").build().unwrap();
        assert_eq!(read_name(&snapshot, name_ptr()).unwrap().as_bytes(), b"");
    }

    #[test]
    fn test_unterminated_name_is_truncated() {
        let snapshot = MemorySnapshot::builder()
            .bytes(ADDR, vec![b'a'; KN_NAME_LENGTH * 2])
            .build()
            .unwrap();

        let name = read_name(&snapshot, name_ptr()).unwrap();
        assert_eq!(name.as_bytes().len(), KN_NAME_LENGTH - 1);
    }

    #[test]
    fn test_fault_before_terminator() {
        let snapshot = MemorySnapshot::builder()
            .bytes(ADDR, b"no-terminator".to_vec())
            .build()
            .unwrap();
        assert_eq!(read_name(&snapshot, name_ptr()), None);
    }

    #[test]
    fn test_null_and_unmapped() {
        let snapshot = MemorySnapshot::default();
        assert_eq!(read_name(&snapshot, NamePtr::new(KernelPtr::NULL)), None);
        assert_eq!(read_name(&snapshot, name_ptr()), None);
    }

    #[test]
    fn test_non_utf8_name_serializes_lossy() {
        let snapshot = MemorySnapshot::builder()
            .bytes(ADDR, vec![b'x', 0xff, 0])
            .build()
            .unwrap();

        let name = read_name(&snapshot, name_ptr()).unwrap();
        assert_eq!(name.as_bytes(), &[b'x', 0xff]);
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"x\u{fffd}\"");
    }
}
