use super::CgroupPtr;
use crate::error::ResultOkTraceExt;
use crate::kernfs::{KernfsNodeAccessor, NamePtr, NodePtr};
use crate::layout::KernelLayout;
use crate::memory::SafeMemoryReader;

/// Reads the identity fields of a `struct cgroup`.
#[derive(Debug, Clone, Copy)]
pub struct CgroupAccessor<R> {
    reader: R,
    layout: KernelLayout,
}

impl<R> CgroupAccessor<R>
where
    R: SafeMemoryReader,
{
    pub fn new(reader: R, layout: KernelLayout) -> Self {
        Self { reader, layout }
    }

    pub(crate) fn kernfs(&self) -> KernfsNodeAccessor<&R> {
        KernfsNodeAccessor::new(&self.reader, self.layout)
    }

    /// Returns the cgroup's kernfs node, or `None` for a null cgroup, a
    /// faulted read or a null node.
    pub fn kernfs_node(&self, cgroup: CgroupPtr) -> Option<NodePtr> {
        if cgroup.is_null() {
            return None;
        }

        self.reader
            .read_ptr(cgroup.field(self.layout.offsets.cgroup_kn))
            .ok_trace("cgroup.kn")
            .and_then(NodePtr::non_null)
    }

    /// Returns the id of the hierarchy owning `cgroup`; `0` is the default
    /// hierarchy.
    ///
    /// Only call this with a valid cgroup. There is no failure value: a
    /// faulted read also yields `0`.
    pub fn hierarchy_id(&self, cgroup: CgroupPtr) -> u32 {
        let offsets = &self.layout.offsets;
        self.reader
            .read_ptr(cgroup.field(offsets.cgroup_root))
            .and_then(|root| self.reader.read_u32(root.offset(offsets.root_hierarchy_id)))
            .ok_trace("cgroup.root.hierarchy_id")
            .unwrap_or(0)
    }

    /// Returns the cgroup id, i.e. the id of its kernfs node, or `0` on any
    /// failure along the way.
    pub fn id(&self, cgroup: CgroupPtr) -> u64 {
        self.kernfs_node(cgroup)
            .map_or(0, |node| self.kernfs().id(node))
    }

    /// Returns the name pointer of the cgroup's kernfs node, or `None` on any
    /// failure along the way.
    pub fn name(&self, cgroup: CgroupPtr) -> Option<NamePtr> {
        self.kernfs_node(cgroup)
            .and_then(|node| self.kernfs().name(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernfs::read_name;
    use crate::layout::{KernelOffsets, NodeIdLayout};
    use crate::memory::{KernelPtr, MemorySnapshot};
    use crate::testutil::{self, CGROUP, NAME, NODE, ROOT, RecordingReader};

    fn cgroup() -> CgroupPtr {
        CgroupPtr::new(KernelPtr::new(CGROUP))
    }

    #[test]
    fn test_identity_fields() {
        let layout = KernelLayout::default();
        let snapshot = testutil::cgroup(&layout, 42, "foo.slice", 3).build().unwrap();
        let accessor = CgroupAccessor::new(&snapshot, layout);

        assert_eq!(accessor.kernfs_node(cgroup()), Some(NodePtr::new(KernelPtr::new(NODE))));
        assert_eq!(accessor.id(cgroup()), 42);
        assert_eq!(accessor.hierarchy_id(cgroup()), 3);

        let name = accessor.name(cgroup()).unwrap();
        assert_eq!(name.as_ptr(), KernelPtr::new(NAME));
        assert_eq!(read_name(&snapshot, name).unwrap().as_bytes(), b"foo.slice");
    }

    #[test]
    fn test_legacy_layout_id() {
        let layout = KernelLayout::new(NodeIdLayout::Legacy, KernelOffsets::default());
        let snapshot = testutil::cgroup(&layout, 7, "bar", 0).build().unwrap();

        assert_eq!(CgroupAccessor::new(&snapshot, layout).id(cgroup()), 7);
    }

    #[test]
    fn test_null_cgroup_is_sentinel_without_reads() {
        let reader = RecordingReader::new(MemorySnapshot::default());
        let accessor = CgroupAccessor::new(&reader, KernelLayout::default());
        let null = CgroupPtr::new(KernelPtr::NULL);

        assert_eq!(accessor.kernfs_node(null), None);
        assert_eq!(accessor.id(null), 0);
        assert_eq!(accessor.name(null), None);
        assert_eq!(reader.read_count(), 0);
    }

    #[test]
    fn test_missing_node_stops_the_chain() {
        let layout = KernelLayout::default();
        let snapshot = MemorySnapshot::builder()
            .ptr(CGROUP + layout.offsets.cgroup_kn, KernelPtr::NULL)
            .build()
            .unwrap();
        let reader = RecordingReader::new(snapshot);
        let accessor = CgroupAccessor::new(&reader, layout);

        assert_eq!(accessor.id(cgroup()), 0);
        assert_eq!(accessor.name(cgroup()), None);
        assert!(!reader.touched(0, CGROUP));
        assert_eq!(reader.read_count(), 2);
    }

    #[test]
    fn test_id_and_name_read_the_same_node() {
        let layout = KernelLayout::default();
        let snapshot = testutil::cgroup(&layout, 42, "foo.slice", 0).build().unwrap();
        let reader = RecordingReader::new(snapshot);
        let accessor = CgroupAccessor::new(&reader, layout);

        accessor.id(cgroup());
        accessor.name(cgroup());

        let node_reads: Vec<_> = reader
            .reads()
            .into_iter()
            .filter(|ptr| ptr.addr() >= NODE && ptr.addr() < NODE + 0x1000)
            .collect();
        assert_eq!(
            node_reads,
            vec![
                KernelPtr::new(NODE + layout.offsets.kernfs_node_id),
                KernelPtr::new(NODE + layout.offsets.kernfs_node_name),
            ]
        );
    }

    #[test]
    fn test_hierarchy_id_fault_is_zero() {
        let layout = KernelLayout::default();
        let snapshot = MemorySnapshot::builder()
            .ptr(CGROUP + layout.offsets.cgroup_root, KernelPtr::new(ROOT))
            .build()
            .unwrap();

        assert_eq!(CgroupAccessor::new(&snapshot, layout).hierarchy_id(cgroup()), 0);
    }
}
