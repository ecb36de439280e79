//! Kernel memory fixtures shared by the accessor tests.
//!
//! Every structure lives at its own fixed address so tests can assert which
//! addresses were read.

use std::cell::RefCell;

use crate::layout::{KernelLayout, LegacyNodeId, NodeIdLayout};
use crate::memory::{
    KernelPtr, MemorySnapshotBuilder, POINTER_SIZE, ReadFault, SafeMemoryReader,
};

pub(crate) const TASK: u64 = 0x10_0000;
pub(crate) const CSS_SET: u64 = 0x20_0000;
pub(crate) const CSS: u64 = 0x30_0000;
pub(crate) const CGROUP: u64 = 0x40_0000;
pub(crate) const ROOT: u64 = 0x50_0000;
pub(crate) const NODE: u64 = 0x60_0000;
pub(crate) const NAME: u64 = 0x70_0000;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records the address of every read before forwarding it.
#[derive(Debug)]
pub(crate) struct RecordingReader<R> {
    inner: R,
    reads: RefCell<Vec<KernelPtr>>,
}

impl<R> RecordingReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            reads: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn reads(&self) -> Vec<KernelPtr> {
        self.reads.borrow().clone()
    }

    pub(crate) fn read_count(&self) -> usize {
        self.reads.borrow().len()
    }

    /// Whether any read started inside `[base, base + len)`.
    pub(crate) fn touched(&self, base: u64, len: u64) -> bool {
        self.reads
            .borrow()
            .iter()
            .any(|ptr| ptr.addr() >= base && ptr.addr() < base + len)
    }

    pub(crate) fn clear(&self) {
        self.reads.borrow_mut().clear();
    }
}

impl<R> SafeMemoryReader for RecordingReader<R>
where
    R: SafeMemoryReader,
{
    fn read(&self, dst: &mut [u8], src: KernelPtr) -> Result<(), ReadFault> {
        self.reads.borrow_mut().push(src);
        self.inner.read(dst, src)
    }
}

/// A kernfs node at [`NODE`] named `name` at [`NAME`], with `id` stored in
/// the representation `layout` describes.
pub(crate) fn node(layout: &KernelLayout, id: u64, name: &str) -> MemorySnapshotBuilder {
    let offsets = &layout.offsets;
    let builder = MemorySnapshotBuilder::default()
        .ptr(NODE + offsets.kernfs_node_name, KernelPtr::new(NAME))
        .c_str(NAME, name);

    let id_addr = NODE + offsets.kernfs_node_id;
    match layout.node_id {
        NodeIdLayout::Modern => builder.u64(id_addr, id),
        NodeIdLayout::Legacy => {
            let legacy = LegacyNodeId::from(id);
            builder
                .u32(id_addr, legacy.ino)
                .u32(id_addr + 4, legacy.generation)
        }
    }
}

/// A cgroup at [`CGROUP`] backed by [`node`] and owned by a hierarchy root at [`ROOT`].
pub(crate) fn cgroup(
    layout: &KernelLayout,
    id: u64,
    name: &str,
    hierarchy_id: u32,
) -> MemorySnapshotBuilder {
    let offsets = &layout.offsets;
    node(layout, id, name)
        .ptr(CGROUP + offsets.cgroup_kn, KernelPtr::new(NODE))
        .ptr(CGROUP + offsets.cgroup_root, KernelPtr::new(ROOT))
        .u32(ROOT + offsets.root_hierarchy_id, hierarchy_id)
}

/// A task at [`TASK`] whose css_set maps controller `slot` to [`cgroup`].
pub(crate) fn task(
    layout: &KernelLayout,
    slot: u32,
    id: u64,
    name: &str,
    hierarchy_id: u32,
) -> MemorySnapshotBuilder {
    let offsets = &layout.offsets;
    cgroup(layout, id, name, hierarchy_id)
        .ptr(TASK + offsets.task_cgroups, KernelPtr::new(CSS_SET))
        .ptr(
            CSS_SET + offsets.css_set_subsys + u64::from(slot) * POINTER_SIZE,
            KernelPtr::new(CSS),
        )
        .ptr(CSS + offsets.css_cgroup, KernelPtr::new(CGROUP))
}
