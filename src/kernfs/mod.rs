//! Accessors for `kernfs_node`, the virtual-filesystem node backing a cgroup.
mod name;

pub use name::{CgroupName, KN_NAME_LENGTH, read_name};

use crate::error::ResultOkTraceExt;
use crate::layout::{KernelLayout, LegacyNodeId, NodeIdLayout};
use crate::memory::{SafeMemoryReader, kernel_handle};

kernel_handle!(
    /// Untrusted reference to a `struct kernfs_node`.
    NodePtr
);

kernel_handle!(
    /// Untrusted reference to the NUL-terminated name of a `kernfs_node`.
    ///
    /// The bytes are owned by the kernel and only valid at the instant they
    /// are read; copy them with [`read_name`] before keeping them.
    NamePtr
);

/// Reads the name and identifier of a kernfs node using the resolved layout.
#[derive(Debug, Clone, Copy)]
pub struct KernfsNodeAccessor<R> {
    reader: R,
    layout: KernelLayout,
}

impl<R> KernfsNodeAccessor<R>
where
    R: SafeMemoryReader,
{
    pub fn new(reader: R, layout: KernelLayout) -> Self {
        Self { reader, layout }
    }

    /// Returns the node's name pointer, or `None` for a null node, a faulted
    /// read or a null name.
    pub fn name(&self, node: NodePtr) -> Option<NamePtr> {
        if node.is_null() {
            return None;
        }

        self.reader
            .read_ptr(node.field(self.layout.offsets.kernfs_node_name))
            .ok_trace("kernfs_node.name")
            .and_then(NamePtr::non_null)
    }

    /// Returns the node's identifier, or `0` for a null node or a faulted read.
    ///
    /// Both layouts decode to the same number for the same node: the legacy
    /// wrapper's nested `id` overlays the bytes of the modern scalar.
    pub fn id(&self, node: NodePtr) -> u64 {
        if node.is_null() {
            return 0;
        }

        let field = node.field(self.layout.offsets.kernfs_node_id);
        let id = match self.layout.node_id {
            NodeIdLayout::Modern => self.reader.read_u64(field).ok_trace("kernfs_node.id"),
            NodeIdLayout::Legacy => LegacyNodeId::read_from(&self.reader, field)
                .map(LegacyNodeId::id)
                .ok_trace("kernfs_node.id.id"),
        };

        id.unwrap_or(0)
    }
}
