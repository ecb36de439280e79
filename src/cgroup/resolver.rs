use super::{CgroupAccessor, CgroupIdentity, CgroupPtr, MAX_KNOWN_CONTROLLER_INDEX, TaskPtr};
use crate::config::ResolverConfig;
use crate::error::ResultOkTraceExt;
use crate::kernfs::read_name;
use crate::layout::KernelLayout;
use crate::memory::{POINTER_SIZE, SafeMemoryReader};

/// Walks task → css_set → per-controller state → cgroup.
///
/// The resolver holds no mutable state: every call takes a fresh snapshot of
/// the fields it reads, so one resolver can serve any number of concurrent
/// callers as long as its reader can.
#[derive(Debug, Clone)]
pub struct TaskCgroupResolver<R> {
    reader: R,
    layout: KernelLayout,
    config: ResolverConfig,
}

impl<R> TaskCgroupResolver<R>
where
    R: SafeMemoryReader,
{
    pub fn new(reader: R, layout: KernelLayout, config: ResolverConfig) -> Self {
        Self {
            reader,
            layout,
            config,
        }
    }

    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Accessor over the same reader and layout, for the cgroups this
    /// resolver returns.
    pub fn cgroups(&self) -> CgroupAccessor<&R> {
        CgroupAccessor::new(&self.reader, self.layout)
    }

    /// Returns the cgroup of `task` for the configured controller index.
    pub fn resolve(&self, task: TaskPtr) -> Option<CgroupPtr> {
        self.resolve_index(task, self.config.controller_index)
    }

    /// Returns the cgroup of `task` for the controller at `controller_index`.
    ///
    /// Indices above [`MAX_KNOWN_CONTROLLER_INDEX`] are rejected after the
    /// css_set pointer is read and before the controller array is touched.
    /// Such a misconfiguration is indistinguishable from "not found".
    pub fn resolve_index(&self, task: TaskPtr, controller_index: u32) -> Option<CgroupPtr> {
        if task.is_null() {
            return None;
        }
        let offsets = &self.layout.offsets;

        let css_set = self
            .reader
            .read_ptr(task.field(offsets.task_cgroups))
            .ok_trace("task_struct.cgroups")?;
        if css_set.is_null() {
            return None;
        }

        if controller_index > MAX_KNOWN_CONTROLLER_INDEX {
            log::trace!(
                target: "cgroup_identity",
                "controller index {controller_index} exceeds {MAX_KNOWN_CONTROLLER_INDEX}"
            );
            return None;
        }

        let slot = css_set
            .offset(offsets.css_set_subsys)
            .offset(u64::from(controller_index) * POINTER_SIZE);
        let css = self
            .reader
            .read_ptr(slot)
            .ok_trace("css_set.subsys")?;
        if css.is_null() {
            return None;
        }

        self.reader
            .read_ptr(css.offset(offsets.css_cgroup))
            .ok_trace("cgroup_subsys_state.cgroup")
            .and_then(CgroupPtr::non_null)
    }

    /// Resolves the cgroup of `task` and snapshots its identity.
    ///
    /// The kernfs node is read once and both the id and the name are derived
    /// from that same node. The name is copied out with [`read_name`].
    pub fn identify(&self, task: TaskPtr) -> Option<CgroupIdentity> {
        let cgroup = self.resolve(task)?;
        let cgroups = self.cgroups();
        let kernfs = cgroups.kernfs();

        let node = cgroups.kernfs_node(cgroup);
        let id = node.map_or(0, |node| kernfs.id(node));
        let name = node
            .and_then(|node| kernfs.name(node))
            .and_then(|name| read_name(&self.reader, name));

        Some(CgroupIdentity::new(id, name, cgroups.hierarchy_id(cgroup)))
    }
}
