use crate::memory::{KernelPtr, ReadFault, SafeMemoryReader};

/// Byte offsets of the fields traversed between a task and its cgroup identity.
///
/// The defaults describe a common x86_64 build with all upstream controllers
/// compiled in. Kernels differ in these offsets, so deployments are expected
/// to supply the values of the running kernel, e.g. through
/// [`super::KernelLayout::from_json_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct KernelOffsets {
    /// `task_struct.cgroups`
    pub task_cgroups: u64,
    /// `css_set.subsys`, the per-controller state array.
    pub css_set_subsys: u64,
    /// `cgroup_subsys_state.cgroup`
    pub css_cgroup: u64,
    /// `cgroup.kn`
    pub cgroup_kn: u64,
    /// `cgroup.root`
    pub cgroup_root: u64,
    /// `cgroup_root.hierarchy_id`
    pub root_hierarchy_id: u64,
    /// `kernfs_node.name`
    pub kernfs_node_name: u64,
    /// `kernfs_node.id`, either the scalar or the legacy wrapper.
    pub kernfs_node_id: u64,
}

impl Default for KernelOffsets {
    fn default() -> Self {
        Self {
            task_cgroups: 2904,
            css_set_subsys: 0,
            css_cgroup: 0,
            cgroup_kn: 256,
            cgroup_root: 416,
            root_hierarchy_id: 12,
            kernfs_node_name: 16,
            kernfs_node_id: 96,
        }
    }
}

/// Legacy `union kernfs_node_id`, read as its `{ ino, generation }` view.
///
/// The union's nested `id` member overlays both halves, so the identifier
/// it denotes equals the modern scalar `kernfs_node.id` for the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyNodeId {
    pub ino: u32,
    pub generation: u32,
}

impl LegacyNodeId {
    pub const SIZE: usize = 8;

    /// Copies the wrapper out of kernel memory at `addr`.
    pub fn read_from<R>(reader: &R, addr: KernelPtr) -> Result<Self, ReadFault>
    where
        R: SafeMemoryReader + ?Sized,
    {
        let mut raw = [0u8; Self::SIZE];
        reader.read(&mut raw, addr)?;

        let [i0, i1, i2, i3, g0, g1, g2, g3] = raw;
        Ok(Self {
            ino: u32::from_le_bytes([i0, i1, i2, i3]),
            generation: u32::from_le_bytes([g0, g1, g2, g3]),
        })
    }

    /// The nested `id` member.
    pub fn id(self) -> u64 {
        u64::from(self.ino) | (u64::from(self.generation) << 32)
    }
}

impl From<u64> for LegacyNodeId {
    fn from(id: u64) -> Self {
        Self {
            ino: id as u32,
            generation: (id >> 32) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySnapshot;

    #[test]
    fn test_legacy_id_combines_ino_and_generation() {
        let legacy = LegacyNodeId {
            ino: 0x2a,
            generation: 3,
        };
        assert_eq!(legacy.id(), 0x3_0000_002a);
        assert_eq!(LegacyNodeId::from(legacy.id()), legacy);
    }

    #[test]
    fn test_read_from_matches_scalar_read() {
        let value = 0x0000_0001_0000_1234u64;
        let snapshot = MemorySnapshot::builder().u64(0x500, value).build().unwrap();

        let legacy = LegacyNodeId::read_from(&snapshot, KernelPtr::new(0x500)).unwrap();
        assert_eq!(legacy.ino, 0x1234);
        assert_eq!(legacy.generation, 1);
        assert_eq!(legacy.id(), snapshot.read_u64(KernelPtr::new(0x500)).unwrap());
    }

    #[test]
    fn test_read_from_faults_on_truncated_wrapper() {
        let snapshot = MemorySnapshot::builder().u32(0x500, 7).build().unwrap();
        assert!(LegacyNodeId::read_from(&snapshot, KernelPtr::new(0x500)).is_err());
    }

    #[test]
    fn test_partial_offsets_fall_back_to_defaults() {
        let offsets: KernelOffsets = serde_json::from_str(r#"{ "task_cgroups": 3000 }"#).unwrap();
        assert_eq!(offsets.task_cgroups, 3000);
        assert_eq!(offsets.kernfs_node_id, KernelOffsets::default().kernfs_node_id);
    }
}
