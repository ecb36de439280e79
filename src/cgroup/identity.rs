use crate::kernfs::CgroupName;

/// Point-in-time identity of a task's cgroup, as handed to the event pipeline.
///
/// Sentinels mean "unavailable": an `id` of `0` is unknown and a missing
/// `name` could not be read. Consumers should omit or mark such fields, never
/// drop the surrounding event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CgroupIdentity {
    id: u64,
    name: Option<CgroupName>,
    hierarchy_id: u32,
}

impl CgroupIdentity {
    pub fn new(id: u64, name: Option<CgroupName>, hierarchy_id: u32) -> Self {
        Self {
            id,
            name,
            hierarchy_id,
        }
    }

    /// The kernfs node id of the cgroup, `0` if unknown.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<&CgroupName> {
        self.name.as_ref()
    }

    pub fn hierarchy_id(&self) -> u32 {
        self.hierarchy_id
    }

    /// Whether the cgroup lives on the default (unified) hierarchy.
    pub fn is_default_hierarchy(&self) -> bool {
        self.hierarchy_id == 0
    }
}
