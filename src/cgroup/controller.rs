use std::fmt;

/// Upstream cgroup controllers in their compiled-in order.
///
/// The discriminant is the controller's position in a task's css_set when
/// every upstream controller is built in, which is also its line number in
/// `/proc/cgroups` (not counting the header). New upstream controllers are
/// appended at the end.
///
/// Out-of-tree controllers compiled in ahead of a controller shift every
/// following index. Those kernels are not detected here; the caller's
/// controller index is trusted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Controller {
    Cpuset = 0,
    Cpu,
    Cpuacct,
    Io,
    Memory,
    Devices,
    Freezer,
    NetCls,
    PerfEvent,
    NetPrio,
    Hugetlb,
    Pids,
    Rdma,
}

/// Highest controller index this build understands. Indices above it are
/// rejected before the controller array is read.
pub const MAX_KNOWN_CONTROLLER_INDEX: u32 = Controller::Rdma as u32;

impl Controller {
    pub const ALL: [Controller; 13] = [
        Controller::Cpuset,
        Controller::Cpu,
        Controller::Cpuacct,
        Controller::Io,
        Controller::Memory,
        Controller::Devices,
        Controller::Freezer,
        Controller::NetCls,
        Controller::PerfEvent,
        Controller::NetPrio,
        Controller::Hugetlb,
        Controller::Pids,
        Controller::Rdma,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Name as listed in `/proc/cgroups`.
    pub fn name(self) -> &'static str {
        match self {
            Controller::Cpuset => "cpuset",
            Controller::Cpu => "cpu",
            Controller::Cpuacct => "cpuacct",
            Controller::Io => "io",
            Controller::Memory => "memory",
            Controller::Devices => "devices",
            Controller::Freezer => "freezer",
            Controller::NetCls => "net_cls",
            Controller::PerfEvent => "perf_event",
            Controller::NetPrio => "net_prio",
            Controller::Hugetlb => "hugetlb",
            Controller::Pids => "pids",
            Controller::Rdma => "rdma",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
