//! Cgroup Identity: resolves the cgroup id, name and hierarchy id of a task by
//! reading kernel memory through a bounded, fault-tolerant read primitive.
//!
//! Everything kernel-version specific is resolved once, at load time, into a
//! [`layout::KernelLayout`]. The per-event path then runs a fixed number of
//! reads, holds no state and degrades to sentinels (`0`, `None`) instead of
//! failing.
//!
//! ```
//! use cgroup_identity::cgroup::{TaskCgroupResolver, TaskPtr};
//! use cgroup_identity::config::ResolverConfig;
//! use cgroup_identity::layout::{KernelLayout, TypeCatalog};
//! use cgroup_identity::memory::{KernelPtr, MemorySnapshot};
//!
//! let catalog = TypeCatalog::from_names(["struct kernfs_node", "struct css_set"]);
//! let layout = KernelLayout::resolve(&catalog, Default::default());
//! let resolver = TaskCgroupResolver::new(
//!     MemorySnapshot::default(),
//!     layout,
//!     ResolverConfig::new(0),
//! );
//!
//! // Nothing is mapped, so the task's cgroup is unavailable.
//! assert!(resolver.identify(TaskPtr::new(KernelPtr::new(0x1000))).is_none());
//! ```
pub mod cgroup;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod kernfs;
pub mod layout;
pub mod memory;

#[cfg(test)]
mod testutil;

pub use cgroup::{CgroupAccessor, CgroupIdentity, CgroupPtr, TaskCgroupResolver, TaskPtr};
pub use config::ResolverConfig;
pub use kernfs::{CgroupName, KernfsNodeAccessor};
pub use layout::{KernelLayout, NodeIdLayout};
pub use memory::{KernelPtr, MemorySnapshot, ReadFault, SafeMemoryReader};
