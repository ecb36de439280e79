//! Cgroup identity resolution for a task.
//!
//! This module walks from a task to the cgroup it belongs to for one resource
//! controller and reads that cgroup's identity: the kernfs node id, the node
//! name and the id of the owning hierarchy. Every step reads through a
//! [`crate::memory::SafeMemoryReader`] and degrades to a sentinel on failure.
//!
//! # Key Components
//!
//! - [`TaskCgroupResolver`] — task → css_set → controller state → cgroup, with
//!   the controller index bounded by [`MAX_KNOWN_CONTROLLER_INDEX`].
//! - [`CgroupAccessor`] — kernfs node, id, name and hierarchy id of a cgroup.
//! - [`CgroupIdentity`] — the snapshot produced for the event pipeline.
//! - [`Controller`] — upstream controller positions.
//!
//! # Limitations
//!
//! Controller indices are only meaningful relative to the kernel's live
//! controller list, which is inspected outside this crate. Kernels carrying
//! out-of-tree controllers ahead of the expected position resolve the wrong
//! controller; this is not detected.
mod accessor;
mod controller;
mod identity;
mod resolver;

pub use accessor::CgroupAccessor;
pub use controller::{Controller, MAX_KNOWN_CONTROLLER_INDEX};
pub use identity::CgroupIdentity;
pub use resolver::TaskCgroupResolver;

use crate::memory::kernel_handle;

kernel_handle!(
    /// Untrusted reference to a `struct task_struct`, owned by the caller's runtime.
    TaskPtr
);

kernel_handle!(
    /// Untrusted reference to a `struct cgroup`.
    CgroupPtr
);
