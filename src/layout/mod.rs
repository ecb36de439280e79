//! Load-time resolution of the kernel data layout.
//!
//! The per-event accessors never probe the kernel. Everything that varies
//! between kernel versions is captured once in a [`KernelLayout`]: the
//! [`NodeIdLayout`] variant of the `kernfs_node` identifier and the
//! [`KernelOffsets`] of every traversed field.
mod detect;
mod error;
mod offsets;

pub use detect::{LEGACY_NODE_ID_WRAPPER, NodeIdLayout, TypeCatalog, TypeProbe};
pub use error::{Error, Result};
pub use offsets::{KernelOffsets, LegacyNodeId};

use std::io::Read;
use std::path::Path;

use crate::fsutil::{self, InputKind};

/// Resolved description of the running kernel's data layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub struct KernelLayout {
    #[serde(default)]
    pub node_id: NodeIdLayout,
    #[serde(default)]
    pub offsets: KernelOffsets,
}

impl KernelLayout {
    pub fn new(node_id: NodeIdLayout, offsets: KernelOffsets) -> Self {
        Self { node_id, offsets }
    }

    /// Probes the node id layout once and pairs it with the given offsets.
    pub fn resolve<P>(probe: &P, offsets: KernelOffsets) -> Self
    where
        P: TypeProbe + ?Sized,
    {
        Self::new(NodeIdLayout::detect(probe), offsets)
    }

    /// Loads a pre-resolved layout from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::Load`] if the file can't be opened or is not a valid layout document.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cgroup_identity::layout::KernelLayout;
    ///
    /// let layout = KernelLayout::from_json_file("/etc/cgroup-identity/layout.json").unwrap();
    /// println!("node id layout: {:?}", layout.node_id);
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(fsutil::load_json(InputKind::KernelLayout, path)?)
    }

    fn from_json_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        Ok(fsutil::parse_json(InputKind::KernelLayout, reader, origin)?)
    }
}
