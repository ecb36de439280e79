use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use super::{Error, Result};
use crate::fsutil::{self, InputKind};

/// Name of the wrapper type that only exists on kernels using the legacy
/// `kernfs_node` id representation (5.4 and older).
pub const LEGACY_NODE_ID_WRAPPER: &str = "kernfs_node_id";

/// In-memory representation of the `kernfs_node` identifier.
///
/// Exactly one variant describes a running kernel. It is resolved once with
/// [`NodeIdLayout::detect`] and never re-probed on the per-event path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeIdLayout {
    /// The identifier is a direct `u64` field.
    #[default]
    Modern,
    /// The identifier is the `id` member nested in a `union kernfs_node_id`.
    Legacy,
}

impl NodeIdLayout {
    /// Probes for the legacy wrapper type: present means [`NodeIdLayout::Legacy`],
    /// absent means [`NodeIdLayout::Modern`].
    pub fn detect<P>(probe: &P) -> Self
    where
        P: TypeProbe + ?Sized,
    {
        let layout = if probe.type_exists(LEGACY_NODE_ID_WRAPPER) {
            NodeIdLayout::Legacy
        } else {
            NodeIdLayout::Modern
        };
        log::debug!("Resolved kernfs node id layout: {:?}", layout);
        layout
    }
}

/// A capability probe over the type catalog of the running kernel.
pub trait TypeProbe {
    fn type_exists(&self, name: &str) -> bool;
}

impl<F> TypeProbe for F
where
    F: Fn(&str) -> bool,
{
    fn type_exists(&self, name: &str) -> bool {
        self(name)
    }
}

/// Set of type names known to exist in the running kernel.
///
/// Names are stored without their `struct`/`union`/`enum` keyword, so
/// `union kernfs_node_id` and `kernfs_node_id` refer to the same entry.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    names: HashSet<String>,
}

impl TypeCatalog {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .filter_map(|name| parse_type_line(name.as_ref()))
                .collect(),
        }
    }

    /// Reads a type listing with one type per line.
    ///
    /// Accepted line shapes are a bare name (`css_set`), a keyword and a name
    /// (`union kernfs_node_id`) or a raw BTF dump line, where the name is the
    /// first single-quoted token (`[42] UNION 'kernfs_node_id' size=8 vlen=2`).
    /// Empty lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::FileOpen`] if the file can't be opened.
    /// - [`Error::ReadLine`] if reading from the file fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = fsutil::open_input(InputKind::TypeCatalog, path)?;
        Self::from_reader(reader, path)
    }

    fn from_reader<R: BufRead>(mut reader: R, origin: &Path) -> Result<Self> {
        let mut names = HashSet::new();
        let mut line = String::with_capacity(128);

        while reader
            .read_line(&mut line)
            .map_err(|source| Error::ReadLine {
                path: origin.to_path_buf(),
                source,
            })?
            != 0
        {
            if let Some(name) = parse_type_line(&line) {
                names.insert(name);
            }
            line.clear();
        }

        log::debug!(
            "Loaded {} kernel type names from `{}`",
            names.len(),
            origin.display()
        );
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TypeProbe for TypeCatalog {
    fn type_exists(&self, name: &str) -> bool {
        parse_type_line(name).is_some_and(|name| self.names.contains(&name))
    }
}

fn parse_type_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    if let Some((_, rest)) = line.split_once('\'') {
        let (name, _) = rest.split_once('\'')?;
        return (!name.is_empty()).then(|| name.to_owned());
    }

    let name = ["struct ", "union ", "enum "]
        .iter()
        .find_map(|keyword| line.strip_prefix(keyword))
        .unwrap_or(line)
        .trim();

    (!name.is_empty()).then(|| name.to_owned())
}
