//! Loading of the load-time inputs: kernel layouts, type catalogs and memory
//! snapshots.
//!
//! None of these are touched on the per-event path. Every error names the
//! kind of input and the path it came from.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// The kinds of file this crate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// JSON [`crate::layout::KernelLayout`].
    KernelLayout,
    /// Line-based [`crate::layout::TypeCatalog`] listing.
    TypeCatalog,
    /// JSON [`crate::memory::MemorySnapshot`] fixture.
    MemorySnapshot,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::KernelLayout => "kernel layout",
            InputKind::TypeCatalog => "type catalog",
            InputKind::MemorySnapshot => "memory snapshot",
        };
        f.write_str(name)
    }
}

/// Error that occurs when opening an input file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open {kind} `{path}`: {source}")]
pub struct FileOpenError {
    pub kind: InputKind,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Errors that may occur while loading a JSON input.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Open(#[from] FileOpenError),
    #[error("failed to parse {kind} `{path}`: {source}")]
    Parse {
        kind: InputKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Opens an input file and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use cgroup_identity::fsutil::{self, InputKind};
/// let reader = fsutil::open_input(InputKind::TypeCatalog, "/var/lib/cgroup-identity/types.txt")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_input(kind: InputKind, path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Opens and deserializes a JSON input file.
///
/// # Errors
///
/// - [`LoadError::Open`] if the file can't be opened.
/// - [`LoadError::Parse`] if the contents don't deserialize into `T`.
pub fn load_json<T>(kind: InputKind, path: impl AsRef<Path>) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    let path = path.as_ref();
    let reader = open_input(kind, path)?;
    parse_json(kind, reader, path)
}

/// Deserializes a JSON input from `reader`; `origin` names it in errors.
pub fn parse_json<T, R>(kind: InputKind, reader: R, origin: &Path) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let value = serde_json::from_reader(reader).map_err(|source| LoadError::Parse {
        kind,
        path: origin.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded {} from `{}`", kind, origin.display());
    Ok(value)
}
