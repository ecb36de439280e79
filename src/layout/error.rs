use std::path::PathBuf;

use crate::fsutil;

/// Errors that may occur while loading a kernel layout or type catalog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Load(#[from] fsutil::LoadError),
}

pub type Result<T> = std::result::Result<T, Error>;
