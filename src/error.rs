//! Error types for program loading.

use std::path::PathBuf;

/// Fatal failures while turning a target into compilation units.
///
/// Any of these aborts the run: a graph built from a partially loaded
/// program is not emitted.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}:{column}: parse error: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("file not found for module `{module}` declared in {declared_in}")]
    ModuleNotFound { module: String, declared_in: PathBuf },

    #[error("cargo metadata failed: {0}")]
    Metadata(#[from] cargo_metadata::Error),

    #[error("no package matches `{0}`")]
    NoPackages(String),

    #[error("packages matching `{0}` have no library or binary sources")]
    NoSources(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
