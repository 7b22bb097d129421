use std::path::PathBuf;
use thiserror::Error;

/// All failure kinds the install pipeline can surface.
///
/// Every stage-local error is mapped into exactly one of these variants
/// before it reaches a caller; nothing is swallowed or retried inside
/// the core.
#[derive(Error, Debug)]
pub enum KegError {
    /// No metadata exists for the package under any backing source.
    #[error("package not found: {name}")]
    NotFound { name: String },

    /// The formula identifier derived from the name has no registered
    /// definition.
    #[error("no formula definition '{ident}' for package '{name}'")]
    DefinitionNotFound { name: String, ident: String },

    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sha256 mismatch: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    #[error("unsupported archive format: {file_name}")]
    UnsupportedFormat { file_name: String },

    /// Symlink, hardlink, absolute-path or `..`-traversal archive entry.
    #[error("unsafe archive entry rejected: {entry}")]
    UnsafeArchive { entry: String },

    #[error("install step failed for {name}: {reason}")]
    InstallProcedure { name: String, reason: String },

    /// Another install of the same package currently holds the lock.
    #[error("install already in progress for {name}")]
    AlreadyInProgress { name: String },

    #[error("registry file not found at {0}; run `keg update` first")]
    RegistryMissing(PathBuf),

    #[error("failed to parse registry: {0}")]
    RegistryParse(#[from] serde_json::Error),

    /// The caller raised the cancellation token mid-operation.
    #[error("operation interrupted")]
    Interrupted,
}

impl KegError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KegError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        KegError::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KegError>;
