//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to access {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON serialize error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository root not found from {0}. Expected 'rush.json' in an ancestor directory.")]
    RootNotFound(PathBuf),

    #[error("Project not found: {name}. Available projects: {available}")]
    ProjectNotFound { name: String, available: String },

    #[error("Project folder does not exist: {0}")]
    ProjectFolderMissing(PathBuf),

    #[error("Manifest not found for {project}: {path}")]
    ManifestNotFound { project: String, path: PathBuf },

    #[error("Invalid subspace name: {0}. Subspace names may only contain lowercase letters and underscores.")]
    InvalidSubspaceName(String),

    #[error("Subspaces are not enabled in {0}. Run 'subkit init' first.")]
    SubspacesNotEnabled(PathBuf),

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Empty version specifier entered for {0}")]
    EmptyVersion(String),

    #[error("Dependency {dependency} was already resolved ({state})")]
    AlreadyResolved { dependency: String, state: String },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Decision error: {0}")]
    Decision(String),

    #[error("Pattern error: {0}")]
    Pattern(String),
}

impl Error {
    /// Returns `true` for errors that only affect a single item of a batch.
    ///
    /// Loops over projects or dependencies log these and move on; anything
    /// else aborts the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::File { .. }
                | Error::Json { .. }
                | Error::ProjectNotFound { .. }
                | Error::ProjectFolderMissing(_)
                | Error::ManifestNotFound { .. }
                | Error::DestinationExists(_)
                | Error::EmptyVersion(_)
                | Error::AlreadyResolved { .. }
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Toml {
            error,
            context: "subkit.toml".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
