use thiserror::Error;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Invalid bump class: {0}")]
    InvalidBumpClass(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No uncommitted changes found, nothing to release")]
    NoPendingChanges,

    #[error("No existing release tags found, nothing to override")]
    NoReleaseTags,

    #[error("Release cancelled by operator")]
    Cancelled,

    #[error("Release step '{step}' failed: {detail}")]
    ExecutionFailed { step: String, detail: String },

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    /// Create an interaction error with context
    pub fn interaction(msg: impl Into<String>) -> Self {
        ReleaseError::Interaction(msg.into())
    }

    /// Create an execution failure for a named release step
    pub fn execution(step: impl Into<String>, detail: impl Into<String>) -> Self {
        ReleaseError::ExecutionFailed {
            step: step.into(),
            detail: detail.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Preconditions and configuration problems exit with 2, unparseable
    /// versions with 4, operator cancellation with 130, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::NoPendingChanges
            | ReleaseError::NoReleaseTags
            | ReleaseError::Config(_)
            | ReleaseError::TomlDe(_) => 2,
            ReleaseError::Version(_) | ReleaseError::InvalidBumpClass(_) => 4,
            ReleaseError::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<dialoguer::Error> for ReleaseError {
    fn from(err: dialoguer::Error) -> Self {
        ReleaseError::Interaction(err.to_string())
    }
}
