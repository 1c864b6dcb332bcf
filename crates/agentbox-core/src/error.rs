use crate::gate::GateViolation;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("installation directory not found: set AGENTBOX_INSTALL_DIR to the directory holding the Dockerfile")]
    InstallDirNotFound,

    #[error("installation directory does not exist: {0}")]
    InstallDirInvalid(PathBuf),

    #[error("settings file {settings} is missing and no template exists at {template}")]
    SettingsMissing { settings: PathBuf, template: PathBuf },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("cannot determine hostname: {0}")]
    Hostname(String),

    #[error("invalid root name '{0}': must be a single path segment of letters, digits, '.', '_' or '-'")]
    InvalidRootName(String),

    #[error("invalid value '{value}' for {key}: expected a numeric id")]
    InvalidId { key: String, value: String },

    #[error("missing value for {0}")]
    MissingFlagValue(String),

    #[error("refusing to launch, {0} (pass --force to override)")]
    Unsafe(GateViolation),

    #[error("container runtime '{0}' not found on PATH")]
    RuntimeNotFound(String),

    #[error("container {action} exited with status {code}")]
    RuntimeFailed { action: &'static str, code: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Dotenv(#[from] dotenvy::Error),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
