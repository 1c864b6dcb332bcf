//! Container runtime collaborator.
//!
//! The planner talks to the runtime only through [`ContainerRuntime`]. The
//! production implementation shells out to a docker-compatible CLI; tests
//! substitute a recorder.

use crate::error::{LaunchError, Result};
use crate::invocation;
use crate::plan::LaunchPlan;
use crate::rebuild::ImageMetadata;
use serde::Serialize;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRequest {
    pub image: String,
    pub context: PathBuf,
    pub dockerfile: PathBuf,
    pub build_args: Vec<(String, String)>,
    pub labels: Vec<(String, String)>,
    /// Pull the base image and ignore the layer cache.
    pub refresh: bool,
}

pub trait ContainerRuntime {
    /// Metadata of `image`, or `None` if it does not exist or cannot be read.
    fn inspect_image(&self, image: &str) -> Option<ImageMetadata>;

    fn build(&self, request: &BuildRequest) -> Result<()>;

    /// Run the container in the foreground and return its exit status.
    fn run(&self, plan: &LaunchPlan) -> Result<i32>;
}

// ---------------------------------------------------------------------------
// DockerCli
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DockerCli {
    program: PathBuf,
}

impl DockerCli {
    /// Use `program` as given, leaving PATH lookup to process spawning.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve `program` on PATH, failing if it is not installed.
    pub fn locate(program: &str) -> Result<Self> {
        let path =
            which::which(program).map_err(|_| LaunchError::RuntimeNotFound(program.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }
}

impl ContainerRuntime for DockerCli {
    fn inspect_image(&self, image: &str) -> Option<ImageMetadata> {
        let output = self
            .command(&invocation::inspect_args(image))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output();

        let output = match output {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                tracing::debug!(image, status = %o.status, "image inspect failed");
                return None;
            }
            Err(e) => {
                tracing::debug!(image, error = %e, "could not run image inspect");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match ImageMetadata::from_labels_json(&stdout) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!(image, error = %e, "unreadable image labels");
                None
            }
        }
    }

    fn build(&self, request: &BuildRequest) -> Result<()> {
        let args = invocation::build_args(request);
        tracing::info!(program = %self.program.display(), ?args, "building image");
        let status = self.command(&args).status()?;
        if !status.success() {
            return Err(LaunchError::RuntimeFailed {
                action: "build",
                code: exit_code(status),
            });
        }
        Ok(())
    }

    fn run(&self, plan: &LaunchPlan) -> Result<i32> {
        let args = invocation::run_args(plan);
        tracing::info!(program = %self.program.display(), ?args, "running container");
        let status = self.command(&args).status()?;
        Ok(exit_code(status))
    }
}

/// Exit code of a finished process; signals map to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}
