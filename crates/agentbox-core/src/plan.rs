//! Launch planning: from an environment snapshot and resolved settings to a
//! complete, immutable [`LaunchPlan`].

use crate::env::Environment;
use crate::error::{LaunchError, Result};
use crate::gate::{self, GateViolation, Verdict};
use crate::mounts::{self, Mount, MountKind};
use crate::paths;
use crate::rebuild::{self, ImageIdentity, RebuildDecision};
use crate::runtime::{BuildRequest, ContainerRuntime};
use crate::settings::Settings;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Run,
    Bash,
    /// Run, with the launcher's usage printed first.
    Help,
}

impl Mode {
    /// Entrypoint override; `None` keeps the image's default (the wrapped tool).
    pub fn entrypoint(&self) -> Option<&'static str> {
        match self {
            Mode::Bash => Some("/bin/bash"),
            Mode::Run | Mode::Help => None,
        }
    }
}

/// Launcher switches taken from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchFlags {
    pub update: bool,
    pub bash: bool,
    pub oauth: bool,
    pub force: bool,
    pub help: bool,
}

impl LaunchFlags {
    pub fn mode(&self) -> Mode {
        if self.bash {
            Mode::Bash
        } else if self.help {
            Mode::Help
        } else {
            Mode::Run
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub workspace_dir: PathBuf,
    pub container_root_name: String,
    pub hostname: String,
    pub workspace_name: String,
    pub container_workdir: PathBuf,
    pub uid: u32,
    pub gid: u32,
    pub container_user: String,
    pub mode: Mode,
    pub force: bool,
    pub oauth: bool,
    pub protected_dirs: Vec<PathBuf>,
    /// Gate failure that `--force` overrode, if any.
    pub bypassed: Option<GateViolation>,
    pub mounts: Vec<Mount>,
    pub image: String,
    pub rebuild: RebuildDecision,
    pub build: BuildRequest,
    pub env_file: PathBuf,
    pub show_mounts: bool,
    pub passthrough_args: Vec<String>,
}

pub struct PlanRequest<'a> {
    pub env: &'a Environment,
    pub settings: &'a Settings,
    pub flags: LaunchFlags,
    pub install_dir: &'a Path,
    pub settings_file: &'a Path,
    pub passthrough: Vec<String>,
}

/// Build the launch plan.
///
/// The safety gate is evaluated before the runtime is consulted, so a
/// rejected workspace never reaches the container runtime.
pub fn plan(req: PlanRequest<'_>, runtime: &dyn ContainerRuntime) -> Result<LaunchPlan> {
    let PlanRequest {
        env,
        settings,
        flags,
        install_dir,
        settings_file,
        passthrough,
    } = req;

    let protected_dirs = protected_dirs(&env.home, &settings.protected_dirs);
    let bypassed = match gate::evaluate(&env.cwd, &env.home, &protected_dirs, flags.force) {
        Verdict::Pass => None,
        Verdict::Rejected(violation) => return Err(LaunchError::Unsafe(violation)),
        Verdict::Bypassed(violation) => {
            tracing::warn!("{violation}; continuing because --force was given");
            Some(violation)
        }
    };

    let uid = settings.uid.unwrap_or(env.uid);
    let gid = settings.gid.unwrap_or(env.gid);
    let workspace_name = paths::workspace_name(&env.cwd);
    let container_workdir =
        paths::container_workdir(&settings.root_name, &env.hostname, &workspace_name);

    let mounts = mounts::assemble(
        &env.cwd,
        &container_workdir,
        &env.home,
        &settings.container_user,
        settings.config_dir.as_deref(),
    );

    let identity = ImageIdentity {
        uid,
        gid,
        root_name: &settings.root_name,
        user: &settings.container_user,
    };
    let existing = runtime.inspect_image(&settings.image);
    let rebuild = rebuild::decide(existing.as_ref(), &identity, flags.update);
    if rebuild.needed {
        tracing::debug!(image = %settings.image, reason = %rebuild.reason(), "rebuild needed");
    }

    let build = BuildRequest {
        image: settings.image.clone(),
        context: install_dir.to_path_buf(),
        dockerfile: paths::dockerfile_path(install_dir),
        build_args: vec![
            ("USER_UID".into(), uid.to_string()),
            ("USER_GID".into(), gid.to_string()),
            ("USERNAME".into(), settings.container_user.clone()),
            ("ROOT_NAME".into(), settings.root_name.clone()),
            ("PACKAGES".into(), settings.packages.clone()),
            ("TOOL_VERSION".into(), settings.tool_version.clone()),
        ],
        labels: identity.labels(),
        refresh: rebuild.refresh,
    };

    Ok(LaunchPlan {
        workspace_dir: env.cwd.clone(),
        container_root_name: settings.root_name.clone(),
        hostname: env.hostname.clone(),
        workspace_name,
        container_workdir,
        uid,
        gid,
        container_user: settings.container_user.clone(),
        mode: flags.mode(),
        force: flags.force,
        oauth: flags.oauth,
        protected_dirs,
        bypassed,
        mounts,
        image: settings.image.clone(),
        rebuild,
        build,
        env_file: settings_file.to_path_buf(),
        show_mounts: settings.show_mounts,
        passthrough_args: passthrough,
    })
}

/// Carry out a plan: prepare host directories, rebuild if needed, then run.
///
/// Returns the exit status of the container. A failed build aborts before
/// the run is attempted.
pub fn execute(plan: &LaunchPlan, runtime: &dyn ContainerRuntime) -> Result<i32> {
    for mount in &plan.mounts {
        if matches!(mount.kind, MountKind::Data | MountKind::State) {
            crate::io::ensure_dir(&mount.host)?;
        }
    }
    if plan.rebuild.needed {
        runtime.build(&plan.build)?;
    }
    runtime.run(plan)
}

/// Home first, then configured extras, without duplicates.
fn protected_dirs(home: &Path, extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = vec![paths::normalize(home)];
    for dir in extra {
        let dir = paths::normalize(dir);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
