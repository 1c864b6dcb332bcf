use crate::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MountKind {
    Workspace,
    Config,
    Data,
    State,
}

impl MountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountKind::Workspace => "workspace",
            MountKind::Config => "config",
            MountKind::Data => "data",
            MountKind::State => "state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mount {
    pub kind: MountKind,
    pub host: PathBuf,
    pub container: PathBuf,
}

impl Mount {
    /// `host:container`, as passed to `-v`.
    pub fn volume_spec(&self) -> String {
        format!("{}:{}", self.host.display(), self.container.display())
    }
}

/// Mounts in display order: workspace, config (if configured), data, state.
pub fn assemble(
    workspace: &Path,
    container_workdir: &Path,
    home: &Path,
    container_user: &str,
    config_dir: Option<&Path>,
) -> Vec<Mount> {
    let mut mounts = vec![Mount {
        kind: MountKind::Workspace,
        host: workspace.to_path_buf(),
        container: container_workdir.to_path_buf(),
    }];
    if let Some(dir) = config_dir {
        mounts.push(Mount {
            kind: MountKind::Config,
            host: dir.to_path_buf(),
            container: paths::container_config_dir(container_user),
        });
    }
    mounts.push(Mount {
        kind: MountKind::Data,
        host: paths::host_data_dir(home),
        container: paths::container_data_dir(container_user),
    });
    mounts.push(Mount {
        kind: MountKind::State,
        host: paths::host_state_dir(home),
        container: paths::container_state_dir(container_user),
    });
    mounts
}
