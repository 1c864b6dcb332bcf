use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_ROOT_NAME: &str = "BOX";
pub const DEFAULT_CONTAINER_USER: &str = "agent";
pub const DEFAULT_IMAGE: &str = "agentbox:latest";
pub const DEFAULT_RUNTIME: &str = "docker";
pub const DEFAULT_TOOL_VERSION: &str = "latest";

/// Name of the wrapped tool; its XDG directories are mounted under this name.
pub const TOOL_NAME: &str = "opencode";

/// Loopback port the wrapped tool listens on for OAuth callbacks.
pub const OAUTH_CALLBACK_PORT: u16 = 19876;

pub const INSTALL_DIR_ENV: &str = "AGENTBOX_INSTALL_DIR";
pub const SETTINGS_FILE: &str = ".env";
pub const SETTINGS_TEMPLATE: &str = ".env.example";
pub const DOCKERFILE: &str = "Dockerfile";

const DATA_DIR: &str = ".local/share";
const STATE_DIR: &str = ".local/state";
const CONFIG_DIR: &str = ".config";

// ---------------------------------------------------------------------------
// Installation layout
// ---------------------------------------------------------------------------

pub fn settings_path(install_dir: &Path) -> PathBuf {
    install_dir.join(SETTINGS_FILE)
}

pub fn settings_template_path(install_dir: &Path) -> PathBuf {
    install_dir.join(SETTINGS_TEMPLATE)
}

pub fn dockerfile_path(install_dir: &Path) -> PathBuf {
    install_dir.join(DOCKERFILE)
}

// ---------------------------------------------------------------------------
// Host / container directories of the wrapped tool
// ---------------------------------------------------------------------------

pub fn host_data_dir(home: &Path) -> PathBuf {
    home.join(DATA_DIR).join(TOOL_NAME)
}

pub fn host_state_dir(home: &Path) -> PathBuf {
    home.join(STATE_DIR).join(TOOL_NAME)
}

pub fn container_home(user: &str) -> PathBuf {
    PathBuf::from("/home").join(user)
}

pub fn container_config_dir(user: &str) -> PathBuf {
    container_home(user).join(CONFIG_DIR).join(TOOL_NAME)
}

pub fn container_data_dir(user: &str) -> PathBuf {
    container_home(user).join(DATA_DIR).join(TOOL_NAME)
}

pub fn container_state_dir(user: &str) -> PathBuf {
    container_home(user).join(STATE_DIR).join(TOOL_NAME)
}

// ---------------------------------------------------------------------------
// Workspace paths
// ---------------------------------------------------------------------------

/// Final component of the workspace directory, or an empty string for `/`.
pub fn workspace_name(workspace: &Path) -> String {
    workspace
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `/{root_name}/{hostname}/{workspace_name}`.
///
/// Two workspaces with the same base name on one host share a container path.
pub fn container_workdir(root_name: &str, hostname: &str, workspace_name: &str) -> PathBuf {
    PathBuf::from(format!("/{root_name}/{hostname}/{workspace_name}"))
}

/// Drop `.` segments and trailing separators so paths compare segment-wise.
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Resolve symlinks in `path`, falling back to [`normalize`] when the path
/// does not exist or cannot be resolved.
///
/// `current_dir()` is always resolved, so anything compared against it has
/// to be resolved the same way.
pub fn resolve_symlinks(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

/// True when `path` lies below `base` by at least one whole segment.
pub fn is_strictly_within(path: &Path, base: &Path) -> bool {
    let path = normalize(path);
    let base = normalize(base);
    path != base && path.starts_with(&base)
}

/// Expand a leading `~` to `home`. Other paths are returned unchanged.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workdir_is_root_host_and_basename() {
        let name = workspace_name(Path::new("/home/alice/proj"));
        assert_eq!(
            container_workdir("BOX", "helix", &name),
            PathBuf::from("/BOX/helix/proj")
        );
    }

    #[test]
    fn workdir_is_pure() {
        let a = container_workdir("WORKSPACE", "helix", "proj");
        let b = container_workdir("WORKSPACE", "helix", "proj");
        assert_eq!(a, b);
    }

    #[test]
    fn same_basename_collides() {
        let a = workspace_name(Path::new("/home/alice/a/proj"));
        let b = workspace_name(Path::new("/home/alice/b/proj"));
        assert_eq!(
            container_workdir("BOX", "helix", &a),
            container_workdir("BOX", "helix", &b)
        );
    }

    #[test]
    fn workspace_name_of_root_is_empty() {
        assert_eq!(workspace_name(Path::new("/")), "");
    }

    #[test]
    fn containment_is_segment_based() {
        let home = Path::new("/home/alice");
        assert!(is_strictly_within(Path::new("/home/alice/proj"), home));
        assert!(!is_strictly_within(Path::new("/home/alice2"), home));
        assert!(!is_strictly_within(Path::new("/home/alice2/proj"), home));
        assert!(!is_strictly_within(Path::new("/home/alice"), home));
        assert!(!is_strictly_within(Path::new("/home/alice/"), home));
    }

    #[test]
    fn normalize_strips_curdir_and_trailing_slash() {
        assert_eq!(
            normalize(Path::new("/home/./alice/")),
            PathBuf::from("/home/alice")
        );
    }

    #[test]
    fn resolve_symlinks_follows_links() {
        let dir = tempfile::TempDir::new().unwrap();
        let real = dir.path().canonicalize().unwrap().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert_eq!(resolve_symlinks(&link), real);
        assert_eq!(resolve_symlinks(&link.join("./")), real);
    }

    #[test]
    fn resolve_symlinks_keeps_missing_paths() {
        assert_eq!(
            resolve_symlinks(Path::new("/nonexistent/./agentbox/")),
            PathBuf::from("/nonexistent/agentbox")
        );
    }

    #[test]
    fn expand_home_handles_tilde() {
        let home = Path::new("/home/alice");
        assert_eq!(expand_home("~", home), PathBuf::from("/home/alice"));
        assert_eq!(
            expand_home("~/secrets", home),
            PathBuf::from("/home/alice/secrets")
        );
        assert_eq!(expand_home("/srv/data", home), PathBuf::from("/srv/data"));
        assert_eq!(expand_home("~bob", home), PathBuf::from("~bob"));
    }

    #[test]
    fn tool_directories() {
        let home = Path::new("/home/alice");
        assert_eq!(
            host_data_dir(home),
            PathBuf::from("/home/alice/.local/share/opencode")
        );
        assert_eq!(
            container_state_dir("agent"),
            PathBuf::from("/home/agent/.local/state/opencode")
        );
        assert_eq!(
            container_config_dir("agent"),
            PathBuf::from("/home/agent/.config/opencode")
        );
    }
}
