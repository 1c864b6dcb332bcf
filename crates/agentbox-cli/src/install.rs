use agentbox_core::paths::DOCKERFILE;
use agentbox_core::{LaunchError, Result};
use std::path::{Path, PathBuf};

/// Resolve the installation directory (the one holding the Dockerfile and
/// the settings file).
///
/// Priority:
/// 1. `AGENTBOX_INSTALL_DIR` (passed in as `explicit`), which must exist
/// 2. Walk upward from the running executable looking for `Dockerfile`
pub fn resolve_install_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if !p.is_dir() {
            return Err(LaunchError::InstallDirInvalid(p.to_path_buf()));
        }
        return Ok(p.to_path_buf());
    }

    let exe = std::env::current_exe()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .and_then(find_upward)
        .ok_or(LaunchError::InstallDirNotFound)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(DOCKERFILE).is_file())
        .map(Path::to_path_buf)
}
