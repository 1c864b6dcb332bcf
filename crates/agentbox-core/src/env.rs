use crate::error::{LaunchError, Result};
use crate::io;
use crate::paths;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the planner reads from the host, captured once at startup.
///
/// Planning functions take this by reference and never consult the process
/// environment, the filesystem or the current directory on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub cwd: PathBuf,
    pub home: PathBuf,
    pub hostname: String,
    pub uid: u32,
    pub gid: u32,
    /// Process environment variables (non-UTF-8 entries are dropped).
    pub vars: BTreeMap<String, String>,
    /// Entries of the settings file, in file order.
    pub file_settings: Vec<(String, String)>,
}

impl Environment {
    pub fn capture(settings_file: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(LaunchError::CurrentDir)?;
        let home = home::home_dir()
            .filter(|h| !h.as_os_str().is_empty())
            .ok_or(LaunchError::HomeNotFound)?;
        let home = paths::resolve_symlinks(&home);
        let hostname = hostname()?;
        let uid = nix::unistd::getuid().as_raw();
        let gid = nix::unistd::getgid().as_raw();
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        let file_settings = io::read_settings(settings_file)?;

        tracing::debug!(
            cwd = %cwd.display(),
            home = %home.display(),
            %hostname,
            uid,
            gid,
            "captured environment"
        );

        Ok(Self {
            cwd,
            home,
            hostname,
            uid,
            gid,
            vars,
            file_settings,
        })
    }
}

fn hostname() -> Result<String> {
    let raw = nix::unistd::gethostname().map_err(|e| LaunchError::Hostname(e.to_string()))?;
    let name = raw
        .into_string()
        .map_err(|raw| LaunchError::Hostname(format!("not valid UTF-8: {raw:?}")))?;
    if name.trim().is_empty() {
        return Err(LaunchError::Hostname("hostname is empty".into()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn capture_reads_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "AGENTBOX_ROOT_NAME=WORKSPACE\n").unwrap();

        let env = Environment::capture(&path).unwrap();
        assert_eq!(
            env.file_settings,
            vec![("AGENTBOX_ROOT_NAME".to_string(), "WORKSPACE".to_string())]
        );
        assert!(!env.hostname.is_empty());
        assert!(env.cwd.is_absolute());
        assert!(env.home.is_absolute());
    }

    #[test]
    fn capture_fails_without_settings_file() {
        let dir = TempDir::new().unwrap();
        assert!(Environment::capture(&dir.path().join(".env")).is_err());
    }
}
