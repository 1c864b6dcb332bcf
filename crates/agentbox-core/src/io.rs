use crate::error::{LaunchError, Result};
use crate::paths;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Make sure `<install>/.env` exists, seeding it from `.env.example`.
///
/// Returns the settings file path. An existing settings file is never touched.
pub fn bootstrap_settings(install_dir: &Path) -> Result<PathBuf> {
    let settings = paths::settings_path(install_dir);
    if settings.is_file() {
        return Ok(settings);
    }
    let template = paths::settings_template_path(install_dir);
    if !template.is_file() {
        return Err(LaunchError::SettingsMissing { settings, template });
    }
    let data = std::fs::read(&template)?;
    atomic_write(&settings, &data)?;
    tracing::info!(
        settings = %settings.display(),
        "created settings file from template"
    );
    Ok(settings)
}

/// Parse a dotenv-style settings file into ordered key/value pairs.
pub fn read_settings(path: &Path) -> Result<Vec<(String, String)>> {
    let entries = dotenvy::from_path_iter(path)?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/settings");
        atomic_write(&path, b"data").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
    }

    #[test]
    fn bootstrap_copies_template() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env.example"), "AGENTBOX_USER=agent\n").unwrap();

        let settings = bootstrap_settings(dir.path()).unwrap();
        assert_eq!(settings, dir.path().join(".env"));
        assert_eq!(
            std::fs::read_to_string(&settings).unwrap(),
            "AGENTBOX_USER=agent\n"
        );
    }

    #[test]
    fn bootstrap_keeps_existing_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env"), "AGENTBOX_USER=me\n").unwrap();
        std::fs::write(dir.path().join(".env.example"), "AGENTBOX_USER=agent\n").unwrap();

        let settings = bootstrap_settings(dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(settings).unwrap(),
            "AGENTBOX_USER=me\n"
        );
    }

    #[test]
    fn bootstrap_without_template_fails() {
        let dir = TempDir::new().unwrap();
        let err = bootstrap_settings(dir.path()).unwrap_err();
        assert!(matches!(err, LaunchError::SettingsMissing { .. }));
    }

    #[test]
    fn read_settings_skips_comments_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# launcher settings\nAGENTBOX_ROOT_NAME=BOX\n\nAGENTBOX_PACKAGES=\"ripgrep jq\"\n",
        )
        .unwrap();

        let entries = read_settings(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                ("AGENTBOX_ROOT_NAME".to_string(), "BOX".to_string()),
                ("AGENTBOX_PACKAGES".to_string(), "ripgrep jq".to_string()),
            ]
        );
    }
}
