//! Layered launcher settings.
//!
//! Values come from an ordered list of layers (settings file, process
//! environment, command-line flags). Lookup folds over the layers from lowest
//! to highest precedence and the last non-empty value wins.

use crate::error::{LaunchError, Result};
use crate::paths;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub const ROOT_NAME: &str = "AGENTBOX_ROOT_NAME";
pub const PROTECTED_DIRS: &str = "AGENTBOX_PROTECTED_DIRS";
pub const UID: &str = "AGENTBOX_UID";
pub const GID: &str = "AGENTBOX_GID";
pub const USER: &str = "AGENTBOX_USER";
pub const PACKAGES: &str = "AGENTBOX_PACKAGES";
pub const TOOL_VERSION: &str = "AGENTBOX_TOOL_VERSION";
pub const CONFIG_DIR: &str = "AGENTBOX_CONFIG_DIR";
pub const SHOW_MOUNTS: &str = "AGENTBOX_SHOW_MOUNTS";
pub const IMAGE: &str = "AGENTBOX_IMAGE";
pub const RUNTIME: &str = "AGENTBOX_RUNTIME";
pub const DRY_RUN: &str = "AGENTBOX_DRY_RUN";

// ---------------------------------------------------------------------------
// SettingsLayer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SettingsLayer {
    name: &'static str,
    values: BTreeMap<String, String>,
}

impl SettingsLayer {
    pub fn new<I, K, V>(name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Highest-precedence non-empty value for `key`.
pub fn lookup<'a>(layers: &'a [SettingsLayer], key: &str) -> Option<&'a str> {
    layers.iter().fold(None, |found, layer| match layer.get(key) {
        Some(value) if !value.trim().is_empty() => {
            tracing::trace!(key, layer = layer.name(), "setting found");
            Some(value)
        }
        _ => found,
    })
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DryRun {
    #[default]
    Off,
    /// Print the runtime commands instead of running them.
    Commands,
    /// Print the whole launch plan as JSON.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub root_name: String,
    /// Extra protected directories, in addition to the home directory.
    pub protected_dirs: Vec<PathBuf>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub container_user: String,
    pub packages: String,
    pub tool_version: String,
    pub config_dir: Option<PathBuf>,
    pub show_mounts: bool,
    pub image: String,
    pub runtime: String,
    pub dry_run: DryRun,
}

impl Settings {
    pub fn resolve(layers: &[SettingsLayer], home: &Path) -> Result<Self> {
        let get = |key: &str| lookup(layers, key).map(str::trim);

        let root_name = get(ROOT_NAME).unwrap_or(paths::DEFAULT_ROOT_NAME).to_string();
        validate_root_name(&root_name)?;

        Ok(Self {
            root_name,
            protected_dirs: get(PROTECTED_DIRS)
                .map(|raw| parse_protected_dirs(raw, home))
                .unwrap_or_default(),
            uid: get(UID).map(|v| parse_id(UID, v)).transpose()?,
            gid: get(GID).map(|v| parse_id(GID, v)).transpose()?,
            container_user: get(USER)
                .unwrap_or(paths::DEFAULT_CONTAINER_USER)
                .to_string(),
            packages: get(PACKAGES).unwrap_or_default().to_string(),
            tool_version: get(TOOL_VERSION)
                .unwrap_or(paths::DEFAULT_TOOL_VERSION)
                .to_string(),
            config_dir: get(CONFIG_DIR).and_then(|raw| absolute_or_warn(CONFIG_DIR, raw, home)),
            show_mounts: get(SHOW_MOUNTS).is_some_and(parse_bool),
            image: get(IMAGE).unwrap_or(paths::DEFAULT_IMAGE).to_string(),
            runtime: get(RUNTIME).unwrap_or(paths::DEFAULT_RUNTIME).to_string(),
            dry_run: get(DRY_RUN).map(parse_dry_run).unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

static ROOT_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn root_name_re() -> &'static Regex {
    ROOT_NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap())
}

/// A root name is one path segment of `[A-Za-z0-9._-]`, other than `.` or `..`.
pub fn validate_root_name(name: &str) -> Result<()> {
    if matches!(name, "." | "..") || !root_name_re().is_match(name) {
        return Err(LaunchError::InvalidRootName(name.to_string()));
    }
    Ok(())
}

pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_dry_run(raw: &str) -> DryRun {
    if raw.eq_ignore_ascii_case("json") {
        DryRun::Json
    } else if parse_bool(raw) {
        DryRun::Commands
    } else {
        DryRun::Off
    }
}

fn parse_id(key: &str, raw: &str) -> Result<u32> {
    raw.parse().map_err(|_| LaunchError::InvalidId {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Split a colon-separated list, expanding `~`, resolving symlinks and
/// dropping relative entries.
fn parse_protected_dirs(raw: &str, home: &Path) -> Vec<PathBuf> {
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| absolute_or_warn(PROTECTED_DIRS, s, home))
        .collect()
}

fn absolute_or_warn(key: &str, raw: &str, home: &Path) -> Option<PathBuf> {
    let path = paths::expand_home(raw, home);
    if path.is_absolute() {
        Some(paths::resolve_symlinks(&path))
    } else {
        tracing::warn!("ignoring relative path '{raw}' in {key}");
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
