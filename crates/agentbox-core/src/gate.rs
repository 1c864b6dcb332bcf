//! Workspace safety gate.
//!
//! A workspace is mounted read-write into the container, so the launcher
//! refuses directories that would expose too much of the host: any protected
//! directory (the home directory itself included) and anything outside the
//! home subtree.

use crate::paths;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateViolation {
    /// The workspace is exactly one of the protected directories.
    ProtectedDirectory { path: PathBuf },
    /// The workspace is not below the home directory.
    OutsideHome { workspace: PathBuf, home: PathBuf },
}

impl fmt::Display for GateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateViolation::ProtectedDirectory { path } => {
                write!(f, "protected directory: {}", path.display())
            }
            GateViolation::OutsideHome { workspace, home } => write!(
                f,
                "outside home: {} is not under {}",
                workspace.display(),
                home.display()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// The gate failed but `--force` was given.
    Bypassed(GateViolation),
    Rejected(GateViolation),
}

/// Check `workspace` against the protected set and the home subtree.
///
/// Protected directories are checked first, so a workspace equal to home
/// reports as protected rather than outside home.
pub fn check(workspace: &Path, home: &Path, protected: &[PathBuf]) -> Result<(), GateViolation> {
    let normalized = paths::normalize(workspace);
    if let Some(hit) = protected
        .iter()
        .find(|p| paths::normalize(p) == normalized)
    {
        return Err(GateViolation::ProtectedDirectory { path: hit.clone() });
    }
    if !paths::is_strictly_within(workspace, home) {
        return Err(GateViolation::OutsideHome {
            workspace: workspace.to_path_buf(),
            home: home.to_path_buf(),
        });
    }
    Ok(())
}

pub fn evaluate(workspace: &Path, home: &Path, protected: &[PathBuf], force: bool) -> Verdict {
    match check(workspace, home, protected) {
        Ok(()) => Verdict::Pass,
        Err(v) if force => Verdict::Bypassed(v),
        Err(v) => Verdict::Rejected(v),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
