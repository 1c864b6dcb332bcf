use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LABEL_UID: &str = "agentbox.uid";
pub const LABEL_GID: &str = "agentbox.gid";
pub const LABEL_ROOT_NAME: &str = "agentbox.root-name";
pub const LABEL_USER: &str = "agentbox.user";

/// Labels read back from an existing image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub labels: BTreeMap<String, String>,
}

impl ImageMetadata {
    /// Parse the output of `inspect --format '{{json .Config.Labels}}'`.
    ///
    /// An image without labels prints `null`, which yields empty metadata.
    pub fn from_labels_json(raw: &str) -> serde_json::Result<Self> {
        let labels: Option<BTreeMap<String, String>> = serde_json::from_str(raw.trim())?;
        Ok(Self {
            labels: labels.unwrap_or_default(),
        })
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Build parameters baked into the image. Any difference from the labels on
/// the existing image means the image is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageIdentity<'a> {
    pub uid: u32,
    pub gid: u32,
    pub root_name: &'a str,
    pub user: &'a str,
}

impl ImageIdentity<'_> {
    /// `(label, description, value)` for every recorded parameter.
    fn fields(&self) -> [(&'static str, &'static str, String); 4] {
        [
            (LABEL_UID, "uid", self.uid.to_string()),
            (LABEL_GID, "gid", self.gid.to_string()),
            (LABEL_ROOT_NAME, "root name", self.root_name.to_string()),
            (LABEL_USER, "user", self.user.to_string()),
        ]
    }

    /// Labels to attach when building.
    pub fn labels(&self) -> Vec<(String, String)> {
        self.fields()
            .into_iter()
            .map(|(label, _, value)| (label.to_string(), value))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildDecision {
    pub needed: bool,
    pub reasons: Vec<String>,
    /// Pull the base image and bypass the layer cache.
    pub refresh: bool,
}

impl RebuildDecision {
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }
}

/// Decide whether the image must be rebuilt before running.
///
/// `existing` is `None` whenever the image metadata could not be read, which
/// counts the same as "no image". A missing label counts as a mismatch.
pub fn decide(
    existing: Option<&ImageMetadata>,
    wanted: &ImageIdentity<'_>,
    update: bool,
) -> RebuildDecision {
    let mut reasons = Vec::new();
    if update {
        reasons.push("update requested".to_string());
    }

    match existing {
        None => reasons.push("no image found".to_string()),
        Some(meta) => {
            for (label, what, value) in wanted.fields() {
                match meta.label(label) {
                    Some(recorded) if recorded == value => {}
                    Some(recorded) => reasons.push(format!(
                        "image {what} '{recorded}' differs from configured {what} '{value}'"
                    )),
                    None => reasons.push(format!("image has no recorded {what}")),
                }
            }
        }
    }

    RebuildDecision {
        needed: !reasons.is_empty(),
        reasons,
        refresh: update,
    }
}
