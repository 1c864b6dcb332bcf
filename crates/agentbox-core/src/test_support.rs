use crate::env::Environment;
use crate::error::{LaunchError, Result};
use crate::plan::LaunchPlan;
use crate::rebuild::{ImageIdentity, ImageMetadata};
use crate::runtime::{BuildRequest, ContainerRuntime};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Snapshot for alice on host `helix`, uid/gid 1000, sitting in `cwd`.
pub fn environment(cwd: &str) -> Environment {
    Environment {
        cwd: PathBuf::from(cwd),
        home: PathBuf::from("/home/alice"),
        hostname: "helix".to_string(),
        uid: 1000,
        gid: 1000,
        vars: BTreeMap::new(),
        file_settings: Vec::new(),
    }
}

/// Runtime double that records every call instead of touching a container.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    pub image: Option<ImageMetadata>,
    pub build_status: i32,
    pub run_status: i32,
    pub calls: RefCell<Vec<String>>,
}

impl RecordingRuntime {
    /// An existing image built for `uid` and `root_name`, with gid 1000 and
    /// the default container user.
    pub fn with_image(uid: u32, root_name: &str) -> Self {
        let identity = ImageIdentity {
            uid,
            gid: 1000,
            root_name,
            user: crate::paths::DEFAULT_CONTAINER_USER,
        };
        Self {
            image: Some(ImageMetadata {
                labels: identity.labels().into_iter().collect(),
            }),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ContainerRuntime for RecordingRuntime {
    fn inspect_image(&self, image: &str) -> Option<ImageMetadata> {
        self.calls.borrow_mut().push(format!("inspect {image}"));
        self.image.clone()
    }

    fn build(&self, request: &BuildRequest) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("build {}", request.image));
        if self.build_status != 0 {
            return Err(LaunchError::RuntimeFailed {
                action: "build",
                code: self.build_status,
            });
        }
        Ok(())
    }

    fn run(&self, plan: &LaunchPlan) -> Result<i32> {
        self.calls.borrow_mut().push(format!("run {}", plan.image));
        Ok(self.run_status)
    }
}
