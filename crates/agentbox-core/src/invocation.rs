//! Argument vectors for the container runtime CLI.
//!
//! These are pure functions of the plan so the exact command line can be
//! shown in dry-run mode and checked in tests.

use crate::paths::OAUTH_CALLBACK_PORT;
use crate::plan::LaunchPlan;
use crate::runtime::BuildRequest;

pub fn inspect_args(image: &str) -> Vec<String> {
    vec![
        "image".into(),
        "inspect".into(),
        "--format".into(),
        "{{json .Config.Labels}}".into(),
        image.into(),
    ]
}

pub fn build_args(req: &BuildRequest) -> Vec<String> {
    let mut args: Vec<String> = vec!["build".into()];
    if req.refresh {
        args.push("--pull".into());
        args.push("--no-cache".into());
    }
    for (key, value) in &req.build_args {
        args.push("--build-arg".into());
        args.push(format!("{key}={value}"));
    }
    for (key, value) in &req.labels {
        args.push("--label".into());
        args.push(format!("{key}={value}"));
    }
    args.push("-t".into());
    args.push(req.image.clone());
    args.push("-f".into());
    args.push(req.dockerfile.display().to_string());
    args.push(req.context.display().to_string());
    args
}

pub fn run_args(plan: &LaunchPlan) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "run".into(),
        "--rm".into(),
        "-it".into(),
        "--cap-drop".into(),
        "ALL".into(),
        "--security-opt".into(),
        "no-new-privileges".into(),
        "--env-file".into(),
        plan.env_file.display().to_string(),
        "-w".into(),
        plan.container_workdir.display().to_string(),
    ];
    for mount in &plan.mounts {
        args.push("-v".into());
        args.push(mount.volume_spec());
    }
    if plan.oauth {
        args.push("-p".into());
        args.push(format!("127.0.0.1:{OAUTH_CALLBACK_PORT}:{OAUTH_CALLBACK_PORT}"));
    }
    if let Some(entrypoint) = plan.mode.entrypoint() {
        args.push("--entrypoint".into());
        args.push(entrypoint.into());
    }
    args.push(plan.image.clone());
    args.extend(plan.passthrough_args.iter().cloned());
    args
}
