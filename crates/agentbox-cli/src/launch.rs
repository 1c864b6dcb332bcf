use crate::install;
use crate::output::{print_json, print_mounts, shell_line};
use agentbox_core::env::Environment;
use agentbox_core::invocation;
use agentbox_core::paths::INSTALL_DIR_ENV;
use agentbox_core::plan::{self, LaunchFlags, LaunchPlan, PlanRequest};
use agentbox_core::runtime::DockerCli;
use agentbox_core::settings::{self, DryRun, Settings, SettingsLayer};
use anyhow::Context;
use std::path::PathBuf;

/// `agentbox [flags] [tool args...]`: plan the launch and hand it to the
/// container runtime.
///
/// Returns the exit status the process should end with.
pub fn run(
    root_name: Option<String>,
    flags: LaunchFlags,
    passthrough: Vec<String>,
) -> anyhow::Result<i32> {
    let explicit = std::env::var_os(INSTALL_DIR_ENV).map(PathBuf::from);
    let install_dir = install::resolve_install_dir(explicit.as_deref())?;
    let settings_file = agentbox_core::io::bootstrap_settings(&install_dir)
        .context("failed to prepare settings file")?;

    let env = Environment::capture(&settings_file).context("failed to read environment")?;

    let layers = [
        SettingsLayer::new("settings file", env.file_settings.iter().cloned()),
        SettingsLayer::new("environment", env.vars.clone()),
        SettingsLayer::new("flags", root_name.map(|n| (settings::ROOT_NAME, n))),
    ];
    let settings = Settings::resolve(&layers, &env.home)?;

    let probe = DockerCli::new(&settings.runtime);
    let plan = plan::plan(
        PlanRequest {
            env: &env,
            settings: &settings,
            flags,
            install_dir: &install_dir,
            settings_file: &settings_file,
            passthrough,
        },
        &probe,
    )?;

    if settings.dry_run == DryRun::Json {
        print_json(&plan)?;
        return Ok(0);
    }

    if plan.show_mounts {
        print_mounts(&plan.mounts);
        println!();
    }

    if settings.dry_run == DryRun::Commands {
        print_commands(&settings.runtime, &plan);
        return Ok(0);
    }

    let runtime = DockerCli::locate(&settings.runtime)?;
    if plan.rebuild.needed {
        eprintln!(
            "Rebuilding image {}: {}",
            plan.image,
            plan.rebuild.reason()
        );
    }

    Ok(plan::execute(&plan, &runtime)?)
}

fn print_commands(program: &str, plan: &LaunchPlan) {
    if plan.rebuild.needed {
        println!("# rebuild: {}", plan.rebuild.reason());
        println!("{}", shell_line(program, &invocation::build_args(&plan.build)));
    }
    println!("{}", shell_line(program, &invocation::run_args(plan)));
}
