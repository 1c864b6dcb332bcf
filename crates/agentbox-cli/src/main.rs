mod install;
mod launch;
mod output;

use agentbox_core::args::split_args;
use agentbox_core::plan::LaunchFlags;
use agentbox_core::LaunchError;
use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser};

const AFTER_HELP: &str = "\
Any argument not listed above is passed to opencode unchanged, in order.
Arguments after `--` are always passed through.

Settings are read from .env in the installation directory, then from the
environment, then from flags (later sources win):
  AGENTBOX_ROOT_NAME       top-level directory inside the container (default: BOX)
  AGENTBOX_PROTECTED_DIRS  extra directories to refuse as workspace, colon-separated
  AGENTBOX_UID, AGENTBOX_GID, AGENTBOX_USER
  AGENTBOX_PACKAGES        extra packages to install in the image
  AGENTBOX_TOOL_VERSION    opencode version to install (default: latest)
  AGENTBOX_CONFIG_DIR      host config directory to mount
  AGENTBOX_SHOW_MOUNTS     print the mount table before starting
  AGENTBOX_IMAGE, AGENTBOX_RUNTIME, AGENTBOX_DRY_RUN";

#[derive(Parser, Debug)]
#[command(
    name = "agentbox",
    about = "Run opencode in a container with the current directory as its workspace",
    disable_help_flag = true,
    args_override_self = true,
    after_help = AFTER_HELP
)]
struct Cli {
    /// Container root name for this run (workspace lands in /NAME/<host>/<dir>)
    #[arg(short = 'n', long = "name", value_name = "NAME", allow_hyphen_values = true)]
    name: Option<String>,

    /// Rebuild the image, pulling the base image and skipping the cache
    #[arg(short, long)]
    update: bool,

    /// Start an interactive bash shell instead of opencode
    #[arg(short, long)]
    bash: bool,

    /// Publish the OAuth callback port on 127.0.0.1
    #[arg(short, long)]
    oauth: bool,

    /// Launch even if the current directory is protected or outside home
    #[arg(short, long)]
    force: bool,

    /// Print this help, then opencode's own help
    #[arg(short, long, action = ArgAction::SetTrue)]
    help: bool,
}

impl Cli {
    fn flags(&self) -> LaunchFlags {
        LaunchFlags {
            update: self.update,
            bash: self.bash,
            oauth: self.oauth,
            force: self.force,
            help: self.help,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = collect_args().and_then(|argv| {
        let split = split_args(argv)?;
        let cli = Cli::parse_from(std::iter::once("agentbox".to_string()).chain(split.launcher));
        if cli.help {
            println!("{}", Cli::command().render_help());
        }
        let flags = cli.flags();
        launch::run(cli.name, flags, split.passthrough)
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(failure_code(&e));
        }
    }
}

fn collect_args() -> anyhow::Result<Vec<String>> {
    std::env::args_os()
        .skip(1)
        .map(|a| {
            a.into_string()
                .map_err(|a| anyhow::anyhow!("argument is not valid UTF-8: {a:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()
        .context("failed to read command line")
}

/// Runtime failures keep the runtime's status; everything else exits 1.
fn failure_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| match cause.downcast_ref::<LaunchError>() {
            Some(LaunchError::RuntimeFailed { code, .. }) if *code != 0 => Some(*code),
            _ => None,
        })
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("agentbox").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_and_long_flags() {
        let cli = parse(&["-u", "--bash", "-o", "--force", "-n", "WORK"]);
        assert!(cli.update && cli.bash && cli.oauth && cli.force);
        assert!(!cli.help);
        assert_eq!(cli.name.as_deref(), Some("WORK"));
    }

    #[test]
    fn last_name_wins() {
        let cli = parse(&["--name=A", "-n", "B"]);
        assert_eq!(cli.name.as_deref(), Some("B"));
    }

    #[test]
    fn help_sets_mode() {
        let cli = parse(&["-h"]);
        assert!(cli.help);
        assert_eq!(
            cli.flags().mode(),
            agentbox_core::plan::Mode::Help
        );
    }

    #[test]
    fn runtime_failure_keeps_status() {
        let err = anyhow::Error::new(LaunchError::RuntimeFailed {
            action: "build",
            code: 17,
        })
        .context("launch failed");
        assert_eq!(failure_code(&err), 17);

        let other = anyhow::anyhow!("nope");
        assert_eq!(failure_code(&other), 1);
    }
}
