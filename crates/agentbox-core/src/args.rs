//! Split the command line into launcher flags and passthrough arguments.
//!
//! Only the launcher's own flags are handed to the flag parser; every other
//! token is forwarded to the wrapped tool untouched and in its original
//! position relative to the other forwarded tokens.

use crate::error::{LaunchError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Tokens recognized as launcher flags (with their values).
    pub launcher: Vec<String>,
    /// Everything else, verbatim.
    pub passthrough: Vec<String>,
}

const SWITCHES: &[&str] = &[
    "-u", "--update", "-b", "--bash", "-o", "--oauth", "-f", "--force",
];

pub fn split_args<I>(args: I) -> Result<SplitArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut split = SplitArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--" => {
                split.passthrough.push(arg);
                split.passthrough.extend(iter);
                break;
            }
            "-n" | "--name" => {
                let value = iter
                    .next()
                    .ok_or_else(|| LaunchError::MissingFlagValue(arg.clone()))?;
                split.launcher.push(arg);
                split.launcher.push(value);
            }
            // Help is both handled here and forwarded so the tool prints its own.
            "-h" | "--help" => {
                split.launcher.push(arg.clone());
                split.passthrough.push(arg);
            }
            s if s.starts_with("--name=") || SWITCHES.contains(&s) => {
                split.launcher.push(arg);
            }
            _ => split.passthrough.push(arg),
        }
    }

    Ok(split)
}
