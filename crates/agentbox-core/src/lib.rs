pub mod args;
pub mod env;
pub mod error;
pub mod gate;
pub mod invocation;
pub mod io;
pub mod mounts;
pub mod paths;
pub mod plan;
pub mod rebuild;
pub mod runtime;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use error::{LaunchError, Result};
