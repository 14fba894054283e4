pub mod runner;
pub mod types;

pub use runner::{CommandRunner, DryRunRunner, SystemRunner};
#[cfg(test)]
pub use runner::MockRunner;
pub use types::{CommandOutput, GitCommand};

use crate::errors::Result;
use std::path::PathBuf;

/// A `git` executable bound to one working directory.
///
/// Every mutation of the repository goes through here. Reads that need no
/// side effect use `git2` directly instead.
pub struct Git<R: CommandRunner> {
    runner: R,
    workdir: PathBuf,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one git operation and capture its result.
    ///
    /// A non-zero exit status is returned as a normal `CommandOutput`; only a
    /// failure to launch `git` at all is an error.
    pub fn run(&self, command: &GitCommand) -> Result<CommandOutput> {
        let args = command.args();
        let output = self.runner.run(&self.workdir, "git", &args)?;

        if output.success() {
            log::debug!("{} exited with 0", command);
            log::trace!("{}", output.stdout.trim());
        } else {
            log::debug!(
                "{} exited with {}: {}",
                command,
                output.status,
                output.stderr.trim()
            );
        }

        Ok(output)
    }
}
