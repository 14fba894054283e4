use crate::errors::Result;
use crate::git::CommandOutput;
use std::path::Path;
use std::process::Command;

#[cfg(test)]
use std::collections::HashMap;

pub trait CommandRunner {
    /// Run `program` with `args` inside `workdir` and wait for it to finish.
    fn run(&self, workdir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs commands as child processes, without a shell.
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, workdir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|e| {
                log::error!("Failed to execute {}: {}", program, e);
                e
            })?;

        Ok(output.into())
    }
}

/// Pretends every command succeeded without running it.
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, _workdir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        log::info!("[dry run] skipped {} {}", program, args.join(" "));
        Ok(CommandOutput::succeeded())
    }
}

#[cfg(test)]
pub struct MockRunner {
    pub failures: HashMap<String, CommandOutput>,
    pub executed: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockRunner {
    pub fn new() -> Self {
        Self {
            failures: HashMap::new(),
            executed: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Make the given command line (e.g. `git cherry-pick abc`) exit with 1.
    pub fn fail_on(mut self, command_line: &str) -> Self {
        self.failures.insert(
            command_line.to_string(),
            CommandOutput::failed(1, format!("error: {} failed", command_line)),
        );
        self
    }

    pub fn get_executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl CommandRunner for MockRunner {
    fn run(&self, _workdir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let line = format!("{} {}", program, args.join(" "));
        self.executed.lock().unwrap().push(line.clone());
        Ok(self
            .failures
            .get(&line)
            .cloned()
            .unwrap_or_else(CommandOutput::succeeded))
    }
}
