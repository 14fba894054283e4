use serde::Serialize;
use std::fmt;

/// The git operations a publish run performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    /// Switch to an existing branch.
    Checkout { reference: String },
    /// Create a branch at the current commit and switch to it.
    CheckoutNew { branch: String },
    CherryPick { commit: String },
    CherryPickAbort,
    /// Publish the current branch and track the same-named remote branch.
    PushSetUpstream { remote: String, branch: String },
}

impl GitCommand {
    pub fn args(&self) -> Vec<&str> {
        match self {
            GitCommand::Checkout { reference } => vec!["checkout", reference],
            GitCommand::CheckoutNew { branch } => vec!["checkout", "-b", branch],
            GitCommand::CherryPick { commit } => vec!["cherry-pick", commit],
            GitCommand::CherryPickAbort => vec!["cherry-pick", "--abort"],
            GitCommand::PushSetUpstream { remote, branch } => {
                vec!["push", "--set-upstream", remote, branch]
            }
        }
    }
}

impl fmt::Display for GitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.args().join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Exit code, or -1 when the process was terminated by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn succeeded() -> Self {
        Self {
            status: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    #[cfg(test)]
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
