use crate::{
    config::{BranchTask, Policy, Settings},
    errors::Result,
    git::{CommandOutput, CommandRunner, Git, GitCommand},
};
use serde::Serialize;
use std::fmt;
use std::io::Write;


#[cfg(test)]
mod repo_tests;

/// A step whose failure only matters under [`Policy::Strict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CheckoutBase,
    CreateBranch,
    Push,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CheckoutBase => "checkout of the base branch",
            Step::CreateBranch => "branch creation",
            Step::Push => "push",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Every commit applied and the push was issued. Under
    /// [`Policy::Lenient`], `ignored_failures` lists the steps that failed
    /// but were let through.
    Published {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        ignored_failures: Vec<Step>,
    },
    /// `commit` did not apply; the cherry-pick was aborted and nothing was pushed.
    CherryPickFailed { commit: String, abort_failed: bool },
    StepFailed {
        step: Step,
        status: i32,
        stderr: String,
    },
}

impl TaskOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, TaskOutcome::Published { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub branch: String,
    #[serde(flatten)]
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub policy: Policy,
    pub tasks: Vec<TaskReport>,
}

impl Report {
    pub fn failed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| !task.outcome.is_published())
            .count()
    }
}

/// Builds each branch from the base branch and publishes it.
///
/// Every git invocation is echoed to `out` as `$ git ...` before it runs,
/// followed by the banners and diagnostics of the run.
pub struct Publisher<'a, R: CommandRunner, W: Write> {
    git: &'a Git<R>,
    settings: &'a Settings,
    out: W,
}

impl<'a, R: CommandRunner, W: Write> Publisher<'a, R, W> {
    pub fn new(git: &'a Git<R>, settings: &'a Settings, out: W) -> Self {
        Self { git, settings, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run_command(&mut self, command: &GitCommand) -> Result<CommandOutput> {
        writeln!(self.out, "$ {}", command)?;
        self.out.flush()?;
        self.git.run(command)
    }

    /// Run a step and decide, according to the policy, whether the task can
    /// go on. Returns the failure outcome when it cannot; a failure the
    /// policy lets through is added to `ignored`.
    fn run_step(
        &mut self,
        step: Step,
        command: GitCommand,
        branch_name: &str,
        ignored: &mut Vec<Step>,
    ) -> Result<Option<TaskOutcome>> {
        let output = self.run_command(&command)?;

        if output.success() {
            return Ok(None);
        }

        if self.settings.policy == Policy::Lenient {
            log::warn!(
                "Ignoring failed {} for branch '{}' (exit status {})",
                step,
                branch_name,
                output.status
            );
            ignored.push(step);
            return Ok(None);
        }

        writeln!(self.out, "Error: {} failed for branch {}.", step, branch_name)?;
        Ok(Some(TaskOutcome::StepFailed {
            step,
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        }))
    }

    /// Check out the base branch, create `task.branch_name` there, apply the
    /// commits in the listed order and push the result.
    ///
    /// The first commit that fails to apply is aborted and ends the task
    /// without pushing.
    pub fn publish_branch(&mut self, task: &BranchTask) -> Result<TaskOutcome> {
        let branch_name = task.branch_name.as_str();
        let mut ignored = Vec::new();

        let checkout_base = GitCommand::Checkout {
            reference: self.settings.base_branch.clone(),
        };
        if let Some(failure) = self.run_step(Step::CheckoutBase, checkout_base, branch_name, &mut ignored)? {
            return Ok(failure);
        }

        let create_branch = GitCommand::CheckoutNew {
            branch: branch_name.to_string(),
        };
        if let Some(failure) = self.run_step(Step::CreateBranch, create_branch, branch_name, &mut ignored)? {
            return Ok(failure);
        }

        for commit in &task.commit_ids {
            let result = self.run_command(&GitCommand::CherryPick {
                commit: commit.clone(),
            })?;

            if !result.success() {
                writeln!(self.out, "Error cherry-picking commit {}. Aborting.", commit)?;

                let abort = self.run_command(&GitCommand::CherryPickAbort)?;
                if !abort.success() {
                    log::error!(
                        "❌ Could not abort cherry-pick of {}: {}",
                        commit,
                        abort.stderr.trim()
                    );
                }

                return Ok(TaskOutcome::CherryPickFailed {
                    commit: commit.clone(),
                    abort_failed: !abort.success(),
                });
            }
        }

        let push = GitCommand::PushSetUpstream {
            remote: self.settings.remote.clone(),
            branch: branch_name.to_string(),
        };
        if let Some(failure) = self.run_step(Step::Push, push, branch_name, &mut ignored)? {
            return Ok(failure);
        }

        Ok(TaskOutcome::Published {
            ignored_failures: ignored,
        })
    }

    /// Publish every task in order. A failed task never stops the ones after
    /// it.
    pub fn publish_all(&mut self, tasks: &[BranchTask]) -> Result<Report> {
        let mut reports = Vec::with_capacity(tasks.len());

        for task in tasks {
            writeln!(self.out, "Creating and publishing branch: {}", task.branch_name)?;

            let outcome = self.publish_branch(task)?;
            if outcome.is_published() {
                log::info!("✅ Published '{}'", task.branch_name);
            } else {
                log::warn!("❌ '{}' was not published: {:?}", task.branch_name, outcome);
            }

            reports.push(TaskReport {
                branch: task.branch_name.clone(),
                outcome,
            });
        }

        writeln!(self.out, "Done.")?;

        Ok(Report {
            policy: self.settings.policy,
            tasks: reports,
        })
    }
}
