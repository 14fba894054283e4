use crate::{
    commands::PlanArgs,
    config::{BranchTask, Policy, Settings},
    core::{Publisher, Report},
    errors::{PickpushError, Result},
    git::{CommandRunner, DryRunRunner, Git, SystemRunner},
};
use clap::Args;
use std::io::Write;

/// Output stream for the `$ git …` trace and banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStream {
    Stdout,
    Stderr,
}

impl TraceStream {
    fn writer(self) -> Box<dyn Write> {
        match self {
            TraceStream::Stdout => Box::new(std::io::stdout().lock()),
            TraceStream::Stderr => Box::new(std::io::stderr().lock()),
        }
    }
}

#[derive(Debug, Args)]
pub struct Publish {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Keep going after a failed checkout or push and always exit with 0
    #[arg(long)]
    pub lenient: bool,

    /// Print the git commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report of every branch after the run
    #[arg(long)]
    pub json: bool,
}

impl Publish {
    pub fn policy(&self) -> Policy {
        if self.lenient {
            Policy::Lenient
        } else {
            Policy::Strict
        }
    }

    /// Stdout is kept free for the JSON report when one is requested.
    pub fn trace_stream(&self) -> TraceStream {
        if self.json {
            TraceStream::Stderr
        } else {
            TraceStream::Stdout
        }
    }

    pub fn execute(&self) -> Result<()> {
        let policy = self.policy();
        let context = self.plan.load(policy)?;

        log::info!(
            "Publishing {} branch(es) from '{}' to '{}'",
            context.plan.tasks.len(),
            context.settings.base_branch,
            context.settings.remote
        );

        let report = if self.dry_run {
            publish_with(
                Git::new(DryRunRunner, &context.workdir),
                &context.settings,
                &context.plan.tasks,
                self.trace_stream(),
            )?
        } else {
            publish_with(
                Git::new(SystemRunner::new(), &context.workdir),
                &context.settings,
                &context.plan.tasks,
                self.trace_stream(),
            )?
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        let failed = report.failed();
        if failed > 0 && policy == Policy::Strict {
            return Err(PickpushError::TasksFailed {
                failed,
                total: report.tasks.len(),
            });
        }

        Ok(())
    }
}

fn publish_with<R: CommandRunner>(
    git: Git<R>,
    settings: &Settings,
    tasks: &[BranchTask],
    trace: TraceStream,
) -> Result<Report> {
    let mut publisher = Publisher::new(&git, settings, trace.writer());
    publisher.publish_all(tasks)
}
