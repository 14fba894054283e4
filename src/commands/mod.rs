pub mod publish;
pub mod show;

use crate::config::{GitDefaults, Overrides, Plan, Policy, Settings};
use crate::errors::{PickpushError, Result};
use clap::Args;
use git2::Repository;
use std::path::{Path, PathBuf};

/// Options shared by every command that reads a plan.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Plan file: `.json`, or the text format (`-> branch` followed by commit ids)
    pub plan: PathBuf,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "directory", default_value = ".")]
    pub directory: PathBuf,

    /// Branch every new branch starts from [default: pickpush.baseBranch or master]
    #[arg(long)]
    pub base: Option<String>,

    /// Remote to publish to [default: pickpush.remote or origin]
    #[arg(long)]
    pub remote: Option<String>,
}

/// Everything a command needs once the repository and plan are known.
pub struct Context {
    pub repo: Repository,
    pub workdir: PathBuf,
    pub plan: Plan,
    pub settings: Settings,
}

impl PlanArgs {
    pub fn load(&self, policy: Policy) -> Result<Context> {
        let (repo, workdir) = open_repository(&self.directory)?;

        let plan = Plan::load(&self.plan)?;
        plan.validate()?;

        let overrides = Overrides {
            base_branch: self.base.clone(),
            remote: self.remote.clone(),
        };
        let defaults = GitDefaults::from_repository(&repo)?;
        let settings = Settings::resolve(&overrides, &plan, &defaults, policy);
        settings.validate()?;

        log::debug!("Resolved settings: {:?}", settings);

        Ok(Context {
            repo,
            workdir,
            plan,
            settings,
        })
    }
}

fn open_repository(directory: &Path) -> Result<(Repository, PathBuf)> {
    let repo = Repository::discover(directory).map_err(|e| {
        log::error!("No git repository found from {}", directory.display());
        e
    })?;

    let workdir = repo
        .workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| PickpushError::BareRepository(repo.path().to_path_buf()))?;

    Ok((repo, workdir))
}
