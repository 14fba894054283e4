use crate::{
    commands::PlanArgs,
    config::{Plan, Policy},
    errors::Result,
    parser::{plan_to_string, Annotations},
};
use clap::Args;
use git2::{BranchType, Repository};

#[derive(Debug, Args)]
pub struct Show {
    #[command(flatten)]
    pub plan: PlanArgs,
}

impl Show {
    pub fn execute(&self) -> Result<()> {
        let context = self.plan.load(Policy::Strict)?;

        let resolved = Plan {
            base_branch: Some(context.settings.base_branch.clone()),
            remote: Some(context.settings.remote.clone()),
            tasks: context.plan.tasks.clone(),
        };
        let annotations = annotate(&context.repo, &resolved);

        print!("{}", plan_to_string(&resolved, &annotations));
        Ok(())
    }
}

/// Look up commit summaries and already existing branches. Anything that
/// cannot be resolved is simply left out.
pub fn annotate(repo: &Repository, plan: &Plan) -> Annotations {
    let mut annotations = Annotations::default();

    for task in &plan.tasks {
        if repo.find_branch(&task.branch_name, BranchType::Local).is_ok() {
            annotations.existing_branches.insert(task.branch_name.clone());
        }

        for id in &task.commit_ids {
            let summary = repo
                .revparse_single(id)
                .and_then(|object| object.peel_to_commit())
                .ok()
                .and_then(|commit| commit.summary().map(str::to_string));

            match summary {
                Some(summary) => {
                    annotations.summaries.insert(id.clone(), summary);
                }
                None => log::warn!("Commit {} not found in repository", id),
            }
        }
    }

    annotations
}
