use crate::errors::{PickpushError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_BASE_BRANCH: &str = "master";
pub const DEFAULT_REMOTE: &str = "origin";

/// One branch to build: `commit_ids` are cherry-picked onto it in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BranchTask {
    #[serde(rename = "branch")]
    pub branch_name: String,
    #[serde(rename = "commits", default)]
    pub commit_ids: Vec<String>,
}

impl BranchTask {
    #[cfg(test)]
    pub fn new(branch_name: &str, commit_ids: &[&str]) -> Self {
        Self {
            branch_name: branch_name.to_string(),
            commit_ids: commit_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    pub tasks: Vec<BranchTask>,
}

impl Plan {
    /// Load a plan file. `.json` files are JSON, anything else uses the text
    /// plan format.
    pub fn load(path: &Path) -> Result<Plan> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            log::error!("Cannot read plan file {}: {}", path.display(), e);
            e
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let plan = if is_json {
            serde_json::from_str(&content)?
        } else {
            crate::parser::plan_from_string(&content)?
        };

        log::debug!("Loaded {} task(s) from {}", plan.tasks.len(), path.display());
        Ok(plan)
    }

    /// Reject plans that would make git fail in confusing ways halfway
    /// through a run.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for task in &self.tasks {
            let name = &task.branch_name;

            if is_option_like(name)
                || !git2::Reference::is_valid_name(&format!("refs/heads/{}", name))
            {
                return Err(PickpushError::InvalidPlan(format!(
                    "'{}' is not a valid branch name",
                    name
                )));
            }

            if !seen.insert(name.as_str()) {
                return Err(PickpushError::InvalidPlan(format!(
                    "branch '{}' appears more than once",
                    name
                )));
            }

            for id in &task.commit_ids {
                if id.is_empty() || is_option_like(id) || id.chars().any(char::is_whitespace) {
                    return Err(PickpushError::InvalidPlan(format!(
                        "branch '{}' has an invalid commit identifier '{}'",
                        name, id
                    )));
                }
            }

            if task.commit_ids.is_empty() {
                log::warn!("Branch '{}' has no commits, it will mirror the base branch", name);
            }
        }

        Ok(())
    }
}

/// Git would read these as command-line options rather than names.
fn is_option_like(value: &str) -> bool {
    value.starts_with('-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Any failed checkout, branch creation or push ends the task.
    Strict,
    /// Only cherry-pick failures are acted on; other results are ignored.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_branch: String,
    pub remote: String,
    pub policy: Policy,
}

/// Values read from the `pickpush` section of git config.
#[derive(Debug, Clone, Default)]
pub struct GitDefaults {
    pub base_branch: Option<String>,
    pub remote: Option<String>,
}

impl GitDefaults {
    pub fn from_repository(repo: &git2::Repository) -> Result<Self> {
        let config = repo.config()?.snapshot()?;
        Ok(Self {
            base_branch: config.get_string("pickpush.baseBranch").ok(),
            remote: config.get_string("pickpush.remote").ok(),
        })
    }
}

/// Settings explicitly given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_branch: Option<String>,
    pub remote: Option<String>,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        for (what, value) in [("base branch", &self.base_branch), ("remote", &self.remote)] {
            if value.is_empty() || is_option_like(value) {
                return Err(PickpushError::InvalidPlan(format!(
                    "'{}' is not a valid {}",
                    value, what
                )));
            }
        }
        Ok(())
    }

    /// Command line wins over the plan file, which wins over git config.
    pub fn resolve(
        overrides: &Overrides,
        plan: &Plan,
        defaults: &GitDefaults,
        policy: Policy,
    ) -> Self {
        let pick = |cli: &Option<String>, file: &Option<String>, git: &Option<String>, fallback: &str| {
            cli.clone()
                .or_else(|| file.clone())
                .or_else(|| git.clone())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            base_branch: pick(
                &overrides.base_branch,
                &plan.base_branch,
                &defaults.base_branch,
                DEFAULT_BASE_BRANCH,
            ),
            remote: pick(
                &overrides.remote,
                &plan.remote,
                &defaults.remote,
                DEFAULT_REMOTE,
            ),
            policy,
        }
    }
}
