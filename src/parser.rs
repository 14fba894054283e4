// Text plan format

use crate::{
    config::{BranchTask, Plan},
    errors::{PickpushError, Result},
};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Extra information printed alongside a plan.
#[derive(Debug, Default)]
pub struct Annotations {
    /// Commit id -> commit summary.
    pub summaries: HashMap<String, String>,
    /// Branches that already exist in the local repository.
    pub existing_branches: HashSet<String>,
}

pub fn plan_to_string(plan: &Plan, annotations: &Annotations) -> String {
    let mut output = String::default();

    if let Some(base) = &plan.base_branch {
        output = format!("{}base: {}\n", output, base);
    }
    if let Some(remote) = &plan.remote {
        output = format!("{}remote: {}\n", output, remote);
    }

    for task in &plan.tasks {
        output = format!("{}\n-> {}\n", output, task.branch_name);
        if annotations.existing_branches.contains(&task.branch_name) {
            output = format!("{}# branch already exists locally\n", output);
        }
        for id in &task.commit_ids {
            match annotations.summaries.get(id) {
                Some(summary) => output = format!("{}{} {}\n", output, id, summary),
                None => output = format!("{}{}\n", output, id),
            }
        }
    }
    output
}

pub fn plan_from_string(input: &str) -> Result<Plan> {
    let setting_re = Regex::new(r"^(?P<key>base|remote):\s*(?P<value>\S+)$")?;
    let branch_re = Regex::new(r"^->\s*(?P<branch>\S+)$")?;
    // Any revision git accepts (full or abbreviated id, `HEAD~1`, `origin/fix`),
    // but never something git would take for an option.
    let commit_re = Regex::new(r"^(?P<commit>[^\s\-]\S*)(?:\s+(?P<title>.+))?$")?;

    let mut plan = Plan::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        let line_number = index + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = setting_re.captures(line) {
            if !plan.tasks.is_empty() {
                return Err(PickpushError::Parse {
                    line: line_number,
                    message: format!("'{}' must come before the first branch", &caps["key"]),
                });
            }
            let value = Some(caps["value"].to_string());
            match &caps["key"] {
                "base" => plan.base_branch = value,
                _ => plan.remote = value,
            }
        } else if let Some(caps) = branch_re.captures(line) {
            plan.tasks.push(BranchTask {
                branch_name: caps["branch"].to_string(),
                commit_ids: Vec::new(),
            });
        } else if let Some(caps) = commit_re.captures(line) {
            let Some(task) = plan.tasks.last_mut() else {
                return Err(PickpushError::Parse {
                    line: line_number,
                    message: "commit listed before any '-> <branch>' line".to_string(),
                });
            };
            task.commit_ids.push(caps["commit"].to_string());
        } else {
            return Err(PickpushError::Parse {
                line: line_number,
                message: format!("unrecognised line '{}'", line),
            });
        }
    }

    Ok(plan)
}
