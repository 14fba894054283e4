use super::*;
use crate::git::SystemRunner;
use git2::{BranchType, Repository, RepositoryState};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A throwaway repository on `master` with a bare `origin` next to it.
struct Fixture {
    _root: TempDir,
    repo: PathBuf,
    remote: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let repo = root.path().join("work");
        let remote = root.path().join("origin.git");
        std::fs::create_dir(&repo).unwrap();

        git_in(root.path(), &["init", "--bare", remote.to_str().unwrap()]);
        git_in(&repo, &["init"]);
        git_in(&repo, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        git_in(&repo, &["config", "user.name", "Fixture"]);
        git_in(&repo, &["config", "user.email", "fixture@example.com"]);
        git_in(&repo, &["config", "commit.gpgsign", "false"]);
        git_in(&repo, &["remote", "add", "origin", remote.to_str().unwrap()]);

        let fixture = Self {
            _root: root,
            repo,
            remote,
        };
        fixture.commit("shared.txt", "one\n", "base");
        fixture
    }

    fn git(&self, args: &[&str]) -> String {
        git_in(&self.repo, args)
    }

    /// Commit `content` to `file` on the current branch and return its id.
    fn commit(&self, file: &str, content: &str, message: &str) -> String {
        std::fs::write(self.repo.join(file), content).unwrap();
        self.git(&["add", file]);
        self.git(&["commit", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Create commits on a side branch and return to `master`.
    fn side_commits(&self, commits: &[(&str, &str, &str)]) -> Vec<String> {
        self.git(&["checkout", "-b", "side"]);
        let ids = commits
            .iter()
            .map(|(file, content, message)| self.commit(file, content, message))
            .collect();
        self.git(&["checkout", "master"]);
        ids
    }

    fn summaries(&self, branch: &str) -> Vec<String> {
        let repo = Repository::open(&self.repo).unwrap();
        let tip = repo
            .find_branch(branch, BranchType::Local)
            .unwrap()
            .get()
            .peel_to_commit()
            .unwrap();

        let mut walk = repo.revwalk().unwrap();
        walk.push(tip.id()).unwrap();
        walk.map(|id| {
            repo.find_commit(id.unwrap())
                .unwrap()
                .summary()
                .unwrap()
                .to_string()
        })
        .collect()
    }

    fn remote_has(&self, branch: &str) -> bool {
        let remote = Repository::open_bare(&self.remote).unwrap();
        let found = remote.find_reference(&format!("refs/heads/{}", branch)).is_ok();
        found
    }

    fn publish(&self, policy: Policy, tasks: &[BranchTask]) -> (Report, String) {
        let git = Git::new(SystemRunner::new(), &self.repo);
        let settings = Settings {
            base_branch: "master".to_string(),
            remote: "origin".to_string(),
            policy,
        };
        let mut publisher = Publisher::new(&git, &settings, Vec::new());
        let report = publisher.publish_all(tasks).unwrap();
        (report, String::from_utf8(publisher.into_output()).unwrap())
    }
}

fn git_in(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_publishes_commits_in_listed_order() {
    let fixture = Fixture::new();
    let ids = fixture.side_commits(&[("a.txt", "a\n", "A"), ("b.txt", "b\n", "B")]);
    let tasks = vec![BranchTask {
        branch_name: "feature".to_string(),
        commit_ids: ids,
    }];

    let (report, _) = fixture.publish(Policy::Strict, &tasks);

    assert!(report.tasks[0].outcome.is_published());
    assert_eq!(fixture.summaries("feature"), vec!["B", "A", "base"]);
    assert!(fixture.remote_has("feature"));

    let repo = Repository::open(&fixture.repo).unwrap();
    let branch = repo.find_branch("feature", BranchType::Local).unwrap();
    let upstream = branch.upstream().unwrap();
    assert_eq!(upstream.name().unwrap(), Some("origin/feature"));
}

#[test]
fn test_conflict_leaves_branch_at_base_and_skips_push() {
    let fixture = Fixture::new();
    let ids = fixture.side_commits(&[("shared.txt", "two\n", "A"), ("b.txt", "b\n", "B")]);
    fixture.commit("shared.txt", "three\n", "diverge");
    let tasks = vec![BranchTask {
        branch_name: "feature".to_string(),
        commit_ids: ids.clone(),
    }];

    let (report, output) = fixture.publish(Policy::Strict, &tasks);

    assert_eq!(
        report.tasks[0].outcome,
        TaskOutcome::CherryPickFailed {
            commit: ids[0].clone(),
            abort_failed: false,
        }
    );
    assert_eq!(fixture.summaries("feature"), fixture.summaries("master"));
    assert!(!fixture.remote_has("feature"));
    assert!(!output.contains("$ git push"));

    let repo = Repository::open(&fixture.repo).unwrap();
    assert_eq!(repo.state(), RepositoryState::Clean);
}

#[test]
fn test_next_task_runs_after_a_failed_one() {
    let fixture = Fixture::new();
    let ids = fixture.side_commits(&[("shared.txt", "two\n", "A"), ("c.txt", "c\n", "C")]);
    fixture.commit("shared.txt", "three\n", "diverge");
    let tasks = vec![
        BranchTask::new("broken", &[ids[0].as_str()]),
        BranchTask::new("working", &[ids[1].as_str()]),
    ];

    let (report, output) = fixture.publish(Policy::Strict, &tasks);

    assert_eq!(report.failed(), 1);
    assert!(report.tasks[1].outcome.is_published());
    assert_eq!(fixture.summaries("working"), vec!["C", "diverge", "base"]);
    assert!(fixture.remote_has("working"));
    assert!(!fixture.remote_has("broken"));
    assert!(output.ends_with("Done.\n"));
}

#[test]
fn test_dependent_commits_apply_only_in_listed_order() {
    let fixture = Fixture::new();
    let ids = fixture.side_commits(&[("new.txt", "a\n", "A"), ("new.txt", "a\nb\n", "B")]);

    let (report, _) = fixture.publish(
        Policy::Strict,
        &[BranchTask::new("forward", &[ids[0].as_str(), ids[1].as_str()])],
    );
    assert!(report.tasks[0].outcome.is_published());
    assert_eq!(fixture.summaries("forward"), vec!["B", "A", "base"]);

    let (report, output) = fixture.publish(
        Policy::Strict,
        &[BranchTask::new("backward", &[ids[1].as_str(), ids[0].as_str()])],
    );
    assert_eq!(
        report.tasks[0].outcome,
        TaskOutcome::CherryPickFailed {
            commit: ids[1].clone(),
            abort_failed: false,
        }
    );
    assert!(!output.contains(&format!("$ git cherry-pick {}", ids[0])));
}

#[test]
fn test_publishing_twice_does_not_fault() {
    let fixture = Fixture::new();
    let ids = fixture.side_commits(&[("a.txt", "a\n", "A")]);
    let tasks = vec![BranchTask::new("feature", &[ids[0].as_str()])];

    let (first, _) = fixture.publish(Policy::Strict, &tasks);
    assert!(first.tasks[0].outcome.is_published());

    let (second, output) = fixture.publish(Policy::Strict, &tasks);
    assert!(matches!(
        second.tasks[0].outcome,
        TaskOutcome::StepFailed {
            step: Step::CreateBranch,
            ..
        }
    ));
    assert!(output.contains("Error: branch creation failed for branch feature."));
    assert_eq!(fixture.summaries("master"), vec!["base"]);

    let (third, _) = fixture.publish(Policy::Lenient, &tasks);
    assert_eq!(third.tasks.len(), 1);
}

#[test]
fn test_option_like_commit_never_reaches_git() {
    let fixture = Fixture::new();
    let plan = crate::config::Plan {
        tasks: vec![BranchTask::new("feature", &["--quit"])],
        ..Default::default()
    };

    assert!(plan.validate().is_err());
    assert!(!fixture.remote_has("feature"));
    assert_eq!(fixture.summaries("master"), vec!["base"]);
}
