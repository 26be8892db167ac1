use git2::{Oid, Repository as Git2Repository, Sort};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CherryError, Result};
use crate::record::CommitRecord;
use crate::refs::RefRules;
use crate::source::CommitSource;

/// Read-only libgit2 view of a repository
pub struct Repository {
    path: PathBuf,
    git_repo: Git2Repository,
    ref_rules: RefRules,
    first_parent: bool,
}

impl Repository {
    /// Open the repository containing `path`, searching upward like git does
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let git_repo = Git2Repository::discover(&path).map_err(|source| {
            CherryError::OpenRepository {
                path: path.clone(),
                source,
            }
        })?;

        // Config rules apply unless the caller overrides them
        let ref_rules = git_repo
            .config()
            .ok()
            .and_then(|config| RefRules::from_config(&config))
            .unwrap_or_default();

        Ok(Repository {
            path,
            git_repo,
            ref_rules,
            first_parent: false,
        })
    }

    pub fn with_ref_rules(mut self, rules: RefRules) -> Self {
        self.ref_rules = rules;
        self
    }

    /// Only follow the first parent of merge commits
    pub fn first_parent(mut self, enabled: bool) -> Self {
        self.first_parent = enabled;
        self
    }

    /// Path the repository was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ref_rules(&self) -> &RefRules {
        &self.ref_rules
    }

    /// Resolve a reference name or commit-ish to a commit id
    pub fn resolve(&self, reference: &str) -> Result<Oid> {
        let mut tried = Vec::new();

        for candidate in self.ref_rules.candidates(reference) {
            if let Ok(found) = self.git_repo.find_reference(&candidate) {
                if let Ok(commit) = found.peel_to_commit() {
                    debug!("Resolved '{}' via {} to {}", reference, candidate, commit.id());
                    return Ok(commit.id());
                }
            }
            tried.push(candidate);
        }

        // Hashes, abbreviated hashes and revision expressions
        if let Ok(commit) = self
            .git_repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
        {
            debug!("Resolved '{}' as revision {}", reference, commit.id());
            return Ok(commit.id());
        }
        tried.push(format!("revision {reference}"));

        Err(CherryError::UnresolvedReference {
            reference: reference.to_string(),
            tried,
        })
    }
}

impl CommitSource for Repository {
    fn commits(&self, reference: &str) -> Result<Vec<CommitRecord>> {
        let start = self.resolve(reference)?;

        let mut revwalk = self.git_repo.revwalk()?;
        // Newest first, never a parent before its child
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(start)?;
        if self.first_parent {
            revwalk.simplify_first_parent()?;
        }

        let mut records = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.git_repo.find_commit(oid)?;
            let message = String::from_utf8_lossy(commit.message_bytes());
            records.push(CommitRecord::from_message(oid.to_string(), &message));
        }

        debug!("Walked {} commits from {}", records.len(), reference);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{BranchType, Commit, Signature};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        (dir, repo)
    }

    /// Commit an empty tree on top of `parents`, optionally moving a ref
    fn commit(
        repo: &Git2Repository,
        message: &str,
        parents: &[&Commit],
        update_ref: Option<&str>,
    ) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(update_ref, &sig, &sig, message, &tree, parents)
            .unwrap()
    }

    fn gerrit_message(title: &str, change_id: &str) -> String {
        format!("{title}\n\nSome body text.\n\nChange-Id: {change_id}\n")
    }

    #[test]
    fn test_open_missing_repository() {
        let dir = TempDir::new().unwrap();
        let err = Repository::open(dir.path()).err().unwrap();
        assert!(matches!(err, CherryError::OpenRepository { .. }));
    }

    #[test]
    fn test_commits_newest_first_with_change_ids() {
        let (dir, repo) = create_test_repo();
        let c1 = commit(&repo, &gerrit_message("first", "I1"), &[], Some("HEAD"));
        let c1 = repo.find_commit(c1).unwrap();
        let c2 = commit(&repo, "no trailer", &[&c1], Some("HEAD"));
        let c2 = repo.find_commit(c2).unwrap();
        commit(&repo, &gerrit_message("third", "I3"), &[&c2], Some("HEAD"));

        let source = Repository::open(dir.path()).unwrap();
        let records = source.commits("HEAD").unwrap();

        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["third", "no trailer", "first"]);
        assert_eq!(records[0].change_id, "I3");
        assert_eq!(records[1].change_id, "");
        assert_eq!(records[2].commit_id.len(), 40);
    }

    #[test]
    fn test_resolve_via_remote_fallback() {
        let (dir, repo) = create_test_repo();
        let base = commit(&repo, &gerrit_message("base", "I1"), &[], Some("HEAD"));
        repo.reference("refs/remotes/origin/stable", base, false, "test")
            .unwrap();

        let source = Repository::open(dir.path()).unwrap();
        assert_eq!(source.resolve("stable").unwrap(), base);
    }

    #[test]
    fn test_resolve_local_branch_before_remote() {
        let (dir, repo) = create_test_repo();
        let base = commit(&repo, "base", &[], Some("HEAD"));
        let base_commit = repo.find_commit(base).unwrap();
        let local = commit(&repo, "local", &[&base_commit], None);
        repo.branch("topic", &repo.find_commit(local).unwrap(), false)
            .unwrap();
        repo.reference("refs/remotes/origin/topic", base, false, "test")
            .unwrap();

        let source = Repository::open(dir.path()).unwrap();
        assert!(repo.find_branch("topic", BranchType::Local).is_ok());
        assert_eq!(source.resolve("topic").unwrap(), local);
    }

    #[test]
    fn test_resolve_short_hash() {
        let (dir, repo) = create_test_repo();
        let base = commit(&repo, "base", &[], Some("HEAD"));
        let full = base.to_string();
        let short = &full[..10];

        let source = Repository::open(dir.path()).unwrap();
        assert_eq!(source.resolve(short).unwrap(), base);
    }

    #[test]
    fn test_unresolvable_reference_lists_attempts() {
        let (dir, repo) = create_test_repo();
        commit(&repo, "base", &[], Some("HEAD"));

        let source = Repository::open(dir.path()).unwrap();
        match source.commits("no-such-branch") {
            Err(CherryError::UnresolvedReference { reference, tried }) => {
                assert_eq!(reference, "no-such-branch");
                assert!(tried.contains(&"refs/remotes/origin/no-such-branch".to_string()));
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_custom_rules_from_config() {
        let (dir, repo) = create_test_repo();
        let base = commit(&repo, "base", &[], Some("HEAD"));
        repo.reference("refs/remotes/gerrit/release", base, false, "test")
            .unwrap();
        repo.config()
            .unwrap()
            .set_str("gerrit-cherry.refRules", "refs/remotes/gerrit/%s")
            .unwrap();

        let source = Repository::open(dir.path()).unwrap();
        assert_eq!(source.ref_rules().rules(), ["refs/remotes/gerrit/%s"]);
        assert_eq!(source.resolve("release").unwrap(), base);
    }

    #[test]
    fn test_first_parent_skips_merged_side() {
        let (dir, repo) = create_test_repo();
        let base = commit(&repo, &gerrit_message("base", "I1"), &[], Some("HEAD"));
        let base = repo.find_commit(base).unwrap();
        let side = commit(&repo, &gerrit_message("side", "I2"), &[&base], None);
        let side = repo.find_commit(side).unwrap();
        let main = commit(&repo, &gerrit_message("main", "I3"), &[&base], Some("HEAD"));
        let main = repo.find_commit(main).unwrap();
        commit(&repo, "Merge side", &[&main, &side], Some("HEAD"));

        let full = Repository::open(dir.path()).unwrap();
        assert_eq!(full.commits("HEAD").unwrap().len(), 4);

        let linear = Repository::open(dir.path()).unwrap().first_parent(true);
        let ids: Vec<_> = linear
            .commits("HEAD")
            .unwrap()
            .into_iter()
            .map(|r| r.change_id)
            .collect();
        assert_eq!(ids, ["", "I3", "I1"]);
    }
}
