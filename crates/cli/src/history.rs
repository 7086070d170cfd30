// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Revision history analysis.
//!
//! Read-only queries over the commit range `(base, HEAD]` using git2
//! (libgit2) to avoid subprocess overhead. Commits are enumerated once at
//! construction, oldest first, so chronological-index comparisons are O(1).
//!
//! Failure policy: opening the repository and resolving the base ref are
//! the only fallible steps. Every query afterwards degrades to an empty or
//! absent result with a debug log line; partial information must never
//! abort an enforcement run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, DiffOptions, Oid, Repository, Sort};

use crate::error::{Error, Result};

/// A commit inside the enforced range.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// Full commit hash.
    pub hash: String,
    /// Commit subject line.
    pub message: String,
    /// Author time, epoch seconds.
    pub timestamp: i64,
}

impl CommitRecord {
    /// Short 7-character hash for display.
    pub fn short_hash(&self) -> &str {
        &self.hash[..7.min(self.hash.len())]
    }
}

/// History over `(base, HEAD]` for one repository.
pub struct History {
    repo: Repository,
    commits: Vec<CommitRecord>,
    index_by_hash: HashMap<String, usize>,
}

/// Detect a baseline ref when none is configured.
///
/// Tries `origin/main` first (the CI default), then local `main`/`master`.
pub fn detect_base_ref(root: &Path) -> Option<String> {
    let repo = Repository::discover(root).ok()?;
    for name in ["origin/main", "main", "master"] {
        if repo.revparse_single(name).is_ok() {
            return Some(name.to_string());
        }
    }
    None
}

impl History {
    /// Open the repository at `root` and enumerate `(base, HEAD]`.
    pub fn open(root: &Path, base: &str) -> Result<Self> {
        let repo = Repository::discover(root)
            .map_err(|e| Error::Repository(format!("failed to open repository: {}", e.message())))?;

        let base_oid = repo
            .revparse_single(base)
            .map_err(|e| {
                Error::Repository(format!("failed to resolve base ref {}: {}", base, e.message()))
            })?
            .id();
        let head_oid = repo
            .head()
            .and_then(|h| {
                h.target()
                    .ok_or_else(|| git2::Error::from_str("HEAD has no target"))
            })
            .map_err(|e| Error::Repository(format!("failed to resolve HEAD: {}", e.message())))?;

        let commits = collect_range(&repo, base_oid, head_oid)
            .map_err(|e| Error::Repository(format!("failed to walk commits: {}", e.message())))?;

        let index_by_hash = commits
            .iter()
            .enumerate()
            .map(|(i, c)| (c.hash.clone(), i))
            .collect();

        Ok(Self {
            repo,
            commits,
            index_by_hash,
        })
    }

    /// All commits in range, oldest to newest.
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    /// Chronological index of a commit within the range.
    pub fn index_of(&self, hash: &str) -> Option<usize> {
        self.index_by_hash.get(hash).copied()
    }

    /// Paths changed in exactly one commit, relative to the repository root.
    pub fn files_touched_by(&self, hash: &str) -> Vec<PathBuf> {
        match self.commit_diff(hash, None) {
            Some(diff) => diff
                .deltas()
                .filter_map(|delta| extract_path(&delta).map(Path::to_path_buf))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Unified diff text for one file within one commit.
    pub fn diff_for_file(&self, hash: &str, path: &Path) -> Option<String> {
        let diff = self.commit_diff(hash, Some(path))?;
        let mut buf = String::new();
        let print_result = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                buf.push(origin);
            }
            buf.push_str(&String::from_utf8_lossy(line.content()));
            true
        });

        match print_result {
            Ok(()) => Some(buf),
            Err(e) => {
                tracing::debug!("failed to render diff for {}: {}", path.display(), e.message());
                None
            }
        }
    }

    /// Most recent in-range commit touching `path`, or `None` if untouched.
    pub fn last_commit_touching(&self, path: &Path) -> Option<&CommitRecord> {
        self.commits
            .iter()
            .rev()
            .find(|commit| self.commit_touches(&commit.hash, path))
    }

    /// True iff `path`'s most recent in-range change is at or after the
    /// reference commit. Absent information yields `false`: downstream
    /// treats that as an unmet obligation, never as a silent pass.
    pub fn was_modified_at_or_after(&self, path: &Path, reference_hash: &str) -> bool {
        let Some(reference_index) = self.index_of(reference_hash) else {
            return false;
        };
        let Some(last) = self.last_commit_touching(path) else {
            return false;
        };

        // Indices exist for every commit returned by last_commit_touching
        self.index_of(&last.hash)
            .is_some_and(|last_index| last_index >= reference_index)
    }

    fn commit_touches(&self, hash: &str, path: &Path) -> bool {
        self.commit_diff(hash, Some(path))
            .is_some_and(|diff| diff.deltas().count() > 0)
    }

    /// Diff of one commit against its first parent (or the empty tree for a
    /// root commit), optionally scoped to a single path.
    fn commit_diff(&self, hash: &str, path: Option<&Path>) -> Option<Diff<'_>> {
        match self.try_commit_diff(hash, path) {
            Ok(diff) => Some(diff),
            Err(e) => {
                tracing::debug!("diff query failed for {}: {}", hash, e.message());
                None
            }
        }
    }

    fn try_commit_diff(
        &self,
        hash: &str,
        path: Option<&Path>,
    ) -> std::result::Result<Diff<'_>, git2::Error> {
        let oid = Oid::from_str(hash)?;
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        if let Some(path) = path {
            opts.pathspec(path);
        }

        self.repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
    }
}

/// Extract the file path from a diff delta.
///
/// For deleted files `new_file().path()` is `None`, so fall back to
/// `old_file()`. Order matters: `new_file` first (add, modify, rename),
/// then `old_file` (delete).
fn extract_path<'a>(delta: &'a git2::DiffDelta<'a>) -> Option<&'a Path> {
    delta.new_file().path().or_else(|| delta.old_file().path())
}

/// Walk `(base, head]` and return records oldest first.
fn collect_range(
    repo: &Repository,
    base: Oid,
    head: Oid,
) -> std::result::Result<Vec<CommitRecord>, git2::Error> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push(head)?;
    revwalk.hide(base)?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;

    let mut commits = Vec::new();
    for oid in revwalk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        commits.push(CommitRecord {
            hash: oid.to_string(),
            message: commit.summary().unwrap_or("").to_string(),
            timestamp: commit.time().seconds(),
        });
    }
    Ok(commits)
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
