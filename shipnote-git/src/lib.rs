//! Read-only git inspection for shipnote.
//!
//! Two concerns live here: locating the nearest enclosing repository by
//! walking parent directories (the way command-line git finds its checkout),
//! and describing the current revision: branch name, last-commit metadata,
//! and a `git describe --all --always` style label.
//!
//! Everything is local and read-only; `git2` is built without its network
//! features. A [`RevisionInspector`] owns its repository handle, which is
//! released when the inspector is dropped.

use camino::{Utf8Path, Utf8PathBuf};
use git2::{ErrorCode, ObjectType, Oid, Repository, Sort};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Label returned by [`RevisionInspector::describe_all_always`] when the
/// repository has no commits yet.
pub const DEFAULT_BRANCH_REF: &str = "refs/heads/master";

#[derive(Debug, Error)]
pub enum GitError {
    /// No repository exists at the starting directory or any of its parents.
    ///
    /// `cause` is the failure at the starting directory itself; failures at
    /// parent directories are retained in `suppressed` for diagnostics.
    #[error("impossible to fetch git repository at {root}")]
    RepositoryNotFound {
        root: Utf8PathBuf,
        #[source]
        cause: git2::Error,
        suppressed: Vec<git2::Error>,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// Metadata of the most recent commit reachable from HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha1: String,
    pub author_email: String,
    pub short_message: String,
}

/// Opens the repository rooted at `start`, retrying at each parent directory.
///
/// Only "not a repository here" failures trigger the walk; any other error is
/// surfaced immediately.
pub fn locate_repository(start: &Utf8Path) -> Result<Repository, GitError> {
    let cause = match Repository::open(start) {
        Ok(repo) => return Ok(repo),
        Err(e) if e.code() == ErrorCode::NotFound => e,
        Err(e) => return Err(e.into()),
    };

    let mut suppressed = Vec::new();
    let mut dir = start.parent();
    while let Some(d) = dir {
        match Repository::open(d) {
            Ok(repo) => {
                debug!("found git repository at {d}");
                return Ok(repo);
            }
            Err(e) if e.code() == ErrorCode::NotFound => suppressed.push(e),
            Err(e) => return Err(e.into()),
        }
        dir = d.parent();
    }

    Err(GitError::RepositoryNotFound {
        root: start.to_owned(),
        cause,
        suppressed,
    })
}

/// Describes the current position of an open repository.
pub struct RevisionInspector {
    repo: Repository,
}

impl RevisionInspector {
    /// Locates the nearest repository from `start` and wraps it.
    pub fn open(start: &Utf8Path) -> Result<Self, GitError> {
        Ok(Self {
            repo: locate_repository(start)?,
        })
    }

    /// Name of the branch HEAD points to, or the abbreviated commit id when
    /// HEAD is detached.
    pub fn current_branch_name(&self) -> Result<String, GitError> {
        let head = self.repo.find_reference("HEAD")?;
        match head.symbolic_target() {
            Some(target) => {
                let name = target.strip_prefix("refs/heads/").unwrap_or(target);
                Ok(name.to_string())
            }
            None => {
                let oid = head
                    .target()
                    .ok_or_else(|| git2::Error::from_str("HEAD points at no object"))?;
                self.abbreviate(oid)
            }
        }
    }

    /// Metadata of the last commit, or `None` if there are no commits yet.
    pub fn last_commit(&self) -> Result<Option<CommitInfo>, GitError> {
        let Some(commit) = self.head_commit()? else {
            return Ok(None);
        };
        Ok(Some(CommitInfo {
            sha1: commit.id().to_string(),
            author_email: commit.author().email().unwrap_or_default().to_string(),
            short_message: commit.summary().unwrap_or_default().to_string(),
        }))
    }

    /// Equivalent of `git describe --all --always`.
    ///
    /// Walks history from HEAD, most recent first, until a commit carrying a
    /// ref is found, and returns that ref's full name. When several refs sit
    /// on the same commit, the one whose underlying object has the earliest
    /// timestamp wins (tagger time for annotated tags, author time for
    /// commits). With no commits at all the fixed [`DEFAULT_BRANCH_REF`]
    /// label is returned; with commits but no refs anywhere, the abbreviated
    /// HEAD id.
    pub fn describe_all_always(&self) -> Result<String, GitError> {
        let Some(target) = self.head_commit()? else {
            return Ok(DEFAULT_BRANCH_REF.to_string());
        };
        let target_id = target.id();

        // Refs grouped by the commit they ultimately point at. Annotated tags
        // are peeled for the graph key; the ref's own object id is kept for
        // the timestamp comparison.
        let mut refs_by_commit: HashMap<Oid, Vec<(String, Oid)>> = HashMap::new();
        for reference in self.repo.references()? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                continue;
            };
            if !name.starts_with("refs/") {
                continue;
            }
            let Some(own_id) = reference.target() else {
                continue;
            };
            let graph_id = reference
                .peel_to_commit()
                .map(|commit| commit.id())
                .unwrap_or(own_id);
            refs_by_commit
                .entry(graph_id)
                .or_default()
                .push((name.to_string(), own_id));
        }

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push(target_id)?;

        for id in walk {
            let id = id?;
            let Some(candidates) = refs_by_commit.get(&id) else {
                continue;
            };

            let mut best: Option<(&str, i64)> = None;
            for (name, own_id) in candidates {
                let stamp = self.object_timestamp(*own_id)?;
                if best.is_none_or(|(_, s)| stamp < s) {
                    best = Some((name, stamp));
                }
            }
            if let Some((name, _)) = best {
                debug!("described {target_id} as {name}");
                return Ok(name.to_string());
            }
        }

        self.abbreviate(target_id)
    }

    /// HEAD resolved to a commit; `None` for an unborn branch.
    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, GitError> {
        let object = match self.repo.revparse_single("HEAD") {
            Ok(object) => object,
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(object.peel_to_commit()?))
    }

    /// Timestamp used to rank refs sharing a commit. Refs to objects that are
    /// neither commits nor annotated tags rank last.
    fn object_timestamp(&self, oid: Oid) -> Result<i64, GitError> {
        let object = self.repo.find_object(oid, None)?;
        if object.kind() == Some(ObjectType::Tag) {
            if let Some(tagger) = object.as_tag().and_then(|tag| tag.tagger()) {
                return Ok(tagger.when().seconds());
            }
            return Ok(i64::MAX);
        }
        if let Some(commit) = object.as_commit() {
            return Ok(commit.author().when().seconds());
        }
        Ok(i64::MAX)
    }

    fn abbreviate(&self, oid: Oid) -> Result<String, GitError> {
        let object = self.repo.find_object(oid, None)?;
        let short = object.short_id()?;
        Ok(short.as_str().unwrap_or_default().to_string())
    }
}
