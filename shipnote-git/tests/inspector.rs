use camino::{Utf8Path, Utf8PathBuf};
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use shipnote_git::{DEFAULT_BRANCH_REF, GitError, RevisionInspector, locate_repository};
use tempfile::TempDir;

fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("utf-8 temp path")
}

fn init_repo(dir: &Utf8Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    Repository::init_opts(dir, &opts).expect("init repository")
}

fn signature(seconds: i64) -> Signature<'static> {
    Signature::new("Alice", "alice@example.com", &Time::new(seconds, 0)).expect("signature")
}

/// Commits an empty tree and returns the new commit id. `update_ref` follows
/// the git2 convention: `Some("HEAD")` advances the current branch, `None`
/// leaves all refs alone.
fn commit(repo: &Repository, update_ref: Option<&str>, message: &str, seconds: i64) -> Oid {
    let tree_id = {
        let mut index = repo.index().expect("index");
        index.write_tree().expect("write tree")
    };
    let tree = repo.find_tree(tree_id).expect("tree");
    let sig = signature(seconds);
    let parents: Vec<git2::Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("parent commit")],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
        .expect("commit")
}

#[test]
fn locate_finds_repository_in_start_directory() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    init_repo(&root);

    let repo = locate_repository(&root).unwrap();
    assert_eq!(
        repo.workdir().unwrap().canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn locate_walks_up_to_an_enclosing_repository() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    init_repo(&root);

    let nested = root.join("a").join("b");
    fs_err::create_dir_all(&nested).unwrap();

    let repo = locate_repository(&nested).unwrap();
    assert_eq!(
        repo.workdir().unwrap().canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn locate_prefers_the_nearest_repository() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    init_repo(&root);
    let inner_repo = init_repo(&root.join("inner"));
    commit(&inner_repo, Some("HEAD"), "inner commit", 1_000);

    let inspector = RevisionInspector::open(&root.join("inner")).unwrap();
    let last = inspector.last_commit().unwrap().unwrap();
    assert_eq!(last.short_message, "inner commit");
}

#[test]
fn locate_reports_not_found_with_the_start_directory() {
    let dir = TempDir::new().unwrap();
    let start = utf8(dir.path()).join("deeper");
    fs_err::create_dir_all(&start).unwrap();

    let err = locate_repository(&start).err().unwrap();
    match err {
        GitError::RepositoryNotFound { root, .. } => assert_eq!(root, start),
        other => panic!("expected RepositoryNotFound, got {other:?}"),
    }
}

#[test]
fn branch_name_of_unborn_head_is_the_symbolic_target() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    init_repo(&root);

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.current_branch_name().unwrap(), "master");
}

#[test]
fn branch_name_follows_head_after_commits() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    commit(&repo, Some("HEAD"), "first", 1_000);

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.current_branch_name().unwrap(), "master");
}

#[test]
fn detached_head_yields_an_abbreviated_id() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    let id = commit(&repo, Some("HEAD"), "first", 1_000);
    repo.set_head_detached(id).unwrap();

    let inspector = RevisionInspector::open(&root).unwrap();
    let name = inspector.current_branch_name().unwrap();
    assert!(name.len() >= 7);
    assert!(id.to_string().starts_with(&name));
}

#[test]
fn last_commit_is_none_on_an_empty_repository() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    init_repo(&root);

    let inspector = RevisionInspector::open(&root).unwrap();
    assert!(inspector.last_commit().unwrap().is_none());
}

#[test]
fn last_commit_reports_sha_author_and_summary() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    let id = commit(&repo, Some("HEAD"), "first line\n\nbody", 1_000);

    let inspector = RevisionInspector::open(&root).unwrap();
    let info = inspector.last_commit().unwrap().unwrap();
    assert_eq!(info.sha1, id.to_string());
    assert_eq!(info.author_email, "alice@example.com");
    assert_eq!(info.short_message, "first line");
}

#[test]
fn describe_on_an_empty_repository_returns_the_fallback_label() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    init_repo(&root);

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.describe_all_always().unwrap(), DEFAULT_BRANCH_REF);
}

#[test]
fn describe_returns_the_branch_ref_at_head() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    commit(&repo, Some("HEAD"), "first", 1_000);

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.describe_all_always().unwrap(), "refs/heads/master");
}

#[test]
fn describe_walks_back_to_the_first_ref_carrying_ancestor() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    let first = commit(&repo, Some("HEAD"), "first", 1_000);

    // Detach and commit on top, leaving master behind at the first commit.
    repo.set_head_detached(first).unwrap();
    commit(&repo, Some("HEAD"), "second", 2_000);

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.describe_all_always().unwrap(), "refs/heads/master");
}

#[test]
fn describe_prefers_the_ref_with_the_earliest_timestamp() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    let first = commit(&repo, Some("HEAD"), "first", 5_000);

    // Annotated tag on the same commit, tagged before the commit was
    // authored. The earlier underlying object wins the tie on the commit.
    let target = repo.find_object(first, None).unwrap();
    repo.tag("v0.1.0", &target, &signature(1_000), "release v0.1.0", false)
        .unwrap();

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.describe_all_always().unwrap(), "refs/tags/v0.1.0");
}

#[test]
fn describe_ignores_later_tags_in_favor_of_the_earlier_branch_commit() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);
    let first = commit(&repo, Some("HEAD"), "first", 1_000);

    let target = repo.find_object(first, None).unwrap();
    repo.tag("v0.1.0", &target, &signature(9_000), "late tag", false)
        .unwrap();

    let inspector = RevisionInspector::open(&root).unwrap();
    assert_eq!(inspector.describe_all_always().unwrap(), "refs/heads/master");
}

#[test]
fn describe_without_any_refs_falls_back_to_the_abbreviated_id() {
    let dir = TempDir::new().unwrap();
    let root = utf8(dir.path());
    let repo = init_repo(&root);

    // Commit without moving any ref, then detach HEAD onto it: history
    // exists but no ref points anywhere into it.
    let id = commit(&repo, None, "floating", 1_000);
    repo.set_head_detached(id).unwrap();

    let inspector = RevisionInspector::open(&root).unwrap();
    let label = inspector.describe_all_always().unwrap();
    assert!(label.len() >= 7);
    assert!(id.to_string().starts_with(&label));
}
