//! End-to-end tests for the shipnote binary.

use assert_cmd::Command;
use git2::{Repository, RepositoryInitOptions, Signature, Time};
use predicates::prelude::*;
use fs_err as fs;
use tempfile::TempDir;

fn shipnote() -> Command {
    Command::cargo_bin("shipnote").expect("shipnote binary")
}

fn create_project() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    let root = td.path();

    fs::write(
        root.join("shipnote.toml"),
        r###"
webhook = "https://hooks.example.test/T000"

[project]
name = "Demo"
group = "com.acme"
version = "1.2.0"

[[blocks]]
type = "publication"
date = "Mon, 1 Jan 2024 00:00:00 GMT"
repository_name = "prod"

[[blocks]]
type = "changelog"
version_lines_start_with = ["## "]

[[blocks]]
type = "context"
markdown = ["sent by shipnote"]
"###,
    )
    .unwrap();
    fs::write(
        root.join("CHANGELOG.md"),
        "## 1.2.0\n- Everything is new\n## 1.1.0\n- Old\n",
    )
    .unwrap();

    td
}

fn init_repo_with_commit(dir: &std::path::Path) {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    let repo = Repository::init_opts(dir, &opts).unwrap();
    let sig = Signature::new("CI", "ci@acme.dev", &Time::new(1_700_000_000, 0)).unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "Release 1.2.0", &tree, &[])
        .unwrap();
}

#[test]
fn compose_prints_the_resolved_payload() {
    let temp = create_project();

    shipnote()
        .current_dir(temp.path())
        .arg("compose")
        .assert()
        .success()
        .stdout(predicate::str::contains("successfully published on *prod*"))
        .stdout(predicate::str::contains("*Changelog*\\n- Everything is new"))
        .stdout(predicate::str::contains("\"type\": \"divider\""))
        .stdout(predicate::str::contains("sent by shipnote"));
}

#[test]
fn compose_writes_the_payload_to_a_file() {
    let temp = create_project();
    let out = temp.path().join("payload.json");

    shipnote()
        .current_dir(temp.path())
        .arg("compose")
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let payload = fs::read_to_string(&out).unwrap();
    assert!(payload.contains("successfully published"));
}

#[test]
fn compose_fails_without_a_definition_file() {
    let temp = tempfile::tempdir().unwrap();

    shipnote()
        .current_dir(temp.path())
        .arg("compose")
        .assert()
        .failure();
}

#[test]
fn compose_fails_when_a_block_cannot_resolve() {
    let temp = tempfile::tempdir().unwrap();
    // Changelog block without any version line indication.
    fs::write(
        temp.path().join("shipnote.toml"),
        "[project]\nversion = \"1.0\"\n\n[[blocks]]\ntype = \"changelog\"\n",
    )
    .unwrap();

    shipnote()
        .current_dir(temp.path())
        .arg("compose")
        .assert()
        .failure();
}

#[test]
fn changelog_extracts_the_requested_section() {
    let temp = create_project();

    shipnote()
        .current_dir(temp.path())
        .arg("changelog")
        .arg("--version")
        .arg("1.2.0")
        .arg("--starts-with")
        .arg("## ")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Everything is new"))
        .stdout(predicate::str::contains("- Old").not());
}

#[test]
fn changelog_accepts_an_explicit_file() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("NEWS.md"), "## 2.0\n- Renamed\n").unwrap();

    shipnote()
        .current_dir(temp.path())
        .arg("changelog")
        .arg("--file")
        .arg("NEWS.md")
        .arg("--version")
        .arg("2.0")
        .arg("--starts-with")
        .arg("## ")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Renamed"));
}

#[test]
fn changelog_matcher_covers_the_whole_heading_line() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(
        temp.path().join("CHANGELOG.md"),
        "v1.0\n- new\nv1\n- old\n",
    )
    .unwrap();

    shipnote()
        .current_dir(temp.path())
        .arg("changelog")
        .arg("--version")
        .arg("1.0")
        .arg("--matcher")
        .arg("v1|v1\\.0")
        .assert()
        .success()
        .stdout(predicate::str::contains("- new"))
        .stdout(predicate::str::contains("- old").not());
}

#[test]
fn changelog_without_matchers_fails() {
    let temp = create_project();

    shipnote()
        .current_dir(temp.path())
        .arg("changelog")
        .arg("--version")
        .arg("1.2.0")
        .assert()
        .failure();
}

#[test]
fn describe_names_the_branch_ref() {
    let temp = tempfile::tempdir().unwrap();
    init_repo_with_commit(temp.path());

    shipnote()
        .current_dir(temp.path())
        .arg("describe")
        .assert()
        .success()
        .stdout(predicate::str::contains("refs/heads/master"));
}

#[test]
fn describe_json_reports_head_facts() {
    let temp = tempfile::tempdir().unwrap();
    init_repo_with_commit(temp.path());

    shipnote()
        .current_dir(temp.path())
        .arg("describe")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"branch\": \"master\""))
        .stdout(predicate::str::contains("\"author\": \"ci@acme.dev\""));
}

#[test]
fn describe_fails_outside_a_repository() {
    let temp = tempfile::tempdir().unwrap();

    shipnote()
        .current_dir(temp.path())
        .arg("describe")
        .assert()
        .failure();
}
