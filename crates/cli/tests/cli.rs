use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const GUIDE: &str = "The capital of France is Paris. Python is a programming language.";

fn coach(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("coach").expect("binary");
    cmd.current_dir(workdir)
        .env("COACH_EMBEDDING_MODEL", "hashed")
        .env_remove("GROQ_API_KEY")
        .env_remove("TAVILY_API_KEY");
    cmd
}

fn write_guide(root: &Path) {
    std::fs::write(root.join("guide.txt"), GUIDE).expect("write corpus");
}

#[test]
fn help_lists_every_subcommand() {
    let tmp = TempDir::new().expect("tempdir");
    coach(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("chat")
                .and(predicate::str::contains("ask"))
                .and(predicate::str::contains("search"))
                .and(predicate::str::contains("index")),
        );
}

#[test]
fn index_builds_then_respects_an_existing_index() {
    let tmp = TempDir::new().expect("tempdir");
    write_guide(tmp.path());

    coach(tmp.path())
        .args(["index", "--corpus", "guide.txt", "--index-dir", "idx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed").and(predicate::str::contains("chunks")));

    assert!(tmp.path().join("idx").join("index.json").is_file());

    coach(tmp.path())
        .args(["index", "--corpus", "guide.txt", "--index-dir", "idx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already holds"));

    coach(tmp.path())
        .args([
            "index",
            "--rebuild",
            "--corpus",
            "guide.txt",
            "--index-dir",
            "idx",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed"));
}

#[test]
fn index_without_a_corpus_reports_the_path() {
    let tmp = TempDir::new().expect("tempdir");

    coach(tmp.path())
        .args(["index", "--corpus", "missing.txt", "--index-dir", "idx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn search_prints_ranked_chunks() {
    let tmp = TempDir::new().expect("tempdir");
    write_guide(tmp.path());

    coach(tmp.path())
        .args([
            "search",
            "python programming language",
            "-k",
            "1",
            "--corpus",
            "guide.txt",
            "--index-dir",
            "idx",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("distance")
                .and(predicate::str::contains("programming language")),
        );
}

#[test]
fn ask_without_a_groq_key_fails_fast() {
    let tmp = TempDir::new().expect("tempdir");
    write_guide(tmp.path());

    coach(tmp.path())
        .args(["ask", "how do I prepare?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn search_turns_need_a_tavily_key() {
    let tmp = TempDir::new().expect("tempdir");
    write_guide(tmp.path());

    coach(tmp.path())
        .env("GROQ_API_KEY", "gsk_dummy")
        .args(["ask", "search: rust interview questions"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TAVILY_API_KEY"));
}

#[test]
fn chat_banner_appears_and_quit_exits_cleanly() {
    let tmp = TempDir::new().expect("tempdir");
    write_guide(tmp.path());

    coach(tmp.path())
        .env("GROQ_API_KEY", "gsk_dummy")
        .arg("chat")
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Interview coach ready"));
}
