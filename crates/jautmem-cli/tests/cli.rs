use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn jautmem(root: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jautmem"));
    cmd.arg("--root").arg(root.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jautmem"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("JautMem"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jautmem"));
    cmd.arg("--version").assert().success();
}

#[test]
fn test_init_retain_recall() {
    let root = TempDir::new().unwrap();

    jautmem(&root)
        .args(["init", "Cynix"])
        .assert()
        .success()
        .stdout(contains("fresh core memory"));

    jautmem(&root)
        .args([
            "retain",
            "Cynix",
            "Coffee stains are a metaphor for human messiness",
            "--category",
            "opinion",
            "--confidence",
            "0.8",
            "--entity",
            "coffee_stains",
        ])
        .assert()
        .success()
        .stdout(contains("Retained fact-"));

    jautmem(&root)
        .args(["--format", "json", "recall", "Cynix", "coffee"])
        .assert()
        .success()
        .stdout(contains("Coffee stains are a metaphor"))
        .stdout(contains("\"category\": \"opinion\""));

    jautmem(&root)
        .args(["recall", "Nova", "coffee"])
        .assert()
        .success()
        .stdout(contains("No memories match"));
}

#[test]
fn test_context_sections() {
    let root = TempDir::new().unwrap();

    jautmem(&root).args(["init", "Cynix"]).assert().success();
    jautmem(&root)
        .args(["log", "Cynix", "Posted about coffee"])
        .assert()
        .success();
    jautmem(&root)
        .args(["entity", "update", "Cynix", "Nova", "Prefers tea"])
        .assert()
        .success();

    jautmem(&root)
        .args(["context", "Cynix", "--participant", "Nova"])
        .assert()
        .success()
        .stdout(contains("=== CORE MEMORY ==="))
        .stdout(contains("=== RECENT ACTIVITY ==="))
        .stdout(contains("=== PROFILE: @Nova ==="))
        .stdout(contains("Prefers tea"));
}

#[test]
fn test_stats_and_reindex() {
    let root = TempDir::new().unwrap();

    jautmem(&root)
        .args(["retain", "Cynix", "first"])
        .assert()
        .success();
    jautmem(&root)
        .args(["retain", "Cynix", "second", "--category", "world"])
        .assert()
        .success();

    jautmem(&root)
        .args(["--format", "json", "stats", "Cynix"])
        .assert()
        .success()
        .stdout(contains("\"total_facts\": 2"));

    jautmem(&root)
        .arg("reindex")
        .assert()
        .success()
        .stdout(contains("Reindexed 2 facts"));
}

#[test]
fn test_shared_memory() {
    let root = TempDir::new().unwrap();

    jautmem(&root)
        .args(["shared", "event", "Server migration done", "--significance", "high"])
        .assert()
        .success();

    jautmem(&root)
        .args(["shared", "show"])
        .assert()
        .success()
        .stdout(contains("=== PLATFORM EVENTS ==="))
        .stdout(contains("(high)"))
        .stdout(contains("Server migration done"));
}

#[test]
fn test_invalid_agent_fails() {
    let root = TempDir::new().unwrap();

    jautmem(&root)
        .args(["log", "../escape", "nope"])
        .assert()
        .failure()
        .stderr(contains("Invalid agent name"));
}
