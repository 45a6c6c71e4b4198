use assert_cmd::Command;
use predicates::prelude::*;

fn pncview() -> Command {
    let mut cmd = Command::cargo_bin("pncview").unwrap();
    cmd.env_remove("PNCVIEW_TASKS_URL")
        .env_remove("PNCVIEW_PNC_URL")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_dump_from_file() {
    pncview()
        .args(["--file", "tests/fixtures/tasks.json", "--dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"A-B\""))
        .stdout(predicate::str::contains("\"style_class\": \"waiting-neutral\""))
        .stdout(predicate::str::contains("\"Total\": 2"));
}

#[test]
fn test_dump_uses_pnc_url() {
    pncview()
        .args([
            "--file",
            "tests/fixtures/tasks.json",
            "--dump",
            "--pnc-url",
            "https://pnc.example.com",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://pnc.example.com/pnc-web/#/builds/A"));
}

#[test]
fn test_dump_missing_file_prints_empty_graph() {
    pncview()
        .args(["--file", "tests/fixtures/does-not-exist.json", "--dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\": []"));
}

#[test]
fn test_rejects_unknown_direction() {
    pncview()
        .args(["--direction", "diagonal", "--dump"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("diagonal"));
}
