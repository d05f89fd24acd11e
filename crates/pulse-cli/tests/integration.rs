#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TODAY: &str = "2025-01-15";

fn pulse(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pulse").unwrap();
    cmd.current_dir(dir.path())
        .env("PULSE_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, rel: &str, content: &str) {
    let path = dir.path().join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(dir: &TempDir, rel: &str) -> String {
    std::fs::read_to_string(dir.path().join(rel)).unwrap()
}

fn project(id: &str, status: &str, start: &str, due: &str) -> String {
    format!(
        "---\nid: {id}\ntitle: Project {id}\nstatus: {status}\nstart_date: {start}\ndue_date: {due}\nestimated_workdays: 0\n---\n\n# Project {id}\n\n## Progress Report\nOn track.\n"
    )
}

fn team(dir: &TempDir) {
    write(
        dir,
        "people/team.md",
        "# Team Status\nPlatform squad\n\n---\n\n### Notes\n- written by hand\n",
    );
}

// ---------------------------------------------------------------------------
// pulse update
// ---------------------------------------------------------------------------

#[test]
fn update_bootstraps_region_with_all_categories() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    write(&dir, "projects/P001.md", &project("P001", "In-Progress", "2025-01-06", "2025-01-17"));

    pulse(&dir)
        .args(["update", "--today", TODAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 1 of 1 project files."))
        .stdout(predicate::str::contains("Updated people file: team.md"));

    let doc = read(&dir, "people/team.md");
    assert!(doc.starts_with("# Team Status\nPlatform squad\n\n---\n\n### Notes\n- written by hand\n\n\n<!-- AUTO_UPDATE_START -->\n"));
    assert!(doc.ends_with("<!-- AUTO_UPDATE_END -->\n"));
    assert_eq!(doc.matches("<!-- AUTO_UPDATE_START -->").count(), 1);
    assert!(doc.contains("### In-Progress Projects\n- P001 Project P001 (80%)\n  * On track.\n"));
    assert!(doc.contains("### Pending Projects\n- None\n"));
    assert!(doc.contains("### Completed Projects\n- None\n"));

    assert!(read(&dir, "projects/P001.md").contains("estimated_workdays: 10\n"));
}

#[test]
fn update_twice_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    write(&dir, "projects/P001.md", &project("P001", "In-Progress", "2025-01-06", "2025-01-17"));
    write(&dir, "projects/P002.md", &project("P002", "Completed", "2024-12-02", "2024-12-20"));

    pulse(&dir).args(["update", "--today", TODAY]).assert().success();
    let doc = read(&dir, "people/team.md");
    let p1 = read(&dir, "projects/P001.md");

    pulse(&dir)
        .args(["update", "--today", TODAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 0 of 2 project files."))
        .stdout(predicate::str::contains("People file unchanged: team.md"));

    assert_eq!(read(&dir, "people/team.md"), doc);
    assert_eq!(read(&dir, "projects/P001.md"), p1);
}

#[test]
fn update_orders_categories_by_file_name_descending() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    for id in ["P003", "P001", "P010"] {
        write(
            &dir,
            &format!("projects/{id}.md"),
            &project(id, "In-Progress", "2025-01-06", "2025-01-17"),
        );
    }

    pulse(&dir).args(["update", "--today", TODAY]).assert().success();

    let doc = read(&dir, "people/team.md");
    let p010 = doc.find("- P010 Project").unwrap();
    let p003 = doc.find("- P003 Project").unwrap();
    let p001 = doc.find("- P001 Project").unwrap();
    assert!(p010 < p003 && p003 < p001);
}

#[test]
fn update_reports_skipped_files() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    write(&dir, "projects/P001.md", &project("P001", "Pending", "2025-02-03", "2025-02-14"));
    write(&dir, "projects/draft.md", "just some notes\n");

    pulse(&dir)
        .args(["update", "--today", TODAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped 1 file(s):"))
        .stdout(predicate::str::contains("draft.md: no frontmatter header"));
}

#[test]
fn update_without_people_file_fails_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let original = project("P001", "In-Progress", "2025-01-06", "2025-01-17");
    write(&dir, "projects/P001.md", &original);

    pulse(&dir)
        .args(["update", "--today", TODAY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no markdown file found"));

    assert_eq!(read(&dir, "projects/P001.md"), original);
}

#[test]
fn update_with_two_people_files_fails() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    write(&dir, "people/other.md", "# Other\n");

    pulse(&dir)
        .args(["update", "--today", TODAY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected exactly one markdown file"));
}

#[test]
fn update_check_fails_until_files_are_current() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    write(&dir, "projects/P001.md", &project("P001", "Completed", "2025-01-06", "2025-01-10"));
    let before = read(&dir, "people/team.md");

    pulse(&dir)
        .args(["update", "--check", "--today", TODAY])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Would update 1 of 1 project files."))
        .stderr(predicate::str::contains("out of date"));
    assert_eq!(read(&dir, "people/team.md"), before);

    pulse(&dir).args(["update", "--today", TODAY]).assert().success();
    pulse(&dir)
        .args(["update", "--check", "--today", TODAY])
        .assert()
        .success();
}

#[test]
fn update_json_report() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    write(&dir, "projects/P001.md", &project("P001", "Pending", "2025-02-03", "2025-02-14"));

    let output = pulse(&dir)
        .args(["--json", "update", "--today", TODAY])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["scanned"], 1);
    assert_eq!(value["records"], 1);
    assert_eq!(value["document_changed"], true);
    assert_eq!(value["reference_date"], TODAY);
}

// ---------------------------------------------------------------------------
// pulse projects
// ---------------------------------------------------------------------------

#[test]
fn projects_lists_records_without_writing() {
    let dir = TempDir::new().unwrap();
    let original = project("P001", "In-Progress", "2025-01-06", "2025-01-17");
    write(&dir, "projects/P001.md", &original);

    pulse(&dir)
        .args(["projects", "--today", TODAY])
        .assert()
        .success()
        .stdout(predicate::str::contains("P001"))
        .stdout(predicate::str::contains("80%"));

    assert_eq!(read(&dir, "projects/P001.md"), original);
}

#[test]
fn projects_json_includes_progress() {
    let dir = TempDir::new().unwrap();
    write(&dir, "projects/P001.md", &project("P001", "Completed", "2025-01-06", "2025-01-17"));

    let output = pulse(&dir)
        .args(["-j", "projects", "--today", TODAY])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["projects"][0]["id"], "P001");
    assert_eq!(value["projects"][0]["progress"], 100);
    assert_eq!(value["projects"][0]["estimated_workdays"], 10);
}

// ---------------------------------------------------------------------------
// pulse present
// ---------------------------------------------------------------------------

fn failing_renderer_config(dir: &TempDir) {
    write(
        dir,
        "pulse.yaml",
        "diagram:\n  program: pulse-test-missing-renderer\n",
    );
}

#[test]
fn present_falls_back_to_text_when_renderer_fails() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    failing_renderer_config(&dir);
    write(&dir, "projects/P001.md", &project("P001", "In-Progress", "2025-01-06", "2025-01-17"));
    pulse(&dir).args(["update", "--today", TODAY]).assert().success();

    pulse(&dir)
        .arg("present")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saving presentation to: slides/team.md"))
        .stdout(predicate::str::contains("embedded as text"))
        .stdout(predicate::str::contains("Presentation created successfully."));

    let deck = read(&dir, "slides/team.md");
    assert!(deck.contains("marp: true"));
    assert!(deck.contains("# Team Status\n\nPlatform squad\n"));
    assert!(deck.contains("```text\ngantt\n"));
    assert!(deck.contains("P001 Project P001 :active, 2025-01-06, 2025-01-17"));
    assert!(deck.contains("## Notes\n\n- written by hand\n"));
}

#[test]
fn present_json_format_override() {
    let dir = TempDir::new().unwrap();
    team(&dir);
    failing_renderer_config(&dir);

    pulse(&dir)
        .args(["present", "--format", "json"])
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&read(&dir, "slides/team.json")).unwrap();
    assert_eq!(value["title"], "Team Status");
    assert_eq!(value["slides"][0]["title"], "Notes");
}

#[test]
fn present_without_people_file_fails() {
    let dir = TempDir::new().unwrap();
    pulse(&dir)
        .arg("present")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no markdown file found"));
    assert!(!dir.path().join("slides").exists());
}

// ---------------------------------------------------------------------------
// pulse config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults() {
    let dir = TempDir::new().unwrap();
    pulse(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_rejects_identical_markers() {
    let dir = TempDir::new().unwrap();
    write(&dir, "pulse.yaml", "markers:\n  start: \"<!-- X -->\"\n  end: \"<!-- X -->\"\n");
    pulse(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    pulse(&dir).args(["config", "init"]).assert().success();
    assert!(read(&dir, "pulse.yaml").contains("projects_dir: projects"));

    pulse(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
