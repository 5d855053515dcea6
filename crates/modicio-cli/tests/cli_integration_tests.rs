//! CLI integration tests
//!
//! Drive the `modicio` binary end to end against a temporary SQLite store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SEED: &str = r#"
schema_version: 0
variant_name: todo-app

nodes:
  - name: Todo
    attributes:
      - name: Title
        d_type: String
      - name: TotalHours
        d_type: Integer
      - name: HoursWorked
        d_type: Integer
      - name: RemainingHours
        d_type: Integer
    scripts:
      - name: calculateRemainingHours
        action_type: write
        resolver: "{totalHours=TotalHours, hoursWorked=HoursWorked}"

  - name: Project
    compositions:
      - role: tasks
        target: Todo
        is_public: true
"#;

fn setup(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
    let seed_path = temp_dir.path().join("seed.yaml");
    fs::write(&seed_path, SEED).unwrap();
    (temp_dir.path().join("data").join("store.db"), seed_path)
}

fn run(temp_dir: &TempDir, db: &Path, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_modicio");
    Command::new(cli_bin)
        .current_dir(temp_dir.path())
        .args(args)
        .args(["--db", db.to_str().unwrap()])
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI")
}

fn run_ok(temp_dir: &TempDir, db: &Path, args: &[&str]) -> String {
    let output = run(temp_dir, db, args);
    assert!(
        output.status.success(),
        "`{}` should succeed. Stderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Value of the first `key: value` line
fn field(stdout: &str, key: &str) -> String {
    let prefix = format!("{}: ", key);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .unwrap_or_else(|| panic!("no '{}' in output:\n{}", key, stdout))
        .to_string()
}

#[test]
fn test_cli_seed_import_sets_reference() {
    // GIVEN a seed file and an empty store location
    let temp_dir = TempDir::new().unwrap();
    let (db, seed) = setup(&temp_dir);

    // WHEN importing it as the reference
    let stdout = run_ok(
        &temp_dir,
        &db,
        &["seed", "import", "--file", seed.to_str().unwrap(), "--reference"],
    );

    // THEN the store is created and the imported version is the reference
    assert!(db.exists());
    assert_eq!(field(&stdout, "nodes"), "2");
    assert_eq!(field(&stdout, "reference"), "true");

    let shown = run_ok(&temp_dir, &db, &["reference", "show"]);
    assert_eq!(field(&shown, "global_id"), field(&stdout, "global_id"));
}

#[test]
fn test_cli_evolve_and_list_versions() {
    // GIVEN an imported model
    let temp_dir = TempDir::new().unwrap();
    let (db, seed) = setup(&temp_dir);
    let imported = run_ok(
        &temp_dir,
        &db,
        &["seed", "import", "--file", seed.to_str().unwrap()],
    );
    let variant = field(&imported, "variant_id");
    let running = field(&imported, "running_id");

    // WHEN evolving it with a new class
    let evolved = run_ok(
        &temp_dir,
        &db,
        &[
            "evolve",
            "--variant",
            &variant,
            "--running",
            &running,
            "--request",
            "CREATE CLASS Milestone, OPEN CLASS Milestone, ADD ATTRIBUTE Deadline",
        ],
    );

    // THEN a new running version of the same variant holds three nodes
    assert_eq!(field(&evolved, "variant_id"), variant);
    assert_ne!(field(&evolved, "running_id"), running);
    assert_eq!(field(&evolved, "nodes"), "3");

    // AND the variant now lists two running versions
    let versions = run_ok(&temp_dir, &db, &["variant", "versions", "--variant", &variant]);
    assert_eq!(versions.lines().count(), 2);

    let variants = run_ok(&temp_dir, &db, &["variant", "list"]);
    assert_eq!(variants.lines().count(), 1);
    assert!(variants.contains("todo-app"));
}

#[test]
fn test_cli_instance_script_roundtrip() {
    // GIVEN a reference model
    let temp_dir = TempDir::new().unwrap();
    let (db, seed) = setup(&temp_dir);
    run_ok(
        &temp_dir,
        &db,
        &["seed", "import", "--file", seed.to_str().unwrap(), "--reference"],
    );

    // WHEN creating a Todo and setting its hours
    let created = run_ok(
        &temp_dir,
        &db,
        &[
            "instance",
            "create",
            "--node",
            "modicio:Todo",
            "--name",
            "laundry",
            "--uri",
            "inst:laundry",
        ],
    );
    let data_id = field(&created, "data_id");
    let updated = run_ok(
        &temp_dir,
        &db,
        &[
            "instance",
            "set",
            "--id",
            &data_id,
            "--value",
            "TotalHours=8",
            "--value",
            "HoursWorked=3",
        ],
    );
    let updated_id = field(&updated, "data_id");

    // AND running the remaining-hours script
    let script = run_ok(
        &temp_dir,
        &db,
        &["script", "run", "--id", &updated_id, "--name", "calculateRemainingHours"],
    );

    // THEN the result is written and stored
    assert_eq!(field(&script, "RemainingHours"), "5");
    let shown = run_ok(
        &temp_dir,
        &db,
        &["instance", "show", "--id", &field(&script, "data_id")],
    );
    let json: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(json["uri"], "inst:laundry");

    // AND the instance is found by type
    let found = run_ok(&temp_dir, &db, &["instance", "find", "--type", "todo"]);
    assert_eq!(found.lines().count(), 1);
    assert!(found.contains("inst:laundry"));
}

#[test]
fn test_cli_errors_exit_nonzero() {
    // GIVEN an empty store
    let temp_dir = TempDir::new().unwrap();
    let (db, _seed) = setup(&temp_dir);

    // WHEN asking for a reference that was never set
    let output = run(&temp_dir, &db, &["reference", "show"]);

    // THEN the command fails with an error message
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));

    // AND evolving a version that does not exist fails too
    let output = run(
        &temp_dir,
        &db,
        &[
            "evolve",
            "--variant",
            "missing",
            "--running",
            "missing",
            "--request",
            "CREATE CLASS X",
        ],
    );
    assert!(!output.status.success());
}
