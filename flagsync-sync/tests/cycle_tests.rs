//! End-to-end tests for the build→backup→write cycle.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use flagsync_core::{
    ChangeHandler, Evaluation, EvaluationClient, EvaluationContext, FlagKey,
};
use flagsync_sync::cycle;
use tempfile::TempDir;

/// In-memory evaluation client whose values can change between cycles.
struct FakeClient {
    values: Mutex<HashMap<String, String>>,
}

impl FakeClient {
    fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: Mutex::new(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("values lock")
            .insert(key.to_string(), value.to_string());
    }
}

impl EvaluationClient for FakeClient {
    fn evaluate(&self, key: &FlagKey, _context: &EvaluationContext) -> Evaluation {
        match self.values.lock().expect("values lock").get(key.as_str()) {
            Some(value) => Evaluation::Value(value.clone()),
            None => Evaluation::Failed {
                reason: "flag not found".to_string(),
            },
        }
    }

    fn subscribe(&self, _on_change: ChangeHandler) {}

    fn close(&self) {}
}

fn keys(names: &[&str]) -> Vec<FlagKey> {
    names.iter().map(|n| FlagKey::from(*n)).collect()
}

fn context() -> EvaluationContext {
    EvaluationContext::new("sample-daemon", "Daemon")
}

fn backups_in(dir: &TempDir, target_name: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.starts_with(&format!("{target_name}.")) && !name.ends_with(".tmp")
        })
        .collect();
    found.sort();
    found
}

#[test]
fn initial_sync_writes_all_keys_and_skips_backup() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let client = FakeClient::with(&[("A", "x")]);

    let outcome = cycle::run(&keys(&["A", "B"]), &client, &context(), &target, true)
        .expect("initial cycle");

    assert_eq!(
        std::fs::read_to_string(&target).expect("read target"),
        "A=x\nB=\n",
        "A evaluates, B fails to empty, in configured order"
    );
    assert!(outcome.backup_path.is_none(), "no backup without a prior file");
    assert!(backups_in(&dir, ".env").is_empty());
}

#[test]
fn steady_state_change_backs_up_prior_content_then_rewrites() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let client = FakeClient::with(&[("A", "x")]);
    let ks = keys(&["A"]);

    cycle::run(&ks, &client, &context(), &target, true).expect("initial cycle");
    client.set("A", "y");
    let outcome = cycle::run(&ks, &client, &context(), &target, true).expect("resync cycle");

    assert_eq!(std::fs::read_to_string(&target).expect("read target"), "A=y\n");
    let backup = outcome.backup_path.expect("backup created");
    assert_eq!(
        std::fs::read_to_string(&backup).expect("read backup"),
        "A=x\n",
        "backup must hold the pre-cycle content"
    );
}

#[test]
fn idempotent_resync_is_byte_identical_and_backs_up_equal_content() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let client = FakeClient::with(&[("A", "x"), ("B", "y")]);
    let ks = keys(&["A", "B"]);

    cycle::run(&ks, &client, &context(), &target, true).expect("first cycle");
    let before = std::fs::read_to_string(&target).expect("read before");

    let outcome = cycle::run(&ks, &client, &context(), &target, true).expect("second cycle");
    let after = std::fs::read_to_string(&target).expect("read after");

    assert_eq!(before, after, "no underlying change must reproduce the file");
    let backup = outcome.backup_path.expect("backup created");
    assert_eq!(
        std::fs::read_to_string(&backup).expect("read backup"),
        before,
        "backup contents must equal the pre-cycle file"
    );
}

#[test]
fn backups_disabled_short_circuits_but_write_proceeds() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let client = FakeClient::with(&[("A", "x")]);
    let ks = keys(&["A"]);

    cycle::run(&ks, &client, &context(), &target, false).expect("initial cycle");
    client.set("A", "y");
    let outcome = cycle::run(&ks, &client, &context(), &target, false).expect("resync cycle");

    assert_eq!(std::fs::read_to_string(&target).expect("read target"), "A=y\n");
    assert!(outcome.backup_path.is_none());
    assert!(
        backups_in(&dir, ".env").is_empty(),
        "no backup files when backups are disabled"
    );
}

#[test]
fn backup_exists_before_write_completes() {
    // Backup-before-write ordering: immediately after a cycle, a backup
    // reflecting the prior content exists alongside the rewritten target.
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let client = FakeClient::with(&[("A", "1")]);
    let ks = keys(&["A"]);

    cycle::run(&ks, &client, &context(), &target, true).expect("first cycle");
    client.set("A", "2");
    cycle::run(&ks, &client, &context(), &target, true).expect("second cycle");

    let backups = backups_in(&dir, ".env");
    assert_eq!(backups.len(), 1, "exactly one backup after the second cycle");
    assert_eq!(
        std::fs::read_to_string(&backups[0]).expect("read backup"),
        "A=1\n"
    );
}

#[cfg(unix)]
#[test]
fn failed_backup_warns_and_the_write_still_proceeds() {
    // A target that is a symlink to a directory: the copy for the backup
    // fails (the source reads as a directory), while the rename into place
    // still replaces the link with the freshly written file.
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let decoy = dir.path().join("decoy");
    std::fs::create_dir(&decoy).expect("mkdir");
    std::os::unix::fs::symlink(&decoy, &target).expect("symlink");

    let client = FakeClient::with(&[("A", "x")]);
    let outcome =
        cycle::run(&keys(&["A"]), &client, &context(), &target, true).expect("cycle succeeds");

    assert!(
        outcome.backup_path.is_none(),
        "a failed backup must yield no backup path"
    );
    assert!(backups_in(&dir, ".env").is_empty());
    assert_eq!(
        std::fs::read_to_string(&target).expect("read target"),
        "A=x\n",
        "the write must converge the target despite the failed backup"
    );
}

#[test]
fn values_needing_quotes_round_trip_through_a_cycle() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join(".env");
    let client = FakeClient::with(&[("GREETING", "hello world")]);

    cycle::run(&keys(&["GREETING"]), &client, &context(), &target, true).expect("cycle");

    assert_eq!(
        std::fs::read_to_string(&target).expect("read target"),
        "GREETING=\"hello world\"\n"
    );
}

#[test]
fn unwritable_target_fails_the_cycle() {
    let dir = TempDir::new().expect("tempdir");
    let target = dir.path().join("missing-dir-cannot-be-created");
    // Make the target path a directory so the rename into place fails.
    std::fs::create_dir_all(&target).expect("mkdir");

    let client = FakeClient::with(&[("A", "x")]);
    let err = cycle::run(&keys(&["A"]), &client, &context(), &target, true)
        .expect_err("writing over a directory must fail");
    let _ = err;
}
