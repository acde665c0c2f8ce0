use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const SAMPLE: &str = r#"diff --git a/src/app.rs b/src/app.rs
index 1111111..2222222 100644
--- a/src/app.rs
+++ b/src/app.rs
@@ -1,3 +1,4 @@
 fn main() {
-    run();
+    init();
+    run();
 }
diff --git a/logo.png b/logo.png
index 3333333..4444444 100644
Binary files a/logo.png and b/logo.png differ
diff --git a/old.txt b/new.txt
similarity index 92%
rename from old.txt
rename to new.txt
"#;

fn diffscan() -> Command {
    Command::cargo_bin("diffscan").unwrap()
}

#[test]
fn stats_from_stdin() {
    diffscan()
        .arg("stats")
        .write_stdin(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files:         3"))
        .stdout(predicate::str::contains("Lines added:   2"))
        .stdout(predicate::str::contains("Lines removed: 1"));
}

#[test]
fn stats_as_json_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("change.diff");
    fs::write(&path, SAMPLE).unwrap();

    let output = diffscan()
        .args(["stats", "--format", "json", "--file"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: diffscan::DiffStats = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats.files, 3);
    assert_eq!(stats.lines_added, 2);
    assert_eq!(stats.lines_removed, 1);
}

#[test]
fn files_lists_status_and_flags() {
    diffscan()
        .arg("files")
        .write_stdin(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("M src/app.rs"))
        .stdout(predicate::str::contains("M logo.png [binary]"))
        .stdout(predicate::str::contains("R old.txt -> new.txt (92% similar)"));
}

#[test]
fn added_lines_text() {
    diffscan()
        .arg("added")
        .write_stdin(SAMPLE)
        .assert()
        .success()
        .stdout("src/app.rs:2:     init();\nsrc/app.rs:3:     run();\n");
}

#[test]
fn removed_lines_json() {
    let output = diffscan()
        .args(["removed", "-o", "json"])
        .write_stdin(SAMPLE)
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: Vec<diffscan::LineInfo> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].file, "src/app.rs");
    assert_eq!(lines[0].line, 1);
    assert_eq!(lines[0].content, "    run();");
}

#[test]
fn key_is_stable_across_runs() {
    let first = diffscan().arg("key").write_stdin(SAMPLE).output().unwrap();
    let second = diffscan().arg("key").write_stdin(SAMPLE).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let key = String::from_utf8(first.stdout).unwrap();
    let expected = diffscan::fingerprint::cache_key(&diffscan::parse_diff(SAMPLE).unwrap()).unwrap();
    assert_eq!(key.trim(), expected);
}

#[test]
fn dump_json_round_trips_to_model() {
    let output = diffscan()
        .args(["dump", "-o", "json"])
        .write_stdin(SAMPLE)
        .output()
        .unwrap();
    assert!(output.status.success());

    let diff: diffscan::Diff = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(diff, diffscan::parse_diff(SAMPLE).unwrap());
}

#[test]
fn hunks_report_hash_prefix() {
    let diff = diffscan::parse_diff(SAMPLE).unwrap();
    let hash = diffscan::fingerprint::hunk_hash(&diff.files[0].hunks[0]);

    diffscan()
        .arg("hunks")
        .write_stdin(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "src/app.rs @@ -1,3 +1,4 @@ {}",
            &hash[..12]
        )));
}

#[test]
fn empty_input_fails() {
    diffscan()
        .arg("stats")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty diff content"));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    diffscan()
        .args(["stats", "--file"])
        .arg(dir.path().join("nope.diff"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn invalid_utf8_is_a_read_error() {
    diffscan()
        .arg("stats")
        .write_stdin(&b"diff --git a/f b/f\n\xff\n"[..])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading diff"));
}
