//! End-to-end tests driving the `cacheout` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A private cache directory plus a scratch directory for helper scripts
struct Env {
    cache: TempDir,
    scratch: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            cache: tempfile::Builder::new()
                .prefix("cacheout_cache_")
                .tempdir()
                .expect("Failed to create cache directory"),
            scratch: tempfile::Builder::new()
                .prefix("cacheout_test_")
                .tempdir()
                .expect("Failed to create scratch directory"),
        }
    }

    fn cacheout(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("cacheout").unwrap();
        cmd.env("CACHEOUT_CACHE_DIR", self.cache.path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn cache_files(&self) -> Vec<String> {
        fs::read_dir(self.cache.path())
            .map(|dir| {
                dir.map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(unix)]
    fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.scratch.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

#[cfg(unix)]
fn runs(counter: &std::path::Path) -> usize {
    fs::read_to_string(counter).map_or(0, |s| s.lines().count())
}

#[test]
fn test_echo_is_cached() {
    let env = Env::new();

    env.cacheout()
        .args(["echo", "hello"])
        .assert()
        .success()
        .stdout("hello\n");
    assert_eq!(env.cache_files().len(), 1);

    env.cacheout()
        .args(["echo", "hello"])
        .assert()
        .success()
        .stdout("hello\n");
    assert_eq!(env.cache_files().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_second_run_does_not_execute_again() {
    let env = Env::new();
    let counter = env.scratch.path().join("runs");
    let script = env.script("count.sh", "echo run >> \"$1\"\necho \"counted $1\"");
    let args = [script.to_str().unwrap(), counter.to_str().unwrap()];

    let first = env.cacheout().args(args).assert().success();
    let second = env.cacheout().args(args).assert().success();

    assert_eq!(first.get_output().stdout, second.get_output().stdout);
    assert_eq!(runs(&counter), 1);
}

#[cfg(unix)]
#[test]
fn test_zero_validity_executes_every_time() {
    let env = Env::new();
    let counter = env.scratch.path().join("runs");
    let script = env.script("count.sh", "echo run >> \"$1\"");
    let args = [script.to_str().unwrap(), counter.to_str().unwrap()];

    env.cacheout().args(["-V", "0"]).args(args).assert().success();
    env.cacheout().args(["-V", "0"]).args(args).assert().success();

    assert_eq!(runs(&counter), 2);
}

#[test]
fn test_command_flags_pass_through() {
    let env = Env::new();

    env.cacheout()
        .args(["echo", "-n", "hi"])
        .assert()
        .success()
        .stdout("hi");
}

#[test]
fn test_debug_logging_stays_off_stdout() {
    let env = Env::new();

    env.cacheout()
        .args(["-d", "echo", "hello"])
        .assert()
        .success()
        .stdout("hello\n")
        .stderr(predicate::str::contains("No cache file"));

    env.cacheout()
        .args(["--debug", "--log-format", "json", "echo", "hello"])
        .assert()
        .success()
        .stdout("hello\n")
        .stderr(predicate::str::contains("Cache file is valid"));
}

#[cfg(unix)]
#[test]
fn test_failing_command_is_shown_not_cached() {
    let env = Env::new();
    let script = env.script("fail.sh", "echo partial\nexit 3");

    env.cacheout()
        .arg(&script)
        .assert()
        .code(3)
        .stdout("partial\n")
        .stderr(predicate::str::contains("exited with status 3"));
    assert!(env.cache_files().is_empty(), "{:?}", env.cache_files());

    // Not replayed as a success on the next run
    env.cacheout().arg(&script).assert().code(3).stdout("partial\n");
}

#[test]
fn test_missing_program_fails() {
    let env = Env::new();

    env.cacheout()
        .arg("cacheout-no-such-program")
        .assert()
        .code(3)
        .stdout("")
        .stderr(predicate::str::contains("Failed to start"));
    assert!(env.cache_files().is_empty());
}

#[test]
fn test_empty_command_is_usage_error() {
    let env = Env::new();

    env.cacheout()
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("No command provided"));
}

#[test]
fn test_show_cache_path() {
    let env = Env::new();
    let root = env.cache.path().join("not-created");

    let assert = env
        .cacheout()
        .env("CACHEOUT_CACHE_DIR", &root)
        .arg("-C")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let printed = PathBuf::from(stdout.trim_end());
    assert!(printed.is_absolute());
    assert_eq!(printed, root);
    assert!(!root.exists());
}

#[test]
fn test_cache_dir_flag_overrides_env() {
    let env = Env::new();
    let other = env.scratch.path().join("other-cache");

    env.cacheout()
        .arg("--cache-dir")
        .arg(&other)
        .args(["echo", "elsewhere"])
        .assert()
        .success()
        .stdout("elsewhere\n");

    assert!(env.cache_files().is_empty());
    assert_eq!(fs::read_dir(&other).unwrap().count(), 1);
}

#[test]
fn test_delete_all_empties_cache_directory() {
    let env = Env::new();
    env.cacheout().args(["echo", "one"]).assert().success();
    env.cacheout().args(["echo", "two"]).assert().success();
    assert_eq!(env.cache_files().len(), 2);

    env.cacheout()
        .arg("-D")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Deleted 2 cached results"));

    assert!(env.cache.path().is_dir());
    assert!(env.cache_files().is_empty());

    // Directory is still writable
    env.cacheout()
        .args(["echo", "three"])
        .assert()
        .success()
        .stdout("three\n");
    assert_eq!(env.cache_files().len(), 1);
}

#[test]
fn test_list_shows_entries() {
    let env = Env::new();
    env.cacheout().args(["echo", "listed"]).assert().success();
    let key = env.cache_files().pop().unwrap();

    env.cacheout()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(key).and(predicate::str::ends_with("fresh\n")));
}

#[test]
fn test_recache_is_not_implemented() {
    let env = Env::new();

    env.cacheout()
        .arg("-r")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("Not Implemented"));
}

#[cfg(unix)]
#[test]
fn test_closed_stdout_is_quiet() {
    use std::io::{BufRead, BufReader};
    use std::process::Stdio;

    let env = Env::new();
    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_cacheout"))
        .env("CACHEOUT_CACHE_DIR", env.cache.path())
        .env_remove("RUST_LOG")
        .args(["seq", "1", "1000000"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // Read one line, then hang up like `head -1`
    let mut first = String::new();
    BufReader::new(child.stdout.take().unwrap())
        .read_line(&mut first)
        .unwrap();
    assert_eq!(first, "1\n");

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(
        output.stderr.is_empty(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(env.cache_files().is_empty(), "{:?}", env.cache_files());
}
