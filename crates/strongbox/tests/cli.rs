// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `strongbox` binary against a temp SQLite file.
//!
//! Each test writes its own config into an isolated temp directory. Tests are
//! independent and order-insensitive.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const MASTER_KEY: &str = "e2e-master-key";

struct Sandbox {
    dir: TempDir,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("strongbox.toml");
        let db = dir.path().join("data/vault.db");
        std::fs::write(
            &config,
            format!(
                "[backend]\nkind = \"sqlite\"\n\n[storage]\ndatabase_path = '{}'\n",
                db.display()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_strongbox"));
        cmd.arg("--config")
            .arg(&self.config)
            .args(args)
            .current_dir(self.dir.path())
            .env("STRONGBOX_MASTER_KEY", MASTER_KEY)
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env_remove("DB")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).stdin(Stdio::null()).output().unwrap()
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn full_lifecycle() {
    let sandbox = Sandbox::new();

    let generated = sandbox.run(&["generate", "db"]);
    assert!(generated.status.success(), "stderr: {}", stderr(&generated));
    let password = stdout(&generated).trim_end().to_string();
    assert_eq!(password.chars().count(), 12);
    assert!(sandbox.path().join("data/vault.db").exists());

    let set = sandbox.run_with_stdin(&["set", "db"], "hunter2\n");
    assert!(set.status.success(), "stderr: {}", stderr(&set));
    assert!(stdout(&set).contains("version 2"));

    let current = sandbox.run(&["get", "db"]);
    assert_eq!(stdout(&current), "hunter2\n");

    let history = sandbox.run(&["history", "db"]);
    let table = stdout(&history);
    assert_eq!(table.lines().count(), 3, "table: {table}");
    assert!(table.lines().nth(1).unwrap().starts_with('*'));

    let rollback = sandbox.run(&["rollback", "db", "1"]);
    assert!(rollback.status.success(), "stderr: {}", stderr(&rollback));
    assert_eq!(stdout(&sandbox.run(&["get", "db"])).trim_end(), password);
    assert_eq!(stdout(&sandbox.run(&["get", "db", "--version", "2"])), "hunter2\n");

    assert_eq!(stdout(&sandbox.run(&["services"])), "db\n");
}

#[test]
fn prompts_for_service_name_on_stdin() {
    let sandbox = Sandbox::new();
    let output = sandbox.run_with_stdin(&["generate", "--length", "20"], "api\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end().chars().count(), 20);
    assert_eq!(stdout(&sandbox.run(&["services"])), "api\n");
}

#[test]
fn missing_service_exits_nonzero() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["get", "ghost"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("not found"), "stderr: {}", stderr(&output));
}

#[test]
fn wrong_master_key_cannot_read() {
    let sandbox = Sandbox::new();
    assert!(sandbox.run(&["generate", "db"]).status.success());

    let output = sandbox
        .command(&["get", "db"])
        .env("STRONGBOX_MASTER_KEY", "not-the-key")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn missing_master_key_without_tty_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command(&["generate", "db"])
        .env_remove("STRONGBOX_MASTER_KEY")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("STRONGBOX_MASTER_KEY"));
}

#[test]
fn history_does_not_need_master_key() {
    let sandbox = Sandbox::new();
    assert!(sandbox.run(&["generate", "db"]).status.success());

    let output = sandbox
        .command(&["history", "db"])
        .env_remove("STRONGBOX_MASTER_KEY")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn unknown_config_key_exits_nonzero() {
    let sandbox = Sandbox::new();
    std::fs::write(&sandbox.config, "[generator]\nlenght = 16\n").unwrap();
    let output = sandbox.run(&["services"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("lenght"), "stderr: {}", stderr(&output));
}
