#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const MANIFEST: &str = r#"
registry: local-registry.com
organization: acme
dockers:
  web:
    ports: ["80:80"]
  worker:
    privileged: true
tasks:
  migrate:
    - ./migrate.sh
  seed:
    - ./seed.sh
"#;

/// ワークスペースとインストール先を用意
fn setup(manifest: &str) -> (TempDir, PathBuf, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let workspace = root.path().join("shop");
    let installation = root.path().join("install");
    fs::create_dir_all(&workspace).unwrap();
    fs::create_dir_all(&installation).unwrap();
    fs::write(workspace.join("stack.yaml"), manifest).unwrap();
    (root, workspace, installation)
}

fn stackyard(workspace: &PathBuf, installation: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("stackyard").unwrap();
    cmd.env("DOCKERS_PATH", installation)
        .env("DOCKERS_WORKSPACE", workspace)
        .env_remove("VAGRANT_NAMESPACE")
        .env_remove("VAGRANT_STACK_NETWORK")
        .env_remove("VAGRANT_FORCE_VM");
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("stackyard").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("tasks"))
        .stdout(predicate::str::contains("init"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("stackyard").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackyard"));
}

/// resolve --json でランチャー向けの一式が出力される
#[test]
fn test_resolve_json() {
    let (_root, workspace, installation) = setup(MANIFEST);
    let output = stackyard(&workspace, &installation)
        .args(["resolve", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stack"], "shop");
    assert_eq!(json["containers"][0]["identity"], "shop-web");
    assert_eq!(json["containers"][0]["image"], "acme/web");
    assert_eq!(json["containers"][0]["ports"][0], "80:80");
    let worker_args = json["containers"][1]["create_args"].as_array().unwrap();
    assert!(worker_args.iter().any(|a| a == "--privileged"));
    assert!(worker_args.iter().any(|a| a == "container:shop"));
}

/// 名前空間付きで識別子が変わる
#[test]
fn test_resolve_with_namespace() {
    let (_root, workspace, installation) = setup(MANIFEST);
    stackyard(&workspace, &installation)
        .env("VAGRANT_NAMESPACE", "dev")
        .args(["resolve", "-n", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shop-web-dev"))
        .stdout(predicate::str::contains("shop-worker-dev").not());
}

/// `--workspace .` でもディレクトリ名がスタック名になる
#[test]
fn test_resolve_relative_workspace() {
    let (_root, workspace, installation) = setup(
        "registry: r\norganization: acme\ndockers:\n  web:\n    volumes: ['./data:/data']\n",
    );
    let output = stackyard(&workspace, &installation)
        .current_dir(&workspace)
        .args(["--workspace", ".", "resolve", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stack"], "shop");
    assert_eq!(json["containers"][0]["identity"], "shop-web");
    let volume = json["containers"][0]["volumes"][0].as_str().unwrap();
    assert!(volume.starts_with('/'), "{}", volume);
    assert!(volume.ends_with("/shop/data:/data"), "{}", volume);
    let args = json["containers"][0]["create_args"].as_array().unwrap();
    assert!(args.iter().any(|a| a == "container:shop"));
}

/// 未定義の変数は非ゼロ終了
#[test]
fn test_resolve_unresolved_variable_fails() {
    let (_root, workspace, installation) = setup(
        "registry: r\norganization: o\ndockers:\n  web:\n    volumes: ['${STACKYARD_TEST_UNSET_VAR}:/x']\n",
    );
    stackyard(&workspace, &installation)
        .env_remove("STACKYARD_TEST_UNSET_VAR")
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("STACKYARD_TEST_UNSET_VAR"));
}

/// validate は必須キーの欠落を検出する
#[test]
fn test_validate_missing_key() {
    let (_root, workspace, installation) = setup("registry: r\ndockers: {}\n");
    stackyard(&workspace, &installation)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("organization"));
}

/// tasks は記述順にタスク名を表示する
#[test]
fn test_tasks_listing() {
    let (_root, workspace, installation) = setup(MANIFEST);
    stackyard(&workspace, &installation)
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::is_match("(?s)migrate.*seed").unwrap());
}

/// init で雛形が作成される
#[test]
fn test_init_scaffolds_stack() {
    let root = tempfile::tempdir().unwrap();
    let workspace = root.path().join("new-stack");
    let mut cmd = Command::cargo_bin("stackyard").unwrap();
    cmd.arg("init")
        .arg("--workspace")
        .arg(&workspace)
        .assert()
        .success();
    assert!(workspace.join("stack.yaml").is_file());
    assert!(workspace.join("workdir").is_dir());
}
