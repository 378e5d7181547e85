//! リモートVM向けコマンド生成

use crate::error::{Result, StackError};
use crate::model::StackPath;
use std::path::{Path, PathBuf};

/// Docker用VMのホスト名
pub const DOCKER_VM: &str = "docker-vm";

/// VMの ssh 設定ファイルパス
pub fn ssh_config_path(installation: &Path) -> PathBuf {
    installation
        .join("vm")
        .join(DOCKER_VM)
        .join("ssh.conf")
}

/// ローカルまたはVM上で実行するコマンド文字列を生成
///
/// `remote` が偽ならそのまま返す。真なら ssh 経由に包み、
/// コマンド中のホストパスはリモート表記に変換する。
pub fn remote_command(command: &str, installation: &Path, remote: bool) -> Result<String> {
    if !remote {
        return Ok(command.to_string());
    }

    let ssh_config = ssh_config_path(installation);
    if !ssh_config.is_file() {
        return Err(StackError::SshConfigMissing(ssh_config));
    }

    let translated = StackPath::host(command).to_remote();
    Ok(format!(
        "ssh -F {} {} {}",
        ssh_config.display(),
        DOCKER_VM,
        translated
    ))
}
