use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "DOCKERS_PATH が設定されていません\nヒント: Stackyard のインストール先ディレクトリを DOCKERS_PATH に設定してください"
    )]
    InstallationRootNotSet,

    #[error("DOCKERS_PATH がディレクトリを指していません: {0}")]
    InstallationRootNotDirectory(PathBuf),

    #[error("DOCKERS_WORKSPACE {0} ディレクトリが存在しません")]
    WorkspaceNotDirectory(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
