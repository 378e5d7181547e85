use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("YAMLパースエラー: {path}\n理由: {message}")]
    YamlParse { path: PathBuf, message: String },

    #[error("stack.yaml に {0} が定義されていません")]
    MissingRequiredManifestKey(String),

    #[error("環境変数 {0} が設定されていません")]
    UnresolvedInterpolationVariable(String),

    #[error(
        "無効なボリューム指定: '{0}'\nヒント: host:container[|owner[|group]] の形式で指定してください"
    )]
    InvalidVolumeSpec(String),

    #[error("無効なプロビジョナー指定: '{0}'")]
    InvalidProvisionerSpec(String),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error(
        "スタックルートが見つかりません\n探索開始位置: {0}\nヒント: stack.yaml ファイルを含むディレクトリで実行してください"
    )]
    StackRootNotFound(PathBuf),

    #[error("コンテナが見つかりません: {0}")]
    ContainerNotFound(String),

    #[error("タスクが見つかりません: {0}")]
    TaskNotFound(String),

    #[error("ワークスペース '{0}' は既に存在しますがディレクトリではありません")]
    WorkspaceNotDirectory(PathBuf),

    #[error(
        "{0} が存在しません\nヒント: VMディレクトリで '(sudo) vagrant ssh-config > ssh.conf' を実行してください"
    )]
    SshConfigMissing(PathBuf),
}

pub type Result<T> = std::result::Result<T, StackError>;
