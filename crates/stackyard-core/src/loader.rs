//! 設定ファイルローダー
//!
//! `dockers/<name>/docker.yaml` をワークスペースとインストール先の2箇所から探します。
//! ファイルが無いことはエラーではなく「寄与なし」として扱います。

use crate::error::{Result, StackError};
use crate::merge::merge;
use crate::model::{Node, UNMERGABLE_KEYS};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// コンテナ定義ディレクトリ
pub const DOCKERS_DIR: &str = "dockers";

/// コンテナ定義ファイル名
pub const DOCKER_FILE: &str = "docker.yaml";

/// グローバルデフォルトのディレクトリ名
pub const GLOBAL_DEFAULTS: &str = "defaults";

/// YAMLファイルを読み込む
///
/// ファイルが存在しなければ `Ok(None)`。空ファイルは空マッピング。
pub fn load_yaml(path: &Path) -> Result<Option<Node>> {
    if !path.is_file() {
        debug!(file = %path.display(), "Config file not found, skipping");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| StackError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| StackError::YamlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let node = match Node::try_from(value)? {
        node if node.is_null() => Node::empty_map(),
        node @ Node::Map(_) => node,
        _ => {
            return Err(StackError::InvalidConfig(format!(
                "{} のトップレベルはマッピングである必要があります",
                path.display()
            )));
        }
    };

    debug!(file = %path.display(), "Loaded config file");
    Ok(Some(node))
}

/// 設定ファイルの探索ルート
#[derive(Debug, Clone)]
pub struct SearchRoots {
    /// ワークスペース（スタックディレクトリ）
    pub workspace: PathBuf,
    /// インストール先
    pub installation: PathBuf,
}

impl SearchRoots {
    /// 相対パスはカレントディレクトリ基準の絶対パスに変換される
    pub fn new(workspace: impl Into<PathBuf>, installation: impl Into<PathBuf>) -> Self {
        Self {
            workspace: absolute_root(workspace.into()),
            installation: absolute_root(installation.into()),
        }
    }

    /// ワークスペース側のファイルパス
    pub fn workspace_file(&self, name: &str) -> PathBuf {
        docker_file(&self.workspace, name)
    }

    /// インストール先側のファイルパス
    pub fn installation_file(&self, name: &str) -> PathBuf {
        docker_file(&self.installation, name)
    }

    /// 名前に対応する定義ファイルを2箇所から読み込み、
    /// インストール先 → ワークスペースの順に重ねた結果を返す
    ///
    /// どちらも存在しなければ `Ok(None)`。
    #[tracing::instrument(skip(self))]
    pub fn load_layers(&self, name: &str) -> Result<Option<Node>> {
        let installation = load_yaml(&self.installation_file(name))?;
        let workspace = load_yaml(&self.workspace_file(name))?;

        let layered = match (installation, workspace) {
            (Some(base), Some(overlay)) => Some(merge(&base, &overlay, UNMERGABLE_KEYS)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        };

        if layered.is_some() {
            info!(name = %name, "Loaded container config layers");
        }
        Ok(layered)
    }

    /// 探索ルートが存在するか確認
    pub fn check(&self) {
        for (label, root) in [
            ("workspace", &self.workspace),
            ("installation", &self.installation),
        ] {
            if !root.is_dir() {
                warn!(root = %root.display(), kind = label, "Search root is not a directory");
            }
        }
    }
}

/// 絶対パス化し、`.` と `..` を字句的に解決する
fn absolute_root(path: PathBuf) -> PathBuf {
    let absolute = match std::path::absolute(&path) {
        Ok(absolute) => absolute,
        Err(e) => {
            warn!(root = %path.display(), error = %e, "Cannot make search root absolute");
            return path;
        }
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

fn docker_file(root: &Path, name: &str) -> PathBuf {
    root.join(DOCKERS_DIR).join(name).join(DOCKER_FILE)
}
