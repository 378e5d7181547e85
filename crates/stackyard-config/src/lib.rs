pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// インストール先ディレクトリ
pub const ENV_INSTALLATION: &str = "DOCKERS_PATH";
/// ワークスペース（スタック）ディレクトリ
pub const ENV_WORKSPACE: &str = "DOCKERS_WORKSPACE";
/// 名前空間
pub const ENV_NAMESPACE: &str = "VAGRANT_NAMESPACE";
/// `false` でネットワーク共有を無効化（名前空間未指定時のみ）
pub const ENV_STACK_NETWORK: &str = "VAGRANT_STACK_NETWORK";
/// `true` でリモートVM実行を強制
pub const ENV_FORCE_VM: &str = "VAGRANT_FORCE_VM";

/// 環境変数から読み込んだ実行設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub installation: PathBuf,
    pub workspace: Option<PathBuf>,
    pub namespace: Option<String>,
    pub disable_network: bool,
    pub force_vm: bool,
}

impl Settings {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から読み込む
    ///
    /// インストール先は以下の優先順位で決定:
    /// 1. 環境変数 DOCKERS_PATH
    /// 2. データディレクトリ (~/.local/share/stackyard など) が存在すればそこ
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let installation = match non_empty(ENV_INSTALLATION) {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.is_dir() {
                    return Err(ConfigError::InstallationRootNotDirectory(path));
                }
                path
            }
            None => default_installation_root().ok_or(ConfigError::InstallationRootNotSet)?,
        };

        Ok(Self {
            installation,
            workspace: non_empty(ENV_WORKSPACE).map(PathBuf::from),
            namespace: non_empty(ENV_NAMESPACE),
            disable_network: lookup(ENV_STACK_NETWORK).as_deref() == Some("false"),
            force_vm: lookup(ENV_FORCE_VM).as_deref() == Some("true"),
        })
    }

    /// ワークスペースが指定されていれば、ディレクトリであることを確認して返す
    pub fn existing_workspace(&self) -> Result<Option<&Path>> {
        match &self.workspace {
            Some(path) if !path.is_dir() => Err(ConfigError::WorkspaceNotDirectory(path.clone())),
            Some(path) => Ok(Some(path.as_path())),
            None => Ok(None),
        }
    }
}

/// 既定のインストール先（存在する場合のみ）
pub fn default_installation_root() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("stackyard"))
        .filter(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_full() {
        let install = tempfile::tempdir().unwrap();
        let path = install.path().to_str().unwrap();
        let settings = Settings::from_lookup(lookup(&[
            (ENV_INSTALLATION, path),
            (ENV_WORKSPACE, "/srv/stack"),
            (ENV_NAMESPACE, "ci"),
            (ENV_STACK_NETWORK, "false"),
            (ENV_FORCE_VM, "true"),
        ]))
        .unwrap();

        assert_eq!(settings.installation, install.path());
        assert_eq!(settings.workspace, Some(PathBuf::from("/srv/stack")));
        assert_eq!(settings.namespace.as_deref(), Some("ci"));
        assert!(settings.disable_network);
        assert!(settings.force_vm);
    }

    #[test]
    fn test_flags_require_exact_values() {
        let install = tempfile::tempdir().unwrap();
        let settings = Settings::from_lookup(lookup(&[
            (ENV_INSTALLATION, install.path().to_str().unwrap()),
            (ENV_STACK_NETWORK, "no"),
            (ENV_FORCE_VM, "yes"),
            (ENV_NAMESPACE, ""),
        ]))
        .unwrap();

        assert!(!settings.disable_network);
        assert!(!settings.force_vm);
        assert_eq!(settings.namespace, None);
        assert_eq!(settings.workspace, None);
    }

    #[test]
    fn test_installation_must_be_directory() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, "").unwrap();
        let result = Settings::from_lookup(lookup(&[(ENV_INSTALLATION, file.to_str().unwrap())]));
        assert!(matches!(
            result,
            Err(ConfigError::InstallationRootNotDirectory(_))
        ));
    }

    #[test]
    fn test_existing_workspace() {
        let install = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        let settings = Settings::from_lookup(lookup(&[
            (ENV_INSTALLATION, install.path().to_str().unwrap()),
            (ENV_WORKSPACE, workspace.path().to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(settings.existing_workspace().unwrap(), Some(workspace.path()));

        let missing = Settings {
            workspace: Some(workspace.path().join("missing")),
            ..settings
        };
        assert!(matches!(
            missing.existing_workspace(),
            Err(ConfigError::WorkspaceNotDirectory(_))
        ));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let install = tempfile::tempdir().unwrap();

        // 環境変数を設定
        unsafe {
            std::env::set_var(ENV_INSTALLATION, install.path());
            std::env::set_var(ENV_NAMESPACE, "env-test");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.installation, install.path());
        assert_eq!(settings.namespace.as_deref(), Some("env-test"));

        // クリーンアップ
        unsafe {
            std::env::remove_var(ENV_INSTALLATION);
            std::env::remove_var(ENV_NAMESPACE);
        }
    }
}
