//! スタックの雛形生成

use crate::error::{Result, StackError};
use crate::model::MANIFEST_FILE;
use std::path::{Path, PathBuf};
use tracing::info;

/// 作業ディレクトリ名
pub const WORKDIR: &str = "workdir";

/// 雛形の stack.yaml
pub const MANIFEST_TEMPLATE: &str = r#"registry: local-registry.com
organization: myorganisation
dockers:
  consul:
setup:
  - "echo setup"
tests:
  before:
    - "echo before"
  run:
    - "echo run"
  after:
    - "echo after"
"#;

/// 雛形生成の結果
#[derive(Debug, Clone, Default)]
pub struct ScaffoldReport {
    /// 新規に作成したファイル・ディレクトリ
    pub created: Vec<PathBuf>,
}

/// ワークスペースにスタックの雛形を作成
///
/// 既存ファイルは上書きしない。
pub fn scaffold_stack(workspace: &Path) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();

    if workspace.exists() && !workspace.is_dir() {
        return Err(StackError::WorkspaceNotDirectory(workspace.to_path_buf()));
    }
    if !workspace.exists() {
        std::fs::create_dir_all(workspace)?;
        report.created.push(workspace.to_path_buf());
    }

    let manifest = workspace.join(MANIFEST_FILE);
    if !manifest.exists() {
        std::fs::write(&manifest, MANIFEST_TEMPLATE).map_err(|e| StackError::IoError {
            path: manifest.clone(),
            message: e.to_string(),
        })?;
        report.created.push(manifest);
    }

    let workdir = workspace.join(WORKDIR);
    if !workdir.exists() {
        std::fs::create_dir_all(&workdir)?;
        report.created.push(workdir);
    }

    info!(
        workspace = %workspace.display(),
        created = report.created.len(),
        "Stack scaffolded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StackManifest;
    use std::fs;

    #[test]
    fn test_scaffold_new_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let workspace = temp.path().join("shop");
        let report = scaffold_stack(&workspace).unwrap();
        assert_eq!(report.created.len(), 3);
        assert!(workspace.join("workdir").is_dir());

        let manifest = StackManifest::load(&workspace.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.organization, "myorganisation");
        assert_eq!(manifest.container_names().collect::<Vec<_>>(), vec!["consul"]);
        assert_eq!(manifest.tests.run, ["echo run"]);
    }

    #[test]
    fn test_scaffold_keeps_existing_manifest() {
        let temp = tempfile::tempdir().unwrap();
        let manifest = temp.path().join(MANIFEST_FILE);
        fs::write(&manifest, "registry: mine\n").unwrap();
        let report = scaffold_stack(temp.path()).unwrap();
        assert_eq!(report.created, vec![temp.path().join(WORKDIR)]);
        assert_eq!(fs::read_to_string(&manifest).unwrap(), "registry: mine\n");
    }

    #[test]
    fn test_scaffold_rejects_file_workspace() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            scaffold_stack(&file),
            Err(StackError::WorkspaceNotDirectory(_))
        ));
    }
}
