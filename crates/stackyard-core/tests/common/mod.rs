use stackyard_core::{EnvBinding, Namespace, ResolutionContext, SearchRoots};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// ワークスペース (`<tmp>/<stack>`) とインストール先を持つテスト用スタック
pub struct TestStack {
    _root: TempDir,
    pub workspace: PathBuf,
    pub installation: PathBuf,
}

impl TestStack {
    pub fn new(stack: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        let workspace = root.path().join(stack);
        let installation = root.path().join("install");
        fs::create_dir_all(&workspace).unwrap();
        fs::create_dir_all(&installation).unwrap();
        Self {
            _root: root,
            workspace,
            installation,
        }
    }

    pub fn write_manifest(&self, content: &str) {
        fs::write(self.workspace.join("stack.yaml"), content).unwrap();
    }

    pub fn write_workspace_docker(&self, name: &str, content: &str) {
        write_docker(&self.workspace, name, content);
    }

    #[allow(dead_code)]
    pub fn write_installation_docker(&self, name: &str, content: &str) {
        write_docker(&self.installation, name, content);
    }

    pub fn context(&self, env: EnvBinding) -> ResolutionContext {
        ResolutionContext::new(
            SearchRoots::new(&self.workspace, &self.installation),
            env,
        )
    }

    #[allow(dead_code)]
    pub fn context_with_namespace(&self, namespace: Option<&str>) -> ResolutionContext {
        self.context(EnvBinding::new())
            .with_namespace(Namespace::from_binding(namespace))
    }
}

fn write_docker(root: &Path, name: &str, content: &str) {
    let dir = root.join("dockers").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("docker.yaml"), content).unwrap();
}
