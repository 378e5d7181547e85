use crate::utils;
use colored::Colorize;
use stackyard_core::{MANIFEST_FILE, StackManifest};
use std::path::PathBuf;

pub fn handle(workspace: Option<PathBuf>) -> anyhow::Result<()> {
    let workspace = utils::determine_workspace(workspace)?;
    let manifest = match StackManifest::load(&workspace.join(MANIFEST_FILE)) {
        Ok(manifest) => manifest,
        Err(e) => utils::exit_with_error("stack.yaml を読み込めません", &e),
    };

    if manifest.tasks.is_empty() {
        println!("{}", "タスクは定義されていません".yellow());
        return Ok(());
    }

    for task in &manifest.tasks {
        println!("{}", task.name.green());
    }
    Ok(())
}
