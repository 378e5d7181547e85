use colored::Colorize;
use std::path::PathBuf;

pub fn handle(workspace: Option<PathBuf>) -> anyhow::Result<()> {
    let Some(workspace) = workspace else {
        anyhow::bail!(
            "ワークスペースが指定されていません: stackyard init --workspace <DIR> または DOCKERS_WORKSPACE=<DIR>"
        );
    };

    let report = stackyard_core::scaffold_stack(&workspace)?;
    if report.created.is_empty() {
        println!("{}", "既存のスタックです。変更はありません".yellow());
    } else {
        for path in &report.created {
            println!("  {} {}", "✓".green(), path.display());
        }
    }
    println!(
        "{} {}",
        "✓ スタックを初期化しました:".green().bold(),
        workspace.display().to_string().cyan()
    );
    Ok(())
}
