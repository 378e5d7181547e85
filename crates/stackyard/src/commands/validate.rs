use crate::utils;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle(workspace: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let ctx = match utils::build_context(workspace) {
        Ok(ctx) => ctx,
        Err(e) => utils::exit_with_error("スタックを特定できません", &e),
    };
    utils::print_search_roots(&ctx);

    match stackyard_core::load_and_resolve(&ctx) {
        Ok(resolution) => {
            println!("{}", "✓ 設定ファイルは正常です！".green().bold());
            println!();
            println!("サマリー:");
            println!("  コンテナ: {}個", resolution.containers.len());
            for container in &resolution.containers {
                let image = container.config.image.as_deref().unwrap_or("(未設定)");
                println!("    - {} ({})", container.identity.cyan(), image);
            }
            if !resolution.vm_mounts.is_empty() {
                println!("  VMマウント: {}個", resolution.vm_mounts.len());
            }
            Ok(())
        }
        Err(e) => utils::exit_with_error("設定エラー", &e),
    }
}
