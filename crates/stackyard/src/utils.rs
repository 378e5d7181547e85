use anyhow::Context;
use colored::Colorize;
use stackyard_config::Settings;
use stackyard_core::{EnvBinding, Namespace, ResolutionContext, SearchRoots};
use std::path::{Path, PathBuf};

/// ワークスペースを決定する
///
/// 1. --workspace / DOCKERS_WORKSPACE
/// 2. カレントディレクトリから上に向かって stack.yaml を探す
pub fn determine_workspace(workspace: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match workspace {
        Some(path) => {
            if !path.is_dir() {
                anyhow::bail!(stackyard_config::ConfigError::WorkspaceNotDirectory(path));
            }
            Ok(path)
        }
        None => {
            let current = std::env::current_dir().context("カレントディレクトリを取得できません")?;
            Ok(stackyard_core::find_stack_root(&current, None)?)
        }
    }
}

/// 環境変数とワークスペースから解決コンテキストを構築
pub fn build_context(workspace: Option<PathBuf>) -> anyhow::Result<ResolutionContext> {
    let settings = Settings::from_env()?;
    let workspace = match workspace {
        Some(path) => Some(path),
        None => settings.existing_workspace()?.map(Path::to_path_buf),
    };
    let workspace = determine_workspace(workspace)?;

    let ctx = ResolutionContext::new(
        SearchRoots::new(&workspace, &settings.installation),
        EnvBinding::from_process(),
    )
    .with_namespace(Namespace::from_binding(settings.namespace.as_deref()))
    .with_network_disabled(settings.disable_network)
    .with_force_vm(settings.force_vm);

    tracing::debug!(
        stack = %ctx.stack,
        namespace = %ctx.namespace,
        network = ctx.network_enabled(),
        force_vm = ctx.force_vm,
        "Resolution context ready"
    );
    Ok(ctx)
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_search_roots(ctx: &ResolutionContext) {
    println!("📄 探索ルート:");
    print_root("ワークスペース", &ctx.roots.workspace);
    print_root("インストール先", &ctx.roots.installation);
}

fn print_root(label: &str, path: &Path) {
    println!("  • {} {}", label, path.display().to_string().cyan());
}

/// 致命的エラーを表示して終了
pub fn exit_with_error(title: &str, error: &dyn std::fmt::Display) -> ! {
    eprintln!();
    eprintln!("{}", format!("✗ {}", title).red().bold());
    eprintln!("  {}", error);
    std::process::exit(1);
}
