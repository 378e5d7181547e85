mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackyard")]
#[command(about = "stack.yaml を解決し、起動可能なコンテナ定義を生成する", long_about = None)]
struct Cli {
    /// スタックのワークスペースディレクトリ
    #[arg(short, long, global = true, env = "DOCKERS_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// スタックを解決してコンテナ定義を表示
    Resolve {
        /// 対象のコンテナ（指定しない場合は全コンテナ）
        #[arg(short = 'n', long)]
        container: Option<String>,
        /// JSON形式で出力
        #[arg(long)]
        json: bool,
    },
    /// 設定を検証
    Validate,
    /// stack.yaml に定義されたタスクを表示
    Tasks,
    /// ワークスペースにスタックの雛形を作成
    Init,
    /// バージョン情報を表示
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrへ（stdoutはJSON出力に使う）
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("stackyard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Init => commands::init::handle(cli.workspace),
        Commands::Tasks => commands::tasks::handle(cli.workspace),
        Commands::Validate => commands::validate::handle(cli.workspace),
        Commands::Resolve { container, json } => {
            commands::resolve::handle(cli.workspace, container, json)
        }
    }
}
