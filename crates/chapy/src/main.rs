mod commands;
mod docker;
mod utils;

use clap::{ArgAction, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cha", version)]
#[command(
    about = "ステージ定義に従って、稼働中のコンテナ群（またはホスト）でコマンドを実行します",
    long_about = None
)]
struct Cli {
    /// 稼働中のコンテナから設定ファイルのひな形を出力
    #[arg(short = 'C', long = "config")]
    config: bool,

    /// 実行内容を表示するだけで何もしない
    #[arg(short = 'D', long = "dryrun")]
    dry_run: bool,

    /// 実行時環境を表示
    #[arg(short = 'E', long = "environment")]
    environment: bool,

    /// ネットワーク構成をGraphviz DOT形式で出力
    #[arg(short = 'G', long = "graph")]
    graph: bool,

    /// 稼働中のコンテナ名を一覧表示
    #[arg(short = 'L', long = "list")]
    list: bool,

    /// プランファイルのステージを一覧表示
    #[arg(short = 'S', long = "list-stages")]
    list_stages: bool,

    /// ネットワーク構成にポートを含める
    #[arg(short = 'P', long = "ports")]
    ports: bool,

    /// ネットワーク構成をJSONで出力
    #[arg(short = 'T', long = "topology")]
    topology: bool,

    /// compose v1 向けにサービス名の '-' を '_' に変換
    #[arg(long = "composev1", visible_alias = "c1")]
    compose_v1: bool,

    /// compose v2 向けにサービス名の '_' を '-' に変換
    #[arg(long = "composev2", visible_alias = "c2")]
    compose_v2: bool,

    /// コマンドをバックグラウンドで実行
    #[arg(short, long)]
    daemon: bool,

    /// コンテナ名フィルタ
    #[arg(short, long)]
    filter: Option<String>,

    /// 実行するステージ（カンマ区切り）
    #[arg(short, long, default_value = "configure,run")]
    stages: String,

    /// 並行実行（-t: コンテナごと, -tt: サービスごとも）
    #[arg(short, long, action = ArgAction::Count)]
    threads: u8,

    /// 詳細出力（-v: コマンド出力, -vv: ステータス）
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// 一致するコンテナがないサービスはスキップして、ステージの残りを続行
    #[arg(long = "skip-unmatched")]
    skip_unmatched: bool,

    /// プランファイル（デフォルト: config.json）またはコマンド
    argv: Vec<String>,
}

impl Cli {
    fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or_default()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // ログはstderrに出力（RUST_LOG 未設定時は warn）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let env = chapy_config::load_environment(&cwd)?;

    // Docker不要のモード
    if cli.environment {
        return commands::environment::handle(&env);
    }
    if cli.list_stages {
        return commands::stages::handle(&cli.argv, &env);
    }

    let stages = utils::split_stages(&cli.stages);

    if cli.list {
        let directory = docker::connect_directory(&env).await?;
        return commands::list::handle(&directory, cli.filter(), cli.verbose).await;
    }
    if cli.topology || cli.ports {
        let directory = docker::connect_directory(&env).await?;
        return commands::topology::handle(&directory, &env, cli.filter(), cli.ports).await;
    }
    if cli.graph {
        let directory = docker::connect_directory(&env).await?;
        return commands::graph::handle(&directory, &env, cli.filter()).await;
    }
    if cli.config {
        let directory = docker::connect_directory(&env).await?;
        return commands::skeleton::handle(&directory, &env, &stages, cli.filter());
    }

    commands::run::handle(&cli, env, &stages).await
}
