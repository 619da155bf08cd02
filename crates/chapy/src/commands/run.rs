use crate::Cli;
use crate::docker;
use chapy_config::resolve_plan;
use chapy_core::{
    Concurrency, Engine, Logger, NamingConvention, RunOptions, RuntimeEnvironment,
    UnmatchedPolicy,
};
use std::sync::Arc;
use tracing::info;

fn run_options(cli: &Cli) -> RunOptions {
    RunOptions {
        verbosity: cli.verbose,
        concurrency: Concurrency::from_level(cli.threads),
        dry_run: cli.dry_run,
        daemon: cli.daemon,
        naming: NamingConvention {
            compose_v1: cli.compose_v1,
            compose_v2: cli.compose_v2,
        },
        filter: cli.filter.clone(),
        on_unmatched: if cli.skip_unmatched {
            UnmatchedPolicy::SkipService
        } else {
            UnmatchedPolicy::AbortStage
        },
    }
}

/// プランを読み込んでステージを実行
///
/// コマンドの失敗は終了コードに影響しません。
pub async fn handle(cli: &Cli, env: RuntimeEnvironment, requested: &[String]) -> anyhow::Result<()> {
    let options = run_options(cli);
    let loaded = resolve_plan(&cli.argv, &env, options.explicit_filter())?;
    let stages = loaded.stages(requested);

    let directory = docker::connect_directory(&env).await?;
    let logger = Logger::new(&env);
    let engine = Engine::new(Arc::new(directory), Arc::new(env), options, logger);

    let summary = engine.run(&loaded.plan, &stages).await;
    info!(
        stages_run = summary.stages_run.len(),
        stages_missing = summary.stages_missing.len(),
        stages_aborted = summary.stages_aborted.len(),
        dispatched = summary.commands_dispatched,
        failed = summary.commands_failed,
        "Run finished"
    );
    Ok(())
}
