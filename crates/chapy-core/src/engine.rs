//! ステージ実行エンジン
//!
//! ステージ → サービス → コンテナ → コマンドの順に展開して実行します。
//!
//! - ステージは要求された順に、前のステージが完全に終わってから実行
//! - サービスは `Concurrency::PerService` のとき並行
//! - コンテナは `Concurrency::PerContainer` 以上のとき並行
//! - 1つの対象に対するコマンド列は常に定義順に逐次実行

use crate::env::RuntimeEnvironment;
use crate::fanout::fan_out;
use crate::filter::{ResolvedFilter, resolve_filter};
use crate::host::LocalHost;
use crate::logger::{Logger, indent};
use crate::model::{RunMode, RunOptions, Stage, StagePlan, UnmatchedPolicy};
use crate::target::{ContainerDirectory, ContainerHandle};
use crate::template::{resolve, unresolved};
use std::iter::Sum;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// コマンドの実行件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// 実行（またはデタッチ起動）したコマンド数
    pub dispatched: usize,
    /// 失敗したコマンド数
    pub failed: usize,
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Self {
        iter.fold(Tally::default(), |acc, t| Tally {
            dispatched: acc.dispatched + t.dispatched,
            failed: acc.failed + t.failed,
        })
    }
}

/// 実行結果のまとめ
///
/// 失敗はここに集計されるだけで、呼び出し元の終了コードには影響しません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stages_run: Vec<String>,
    pub stages_missing: Vec<String>,
    /// コンテナ未マッチで途中中止したステージ
    pub stages_aborted: Vec<String>,
    pub commands_dispatched: usize,
    pub commands_failed: usize,
}

impl RunSummary {
    fn record(&mut self, stage: &str, outcome: StageOutcome) {
        self.stages_run.push(stage.to_string());
        if outcome.aborted {
            self.stages_aborted.push(stage.to_string());
        }
        self.commands_dispatched += outcome.tally.dispatched;
        self.commands_failed += outcome.tally.failed;
    }
}

struct StageOutcome {
    tally: Tally,
    aborted: bool,
}

enum Targets {
    Host,
    Containers(Vec<ContainerHandle>),
}

enum ServiceStep {
    Run {
        service: String,
        resolved: ResolvedFilter,
        commands: Arc<[String]>,
        targets: Targets,
    },
    Unmatched,
}

struct EngineContext {
    directory: Arc<dyn ContainerDirectory>,
    env: Arc<RuntimeEnvironment>,
    options: RunOptions,
    logger: Logger,
}

/// ステージ実行エンジン
pub struct Engine {
    ctx: Arc<EngineContext>,
}

impl Engine {
    /// エンジンを作成
    ///
    /// ロガーの詳細度は `options` から決まります（ドライラン時は最低2）。
    pub fn new(
        directory: Arc<dyn ContainerDirectory>,
        env: Arc<RuntimeEnvironment>,
        options: RunOptions,
        logger: Logger,
    ) -> Self {
        let logger = logger.with_verbosity(options.effective_verbosity());
        Self {
            ctx: Arc::new(EngineContext {
                directory,
                env,
                options,
                logger,
            }),
        }
    }

    /// 要求されたステージを順に実行
    ///
    /// プランに存在しないステージは診断メッセージを出して次へ進みます。
    #[instrument(skip_all, fields(stages = ?stages))]
    pub async fn run(&self, plan: &StagePlan, stages: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();

        for name in stages {
            self.ctx
                .logger
                .status(&format!("Stage: {name}"), indent::STAGE);

            let Some(stage) = plan.stage(name) else {
                self.ctx
                    .logger
                    .diagnostic(&format!("stage not found: `{name}'"));
                summary.stages_missing.push(name.clone());
                continue;
            };

            let outcome = self.run_stage(stage).await;
            summary.record(name, outcome);
        }

        info!(
            stages = summary.stages_run.len(),
            dispatched = summary.commands_dispatched,
            failed = summary.commands_failed,
            "Run finished"
        );
        summary
    }

    async fn run_stage(&self, stage: &Stage) -> StageOutcome {
        let (steps, aborted) = self.plan_services(stage).await;

        let ctx = &self.ctx;
        let parallel = ctx.options.concurrency.services_in_parallel();
        let tally = fan_out(parallel, steps, |step| run_service(ctx.clone(), step))
            .await
            .into_iter()
            .sum();

        StageOutcome { tally, aborted }
    }

    /// サービスごとの実行対象を決定
    ///
    /// 戻り値の bool はステージを途中で打ち切ったかどうか。
    async fn plan_services(&self, stage: &Stage) -> (Vec<ServiceStep>, bool) {
        let ctx = &self.ctx;
        let mut steps = Vec::with_capacity(stage.services.len());

        for entry in &stage.services {
            let resolved = resolve_filter(&entry.service, &ctx.options, &ctx.env);
            let is_host = ctx.env.is_host(&entry.service);

            let containers = match ctx.directory.list(&resolved.filter).await {
                Ok(containers) => containers,
                Err(e) => {
                    warn!(service = %entry.service, error = %e, "Container lookup failed");
                    ctx.logger.diagnostic(&e.to_string());
                    Vec::new()
                }
            };

            if containers.is_empty() && !is_host {
                steps.push(ServiceStep::Unmatched);
                match ctx.options.on_unmatched {
                    // 互換のため、未マッチのサービスが1つあればステージの残りを全て中止する。
                    // サービス単位のスキップにしたい場合は UnmatchedPolicy::SkipService。
                    UnmatchedPolicy::AbortStage => {
                        warn!(
                            stage = %stage.name,
                            service = %entry.service,
                            "No container matched, skipping the rest of the stage"
                        );
                        return (steps, true);
                    }
                    UnmatchedPolicy::SkipService => continue,
                }
            }

            if !resolved.selects_service() {
                debug!(service = %entry.service, filter = %resolved.filter, "Service excluded by filter");
                continue;
            }

            let targets = if is_host {
                Targets::Host
            } else {
                Targets::Containers(containers)
            };

            steps.push(ServiceStep::Run {
                service: entry.service.clone(),
                resolved,
                commands: Arc::from(entry.commands.as_slice()),
                targets,
            });
        }

        (steps, false)
    }
}

async fn run_service(ctx: Arc<EngineContext>, step: ServiceStep) -> Tally {
    let (service, resolved, commands, targets) = match step {
        ServiceStep::Unmatched => {
            ctx.logger.log("Service: none matched!", indent::SERVICE);
            return Tally::default();
        }
        ServiceStep::Run {
            service,
            resolved,
            commands,
            targets,
        } => (service, resolved, commands, targets),
    };

    let line = if ctx.options.explicit_filter().is_some() {
        format!(
            "Service: {} [Filter = {}]",
            resolved.display, resolved.filter
        )
    } else {
        format!("Service: {}", resolved.display)
    };
    ctx.logger.status(&line, indent::SERVICE);

    match targets {
        Targets::Host => {
            debug!(service = %service, "Running on host");
            let host: ContainerHandle = Arc::new(LocalHost);
            run_commands(ctx, host, commands, false).await
        }
        Targets::Containers(containers) => {
            debug!(service = %service, containers = containers.len(), "Running on containers");
            let parallel = ctx.options.concurrency.containers_in_parallel();
            fan_out(parallel, containers, |container| {
                run_commands(ctx.clone(), container, commands.clone(), true)
            })
            .await
            .into_iter()
            .sum()
        }
    }
}

/// 1つの対象でコマンド列を順に実行
async fn run_commands(
    ctx: Arc<EngineContext>,
    target: ContainerHandle,
    commands: Arc<[String]>,
    announce: bool,
) -> Tally {
    if announce {
        ctx.logger
            .status(&format!("Container: {}", target.name()), indent::CONTAINER);
    }

    let mut tally = Tally::default();

    for raw in commands.iter() {
        let command = resolve(raw, &ctx.env);
        let missing = unresolved(&command);
        if !missing.is_empty() {
            debug!(command = %command, missing = ?missing, "Unresolved variables left in command");
        }

        ctx.logger
            .status(&format!("Command: {command}"), indent::COMMAND);

        match ctx.options.mode() {
            // ドライランはこの対象の残りのコマンドを表示せずに終了
            RunMode::DryRun => return tally,
            RunMode::Daemon => {
                tally.dispatched += 1;
                if let Err(e) = target.exec_detached(&command).await {
                    tally.failed += 1;
                    ctx.logger.output(&e.to_string());
                }
            }
            RunMode::Synchronous => {
                tally.dispatched += 1;
                match target.exec(&command).await {
                    Ok(result) => {
                        if !result.success() {
                            tally.failed += 1;
                            debug!(
                                target = %target.name(),
                                command = %command,
                                exit_code = result.exit_code,
                                "Command exited with non-zero status"
                            );
                        }
                        ctx.logger.output(&result.output);
                    }
                    Err(e) => {
                        tally.failed += 1;
                        ctx.logger.output(&e.to_string());
                    }
                }
            }
        }
    }

    tally
}
