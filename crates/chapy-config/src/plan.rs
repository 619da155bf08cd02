//! プランファイルの読み込み
//!
//! 1. 最初の引数（なければ `CHAPY_DEFFILE`）をプランファイルとして読み込む
//! 2. ファイルが存在せず引数がある場合は、引数をコマンド列として `run` ステージを合成
//! 3. どちらもなければエラー

use crate::error::{ConfigError, Result};
use chapy_core::{RuntimeEnvironment, StagePlan};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// プランの出どころ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    File(PathBuf),
    /// コマンドライン引数から合成
    Arguments,
}

/// 読み込み済みプラン
#[derive(Debug, Clone)]
pub struct LoadedPlan {
    pub plan: StagePlan,
    pub source: PlanSource,
}

impl LoadedPlan {
    /// 実行するステージ
    ///
    /// 引数から合成した場合は常に `run` のみ。
    pub fn stages(&self, requested: &[String]) -> Vec<String> {
        match self.source {
            PlanSource::File(_) => requested.to_vec(),
            PlanSource::Arguments => self.plan.stage_names().map(str::to_string).collect(),
        }
    }
}

/// 拡張子に応じてJSONまたはYAMLとして読み込む
#[instrument]
pub fn load_plan_file(path: &Path) -> Result<StagePlan> {
    let content = std::fs::read_to_string(path)?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );

    let plan = if is_yaml {
        serde_yaml::from_str::<StagePlan>(&content).map_err(|e| ConfigError::InvalidPlan {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        StagePlan::from_json(&content).map_err(|e| ConfigError::InvalidPlan {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    info!(stages = plan.stages().len(), "Plan file loaded");
    Ok(plan)
}

/// 引数と環境からプランを決定
pub fn resolve_plan(
    args: &[String],
    env: &RuntimeEnvironment,
    filter: Option<&str>,
) -> Result<LoadedPlan> {
    let path = PathBuf::from(
        args.first()
            .map(String::as_str)
            .unwrap_or_else(|| env.plan_file()),
    );

    if path.is_file() {
        let plan = load_plan_file(&path)?;
        return Ok(LoadedPlan {
            plan,
            source: PlanSource::File(path),
        });
    }

    if args.is_empty() {
        return Err(ConfigError::PlanNotFound { path });
    }

    let service = filter
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| env.all_sentinel());
    info!(service = %service, commands = args.len(), "Building plan from arguments");

    Ok(LoadedPlan {
        plan: StagePlan::adhoc(service, args.to_vec()),
        source: PlanSource::Arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapy_core::ADHOC_STAGE;
    use std::fs;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stages.json");
        fs::write(&path, r#"{"configure": {"web": ["echo 1"]}, "run": {}}"#).unwrap();

        let loaded = resolve_plan(
            &strings(&[path.to_str().unwrap()]),
            &RuntimeEnvironment::defaults(),
            None,
        )
        .unwrap();

        assert_eq!(loaded.source, PlanSource::File(path));
        let names: Vec<&str> = loaded.plan.stage_names().collect();
        assert_eq!(names, vec!["configure", "run"]);
        assert_eq!(
            loaded.stages(&strings(&["run"])),
            vec!["run".to_string()]
        );
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stages.yml");
        fs::write(&path, "run:\n  web:\n    - echo 1\n    - echo 2\n").unwrap();

        let plan = load_plan_file(&path).unwrap();
        assert_eq!(
            plan.stage("run").unwrap().commands("web").unwrap(),
            ["echo 1", "echo 2"]
        );
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"run": {"web": "echo"}"#).unwrap();

        let result = resolve_plan(
            &strings(&[path.to_str().unwrap(), "uptime"]),
            &RuntimeEnvironment::defaults(),
            None,
        );
        assert!(matches!(result, Err(ConfigError::InvalidPlan { .. })));
    }

    #[test]
    fn test_arguments_become_run_stage() {
        let loaded = resolve_plan(
            &strings(&["uptime", "df -h"]),
            &RuntimeEnvironment::defaults(),
            None,
        )
        .unwrap();

        assert_eq!(loaded.source, PlanSource::Arguments);
        let stage = loaded.plan.stage(ADHOC_STAGE).unwrap();
        assert_eq!(stage.commands("{{ALL}}").unwrap(), ["uptime", "df -h"]);
        assert_eq!(
            loaded.stages(&strings(&["configure", "run"])),
            vec!["run".to_string()]
        );
    }

    #[test]
    fn test_arguments_use_filter_as_service() {
        let loaded = resolve_plan(
            &strings(&["uptime"]),
            &RuntimeEnvironment::defaults(),
            Some("web"),
        )
        .unwrap();

        let stage = loaded.plan.stage(ADHOC_STAGE).unwrap();
        assert_eq!(stage.commands("web").unwrap(), ["uptime"]);
    }

    #[test]
    fn test_no_plan_and_no_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.json");
        let file = std::collections::BTreeMap::from([(
            "CHAPY_DEFFILE".to_string(),
            missing.to_str().unwrap().to_string(),
        )]);
        let env = RuntimeEnvironment::layered(file, std::iter::empty());

        let result = resolve_plan(&[], &env, None);
        match result {
            Err(ConfigError::PlanNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected PlanNotFound, got {other:?}"),
        }
    }
}
