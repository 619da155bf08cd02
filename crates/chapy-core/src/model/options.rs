//! 実行オプション

use crate::filter::NamingConvention;
use crate::logger::verbosity;
use serde::{Deserialize, Serialize};

/// 並行度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concurrency {
    /// 全て逐次実行
    #[default]
    Sequential,
    /// コンテナごとに並行
    PerContainer,
    /// コンテナごと＋サービスごとに並行
    PerService,
}

impl Concurrency {
    /// `-t` の回数から変換（2以上は PerService）
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Sequential,
            1 => Self::PerContainer,
            _ => Self::PerService,
        }
    }

    pub fn containers_in_parallel(self) -> bool {
        self >= Self::PerContainer
    }

    pub fn services_in_parallel(self) -> bool {
        self >= Self::PerService
    }
}

/// コマンドの実行モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 表示のみ
    DryRun,
    /// デタッチ実行（出力は取得しない）
    Daemon,
    /// 同期実行（出力を取得）
    Synchronous,
}

/// コンテナが1つもマッチしないサービスの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmatchedPolicy {
    /// ステージの残りのサービスを全て中止（従来の挙動）
    #[default]
    AbortStage,
    /// そのサービスだけをスキップ
    SkipService,
}

/// 実行オプション
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// 詳細度（1: 出力, 2: ステータス）
    #[serde(default)]
    pub verbosity: u8,
    #[serde(default)]
    pub concurrency: Concurrency,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub daemon: bool,
    #[serde(default)]
    pub naming: NamingConvention,
    /// 明示的なコンテナ名フィルタ
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub on_unmatched: UnmatchedPolicy,
}

impl RunOptions {
    /// ドライランは daemon より優先
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else if self.daemon {
            RunMode::Daemon
        } else {
            RunMode::Synchronous
        }
    }

    /// ドライラン時は最低でもステータス表示
    pub fn effective_verbosity(&self) -> u8 {
        if self.dry_run {
            self.verbosity.max(verbosity::STATUS)
        } else {
            self.verbosity
        }
    }

    /// 空文字列のフィルタは未指定扱い
    pub fn explicit_filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrency_levels() {
        assert_eq!(Concurrency::from_level(0), Concurrency::Sequential);
        assert_eq!(Concurrency::from_level(1), Concurrency::PerContainer);
        assert_eq!(Concurrency::from_level(2), Concurrency::PerService);
        assert_eq!(Concurrency::from_level(5), Concurrency::PerService);

        assert!(!Concurrency::Sequential.containers_in_parallel());
        assert!(Concurrency::PerContainer.containers_in_parallel());
        assert!(!Concurrency::PerContainer.services_in_parallel());
        assert!(Concurrency::PerService.containers_in_parallel());
        assert!(Concurrency::PerService.services_in_parallel());
    }

    #[test]
    fn test_mode_priority() {
        let mut options = RunOptions::default();
        assert_eq!(options.mode(), RunMode::Synchronous);

        options.daemon = true;
        assert_eq!(options.mode(), RunMode::Daemon);

        options.dry_run = true;
        assert_eq!(options.mode(), RunMode::DryRun);
    }

    #[test]
    fn test_dry_run_forces_status_verbosity() {
        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        assert_eq!(options.effective_verbosity(), 2);

        let options = RunOptions {
            dry_run: true,
            verbosity: 3,
            ..Default::default()
        };
        assert_eq!(options.effective_verbosity(), 3);

        let options = RunOptions {
            verbosity: 1,
            ..Default::default()
        };
        assert_eq!(options.effective_verbosity(), 1);
    }
}
