//! 実行対象とコンテナディレクトリ
//!
//! コアはコンテナの発見方法を知りません。`ContainerDirectory` が返す
//! `ExecTarget` に対してコマンドを実行するだけです。

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 同期実行の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i64,
    /// 標準出力と標準エラーを結合した出力
    pub output: String,
}

impl ExecOutput {
    pub fn new(exit_code: i64, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// コマンドの実行対象（コンテナまたはホスト）
#[async_trait]
pub trait ExecTarget: Send + Sync {
    /// 表示名
    fn name(&self) -> &str;

    /// 完了まで待機し、結合出力を取得
    async fn exec(&self, command: &str) -> Result<ExecOutput>;

    /// 完了を待たずに実行
    async fn exec_detached(&self, command: &str) -> Result<()>;
}

pub type ContainerHandle = Arc<dyn ExecTarget>;

/// 稼働中コンテナの一覧
#[async_trait]
pub trait ContainerDirectory: Send + Sync {
    /// 名前に `filter` を含むコンテナ（空文字列なら全て）
    async fn list(&self, filter: &str) -> Result<Vec<ContainerHandle>>;
}
