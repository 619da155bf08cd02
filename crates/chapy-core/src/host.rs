//! ローカルホストでのコマンド実行

use crate::error::{CoreError, Result};
use crate::target::{ExecOutput, ExecTarget};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// ホストの表示名
pub const HOST_NAME: &str = "localhost";

/// ローカルホスト（`sh -c` で実行）
#[derive(Debug, Clone, Default)]
pub struct LocalHost;

impl LocalHost {
    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }
}

#[async_trait]
impl ExecTarget for LocalHost {
    fn name(&self) -> &str {
        HOST_NAME
    }

    async fn exec(&self, command: &str) -> Result<ExecOutput> {
        // stderr を stdout に向けて出力順を保つ
        let script = format!("exec 2>&1\n{command}");
        let output = Self::shell(&script)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CoreError::SpawnFailed {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let exit_code = output.status.code().map(i64::from).unwrap_or(-1);
        debug!(command = %command, exit_code, "Host command finished");

        Ok(ExecOutput::new(
            exit_code,
            String::from_utf8_lossy(&output.stdout),
        ))
    }

    async fn exec_detached(&self, command: &str) -> Result<()> {
        let child = Self::shell(command)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| CoreError::SpawnFailed {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        debug!(command = %command, pid = ?child.id(), "Host command detached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exec_captures_combined_output() {
        let output = LocalHost
            .exec("echo out; echo err 1>&2; echo done")
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.output, "out\nerr\ndone\n");
    }

    #[tokio::test]
    async fn test_exec_reports_exit_code() {
        let output = LocalHost.exec("echo failing; exit 3").await.unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.output, "failing\n");
    }

    #[tokio::test]
    async fn test_exec_detached_returns_immediately() {
        // 終了を待つ実装ならタイムアウトする
        tokio::time::timeout(
            std::time::Duration::from_secs(10),
            LocalHost.exec_detached("sleep 60"),
        )
        .await
        .expect("detached exec should not wait for the command")
        .unwrap();
    }
}
