//! Dockerによるコンテナディレクトリ
//!
//! 起動時に稼働中コンテナの一覧を一度だけ取得し、以降のフィルタは
//! その一覧に対する名前の部分一致で行います。

// Bollard 0.19 の非推奨APIを一時的に使用
#![allow(deprecated)]

use crate::error::{ContainerError, Result};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::models::ContainerInspectResponse;
use chapy_core::{ContainerDirectory, ContainerHandle, ExecOutput, ExecTarget};
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 名前がフィルタに一致するか（空フィルタは全て一致）
pub fn name_matches(name: &str, filter: &str) -> bool {
    filter.is_empty() || name.contains(filter)
}

/// 稼働中コンテナの参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

/// Docker接続を初期化（接続テスト付き）
pub async fn connect_docker() -> Result<Docker> {
    let docker = Docker::connect_with_local_defaults()
        .map_err(|e| ContainerError::DockerConnectionFailed(e.to_string()))?;
    docker
        .ping()
        .await
        .map_err(|e| ContainerError::DockerConnectionFailed(e.to_string()))?;
    Ok(docker)
}

/// 稼働中コンテナの一覧
pub struct DockerDirectory {
    docker: Docker,
    containers: Vec<ContainerRef>,
}

impl DockerDirectory {
    /// Dockerに接続して稼働中コンテナを取得
    ///
    /// `project` が指定された場合はコンテナ名で絞り込みます。
    #[instrument]
    pub async fn connect(project: Option<&str>) -> Result<Self> {
        let docker = connect_docker().await?;
        let containers = list_running(&docker, project).await?;
        info!(count = containers.len(), "Running containers listed");
        Ok(Self { docker, containers })
    }

    pub fn containers(&self) -> &[ContainerRef] {
        &self.containers
    }

    /// フィルタに一致するコンテナ
    pub fn matching(&self, filter: &str) -> Vec<&ContainerRef> {
        self.containers
            .iter()
            .filter(|c| name_matches(&c.name, filter))
            .collect()
    }

    pub async fn inspect(&self, name: &str) -> Result<ContainerInspectResponse> {
        let inspect = self
            .docker
            .inspect_container(
                name,
                None::<bollard::query_parameters::InspectContainerOptions>,
            )
            .await?;
        Ok(inspect)
    }

    /// コンテナのホスト名
    pub async fn hostname(&self, name: &str) -> Result<Option<String>> {
        let inspect = self.inspect(name).await?;
        Ok(inspect.config.and_then(|c| c.hostname))
    }
}

async fn list_running(docker: &Docker, project: Option<&str>) -> Result<Vec<ContainerRef>> {
    let mut filters: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(project) = project {
        filters.insert("name".to_string(), vec![project.to_string()]);
    }

    let options = bollard::container::ListContainersOptions {
        all: false,
        filters,
        ..Default::default()
    };

    let summaries = docker.list_containers(Some(options)).await?;

    Ok(summaries
        .into_iter()
        .filter_map(|summary| {
            let name = summary
                .names
                .as_ref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/').to_string())?;
            Some(ContainerRef {
                id: summary.id.unwrap_or_else(|| name.clone()),
                name,
            })
        })
        .collect())
}

#[async_trait]
impl ContainerDirectory for DockerDirectory {
    async fn list(&self, filter: &str) -> chapy_core::Result<Vec<ContainerHandle>> {
        Ok(self
            .matching(filter)
            .into_iter()
            .map(|c| {
                Arc::new(DockerContainer {
                    docker: self.docker.clone(),
                    container: c.clone(),
                }) as ContainerHandle
            })
            .collect())
    }
}

/// コマンド実行対象としてのコンテナ
pub struct DockerContainer {
    docker: Docker,
    container: ContainerRef,
}

impl DockerContainer {
    fn shell(command: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), command.to_string()]
    }

    async fn run_attached(&self, command: &str) -> Result<ExecOutput> {
        let exec_config = CreateExecOptions {
            cmd: Some(Self::shell(command)),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };
        let message = self
            .docker
            .create_exec(&self.container.id, exec_config)
            .await?;

        let mut combined = String::new();
        match self
            .docker
            .start_exec(&message.id, Some(StartExecOptions::default()))
            .await?
        {
            StartExecResults::Attached { mut output, .. } => {
                while let Some(msg) = output.next().await {
                    match msg? {
                        LogOutput::StdOut { message }
                        | LogOutput::StdErr { message }
                        | LogOutput::Console { message } => {
                            combined.push_str(&String::from_utf8_lossy(&message));
                        }
                        LogOutput::StdIn { .. } => {}
                    }
                }
            }
            StartExecResults::Detached => {}
        }

        let inspect = self.docker.inspect_exec(&message.id).await?;
        let exit_code = inspect.exit_code.unwrap_or_default();
        debug!(container = %self.container.name, command = %command, exit_code, "Exec finished");

        Ok(ExecOutput::new(exit_code, combined))
    }

    async fn run_detached(&self, command: &str) -> Result<()> {
        let exec_config = CreateExecOptions {
            cmd: Some(Self::shell(command)),
            attach_stdout: Some(false),
            attach_stderr: Some(false),
            ..Default::default()
        };
        let message = self
            .docker
            .create_exec(&self.container.id, exec_config)
            .await?;

        let start_config = StartExecOptions {
            detach: true,
            ..Default::default()
        };
        self.docker
            .start_exec(&message.id, Some(start_config))
            .await?;

        debug!(container = %self.container.name, command = %command, "Exec detached");
        Ok(())
    }
}

#[async_trait]
impl ExecTarget for DockerContainer {
    fn name(&self) -> &str {
        &self.container.name
    }

    async fn exec(&self, command: &str) -> chapy_core::Result<ExecOutput> {
        self.run_attached(command)
            .await
            .map_err(|e| e.into_core(&self.container.name))
    }

    async fn exec_detached(&self, command: &str) -> chapy_core::Result<()> {
        self.run_detached(command)
            .await
            .map_err(|e| e.into_core(&self.container.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches() {
        assert!(name_matches("shop-web-1", ""));
        assert!(name_matches("shop-web-1", "web"));
        assert!(name_matches("shop-web-1", "shop-web-1"));
        assert!(!name_matches("shop-web-1", "db"));
        assert!(!name_matches("shop-web-1", "web_1"));
    }

    #[test]
    fn test_shell_command() {
        assert_eq!(
            DockerContainer::shell("echo a && echo b"),
            vec!["sh", "-c", "echo a && echo b"]
        );
    }
}
