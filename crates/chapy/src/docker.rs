use anyhow::Context;
use chapy_container::DockerDirectory;
use chapy_core::RuntimeEnvironment;

/// Docker接続とコンテナ一覧の取得
///
/// `COMPOSE_PROJECT_NAME` が設定されていればコンテナ名で絞り込みます。
pub async fn connect_directory(env: &RuntimeEnvironment) -> anyhow::Result<DockerDirectory> {
    DockerDirectory::connect(env.project_name())
        .await
        .context("Docker接続に失敗しました")
}
