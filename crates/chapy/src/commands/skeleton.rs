use crate::utils;
use chapy_config::compose_services;
use chapy_container::DockerDirectory;
use chapy_core::{RuntimeEnvironment, build_skeleton};
use std::path::Path;
use tracing::info;

/// 設定ファイルのひな形を出力
///
/// 稼働中のコンテナがなければcomposeファイルのサービス名を使います。
pub fn handle(
    directory: &DockerDirectory,
    env: &RuntimeEnvironment,
    stages: &[String],
    filter: &str,
) -> anyhow::Result<()> {
    let mut services: Vec<String> = directory
        .matching(filter)
        .into_iter()
        .map(|c| c.name.clone())
        .collect();
    services.sort();

    if services.is_empty() {
        let compose = Path::new(env.compose_file());
        info!(compose = %compose.display(), "No running containers, reading compose file");
        services = compose_services(compose)?;
    }

    let plan = build_skeleton(stages, &services);
    println!("{}", utils::to_json_pretty(&plan, env.indent_width())?);
    Ok(())
}
