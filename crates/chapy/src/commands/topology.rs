use crate::utils;
use chapy_container::{DockerDirectory, collect_topology};
use chapy_core::RuntimeEnvironment;

/// ネットワーク構成をJSONで表示
pub async fn handle(
    directory: &DockerDirectory,
    env: &RuntimeEnvironment,
    filter: &str,
    include_ports: bool,
) -> anyhow::Result<()> {
    let topology = collect_topology(directory, filter, include_ports).await?;
    println!("{}", utils::to_json_pretty(&topology, env.indent_width())?);
    Ok(())
}
