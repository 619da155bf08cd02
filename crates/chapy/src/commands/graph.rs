use chapy_container::{DockerDirectory, GraphStyle, collect_topology, render_dot};
use chapy_core::RuntimeEnvironment;
use chapy_core::env::{GPHFONT, GPHNODE};

/// ネットワーク構成をDOT形式で出力
///
/// 画像化は `cha -G | dot -Tpng -o topology.png` のように行います。
pub async fn handle(
    directory: &DockerDirectory,
    env: &RuntimeEnvironment,
    filter: &str,
) -> anyhow::Result<()> {
    let defaults = GraphStyle::default();
    let style = GraphStyle {
        font_size: env.number(GPHFONT).unwrap_or(defaults.font_size),
        node_size: env.number(GPHNODE).unwrap_or(defaults.node_size),
    };

    let topology = collect_topology(directory, filter, false).await?;
    print!("{}", render_dot(&topology, &style));
    Ok(())
}
