use chapy_container::DockerDirectory;
use chapy_core::logger::verbosity;

/// フィルタに一致するコンテナ名を表示
///
/// `-v` でホスト名を併記します。
pub async fn handle(directory: &DockerDirectory, filter: &str, verbose: u8) -> anyhow::Result<()> {
    let mut names = Vec::new();
    for container in directory.matching(filter) {
        if verbose >= verbosity::OUTPUT {
            let hostname = directory.hostname(&container.name).await?;
            names.push(format!(
                "{}\t[{}]",
                container.name,
                hostname.unwrap_or_default()
            ));
        } else {
            names.push(container.name.clone());
        }
    }

    if verbose >= verbosity::STATUS {
        if directory.containers().is_empty() {
            println!("no running containers found");
        } else if names.is_empty() {
            println!("no running containers found matching filter: `{filter}'");
        }
    }

    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}
