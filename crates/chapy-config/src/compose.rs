//! composeファイルからサービス名を取得

use crate::error::{ConfigError, Result};
use std::path::Path;

/// `services` のキーを定義順に返す
///
/// `services` がない場合は空。
pub fn compose_services(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(ConfigError::ComposeFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let document: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidCompose {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let services = document
        .get("services")
        .and_then(|s| s.as_mapping())
        .map(|mapping| {
            mapping
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(services)
}
