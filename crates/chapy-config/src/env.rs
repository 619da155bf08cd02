//! 実行時環境の読み込み
//!
//! 組み込みデフォルト < `.env` ファイル < プロセス環境変数 の順に合成します。

use crate::error::{ConfigError, Result};
use chapy_core::RuntimeEnvironment;
use chapy_core::env::NUMERIC_KEYS;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// 環境ファイル名
pub const ENV_FILE: &str = ".env";

/// `.env` 形式の内容をパース
///
/// 空行と `#` で始まる行はスキップし、最初の `=` で分割します。
/// 値を囲むクォート（"value" や 'value'）は除去します。
pub fn parse_env_file(content: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    warn!(line = %line, "Skipping .env line without a key");
                    continue;
                }
                vars.insert(key.to_string(), strip_quotes(value.trim()).to_string());
            }
            None => warn!(line = %line, "Skipping .env line without '='"),
        }
    }

    vars
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// ディレクトリの `.env` とプロセス環境変数から実行時環境を構築
pub fn load_environment(dir: &Path) -> Result<RuntimeEnvironment> {
    let process = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    load_environment_with(dir, process)
}

/// プロセス環境変数を明示して実行時環境を構築
#[instrument(skip(process), fields(dir = %dir.display()))]
pub fn load_environment_with<I>(dir: &Path, process: I) -> Result<RuntimeEnvironment>
where
    I: IntoIterator<Item = (String, String)>,
{
    let path = dir.join(ENV_FILE);
    let file = match std::fs::read_to_string(&path) {
        Ok(content) => {
            let vars = parse_env_file(&content);
            info!(env_file = %path.display(), variable_count = vars.len(), "Loaded .env file");
            vars
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(env_file = %path.display(), ".env file not found, using defaults");
            BTreeMap::new()
        }
        Err(e) => return Err(e.into()),
    };

    let env = RuntimeEnvironment::layered(file, process);
    validate(&env)?;
    debug!(tracked = env.tracked().len(), "Runtime environment ready");
    Ok(env)
}

/// 数値設定を検証
fn validate(env: &RuntimeEnvironment) -> Result<()> {
    for key in NUMERIC_KEYS {
        if env.number(key).is_none() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: env.get(key).unwrap_or_default().to_string(),
            });
        }
    }
    Ok(())
}
