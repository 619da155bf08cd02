//! 変数置換
//!
//! コマンド中の `{{NAME}}` を実行時環境の値で置き換えます。
//! 置換は一度の走査で行い、置換後の値は再走査しません。

use crate::env::RuntimeEnvironment;
use regex::Regex;
use std::sync::LazyLock;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("valid pattern"));

/// テンプレートを展開
///
/// 未定義の変数はそのまま残ります。
pub fn resolve(template: &str, env: &RuntimeEnvironment) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        result.push_str(&rest[..start]);
        let candidate = &rest[start + OPEN.len()..];

        let value = candidate
            .find(CLOSE)
            .and_then(|end| env.get(&candidate[..end]).map(|v| (end, v)));

        match value {
            Some((end, value)) => {
                result.push_str(value);
                rest = &candidate[end + CLOSE.len()..];
            }
            None => {
                // 一文字だけ進めて "{{{A}}}" のような入れ子にも対応
                result.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// 展開後に残っている変数名
pub fn unresolved(command: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(command)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
