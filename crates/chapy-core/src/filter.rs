//! サービス名からコンテナ名フィルタへの変換

use crate::env::RuntimeEnvironment;
use crate::model::RunOptions;
use serde::{Deserialize, Serialize};

/// compose v1/v2 の命名規則変換
///
/// 両方が有効な場合は v1 (`-`→`_`) を先に、v2 (`_`→`-`) を後に適用します。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// `-` を `_` に変換
    pub compose_v1: bool,
    /// `_` を `-` に変換
    pub compose_v2: bool,
}

impl NamingConvention {
    pub fn apply(&self, name: &str) -> String {
        let mut name = name.to_string();
        if self.compose_v1 {
            name = name.replace('-', "_");
        }
        if self.compose_v2 {
            name = name.replace('_', "-");
        }
        name
    }
}

/// 解決済みフィルタ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter {
    /// コンテナ名に対する部分一致フィルタ
    pub filter: String,
    /// 表示用のサービス名
    pub display: String,
}

impl ResolvedFilter {
    /// フィルタが表示名に含まれる場合のみ処理対象
    ///
    /// `--filter` 指定時、フィルタを含まないサービスをスキップするために使います。
    pub fn selects_service(&self) -> bool {
        self.display.contains(&self.filter)
    }
}

/// サービス名のフィルタを解決
pub fn resolve_filter(
    service: &str,
    options: &RunOptions,
    env: &RuntimeEnvironment,
) -> ResolvedFilter {
    let filter = if service == env.all_sentinel() {
        String::new()
    } else if let Some(explicit) = options.explicit_filter() {
        explicit.to_string()
    } else {
        service.to_string()
    };

    ResolvedFilter {
        filter: options.naming.apply(&filter),
        display: options.naming.apply(service),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RunOptions {
        RunOptions::default()
    }

    #[test]
    fn test_service_is_filter() {
        let env = RuntimeEnvironment::defaults();
        let resolved = resolve_filter("web", &options(), &env);
        assert_eq!(resolved.filter, "web");
        assert_eq!(resolved.display, "web");
        assert!(resolved.selects_service());
    }

    #[test]
    fn test_all_sentinel_matches_everything() {
        let env = RuntimeEnvironment::defaults();
        let mut opts = options();
        opts.filter = Some("web".to_string());

        // ALLはフィルタ指定より優先
        let resolved = resolve_filter("{{ALL}}", &opts, &env);
        assert_eq!(resolved.filter, "");
        assert_eq!(resolved.display, "{{ALL}}");
        assert!(resolved.selects_service());
    }

    #[test]
    fn test_explicit_filter() {
        let env = RuntimeEnvironment::defaults();
        let mut opts = options();
        opts.filter = Some("web".to_string());

        let resolved = resolve_filter("web-app", &opts, &env);
        assert_eq!(resolved.filter, "web");
        assert!(resolved.selects_service());

        let resolved = resolve_filter("db", &opts, &env);
        assert_eq!(resolved.filter, "web");
        assert!(!resolved.selects_service());
    }

    #[test]
    fn test_compose_v1() {
        let env = RuntimeEnvironment::defaults();
        let mut opts = options();
        opts.naming.compose_v1 = true;

        let resolved = resolve_filter("web-app", &opts, &env);
        assert_eq!(resolved.filter, "web_app");
        assert_eq!(resolved.display, "web_app");
    }

    #[test]
    fn test_compose_v2() {
        let env = RuntimeEnvironment::defaults();
        let mut opts = options();
        opts.naming.compose_v2 = true;

        let resolved = resolve_filter("web_app", &opts, &env);
        assert_eq!(resolved.filter, "web-app");
        assert_eq!(resolved.display, "web-app");
    }

    #[test]
    fn test_both_conventions_v2_last() {
        let naming = NamingConvention {
            compose_v1: true,
            compose_v2: true,
        };
        assert_eq!(naming.apply("a-b_c"), "a-b-c");
    }
}
