//! 実行時環境
//!
//! 組み込みデフォルト、`.env` ファイル、プロセス環境変数を一度だけ合成し、
//! 以降は読み取り専用として全コンポーネントに共有します。
//! 実行中に書き換えることはないため、並行タスクからロックなしで参照できます。

use std::collections::{BTreeMap, BTreeSet};

/// プランファイルのデフォルト名
pub const DEFFILE: &str = "CHAPY_DEFFILE";
/// composeファイルのデフォルト名
pub const DOCKYML: &str = "CHAPY_DOCKYML";
/// 全コンテナを表すサービス名
pub const ALLSERV: &str = "CHAPY_ALLSERV";
/// ホストを表すサービス名
pub const HOSTSRV: &str = "CHAPY_HOSTSRV";
/// JSON出力のインデント幅
pub const INDENTS: &str = "CHAPY_INDENTS";
/// ログのインデント文字
pub const ISPACER: &str = "CHAPY_ISPACER";
/// ログ行の先頭
pub const OUTHEAD: &str = "CHAPY_OUTHEAD";
/// グラフのフォントサイズ
pub const GPHFONT: &str = "CHAPY_GPHFONT";
/// グラフのノードサイズ
pub const GPHNODE: &str = "CHAPY_GPHNODE";
/// コンテナ一覧を絞り込むプロジェクト名
pub const PROJECT_NAME: &str = "COMPOSE_PROJECT_NAME";

/// `localhost` は常にホストとして扱う
pub const LOCALHOST: &str = "localhost";

/// 数値として解釈される設定キー
pub const NUMERIC_KEYS: &[&str] = &[INDENTS, GPHFONT, GPHNODE];

const DEFAULTS: &[(&str, &str)] = &[
    (DEFFILE, "config.json"),
    (DOCKYML, "docker-compose.yml"),
    (ALLSERV, "{{ALL}}"),
    (HOSTSRV, "{{HOST}}"),
    (INDENTS, "4"),
    (ISPACER, "="),
    (GPHFONT, "8"),
    (GPHNODE, "200"),
    (PROJECT_NAME, ""),
];

/// 実行時環境（不変）
#[derive(Debug, Clone, Default)]
pub struct RuntimeEnvironment {
    vars: BTreeMap<String, String>,
    tracked: BTreeSet<String>,
}

impl RuntimeEnvironment {
    /// 組み込みデフォルトのみの環境
    pub fn defaults() -> Self {
        Self::layered(BTreeMap::new(), std::iter::empty())
    }

    /// レイヤーを合成して環境を構築
    ///
    /// 優先順位: プロセス環境変数 > ファイル > 組み込みデフォルト。
    /// プロセス環境変数は全て置換対象になりますが、`tracked()` に含まれるのは
    /// デフォルトのキー、ファイル由来のキー、`DOCKER_` で始まるキーのみです。
    pub fn layered<I>(file: BTreeMap<String, String>, process: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: BTreeMap<String, String> = DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut tracked: BTreeSet<String> = vars.keys().cloned().collect();
        tracked.insert(OUTHEAD.to_string());

        for (key, value) in file {
            tracked.insert(key.clone());
            vars.insert(key, value);
        }

        for (key, value) in process {
            if key.starts_with("DOCKER_") {
                tracked.insert(key.clone());
            }
            vars.insert(key, value);
        }

        // 先頭文字列は実際に使われるスペーサーから導出
        if !vars.contains_key(OUTHEAD) {
            let head = format!("{}> ", vars[ISPACER]);
            vars.insert(OUTHEAD.to_string(), head);
        }

        Self { vars, tracked }
    }

    /// キーの値を取得
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// 表示対象のキーとその値
    pub fn tracked(&self) -> BTreeMap<&str, &str> {
        self.tracked
            .iter()
            .filter_map(|k| self.vars.get(k).map(|v| (k.as_str(), v.as_str())))
            .collect()
    }

    fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// 数値設定を取得
    pub fn number(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn plan_file(&self) -> &str {
        self.value(DEFFILE)
    }

    pub fn compose_file(&self) -> &str {
        self.value(DOCKYML)
    }

    pub fn all_sentinel(&self) -> &str {
        self.value(ALLSERV)
    }

    pub fn host_sentinel(&self) -> &str {
        self.value(HOSTSRV)
    }

    /// サービス名がホストを指すか
    pub fn is_host(&self, service: &str) -> bool {
        service == self.host_sentinel() || service == LOCALHOST
    }

    pub fn spacer(&self) -> &str {
        self.value(ISPACER)
    }

    pub fn out_head(&self) -> &str {
        self.value(OUTHEAD)
    }

    pub fn indent_width(&self) -> usize {
        self.number(INDENTS).unwrap_or(4)
    }

    /// 空文字列の場合は None
    pub fn project_name(&self) -> Option<&str> {
        self.get(PROJECT_NAME).filter(|v| !v.is_empty())
    }
}
