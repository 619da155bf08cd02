use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定値が不正です: {key}={value}\nヒント: 数値を指定してください")]
    InvalidValue { key: String, value: String },

    #[error(
        "コマンドが指定されておらず、プランファイルも見つかりません: `{}`\n\nヒント:\n  • プランファイルのパスを引数で指定してください\n  • CHAPY_DEFFILE でデフォルトのファイル名を変更できます\n  • 引数にコマンドを直接書くこともできます",
        path.display()
    )]
    PlanNotFound { path: PathBuf },

    #[error("プランファイルの解析に失敗しました: {}\n理由: {message}", path.display())]
    InvalidPlan { path: PathBuf, message: String },

    #[error(
        "稼働中のコンテナがなく、composeファイルも見つかりません: `{}`",
        path.display()
    )]
    ComposeFileNotFound { path: PathBuf },

    #[error("composeファイルの解析に失敗しました: {}\n理由: {message}", path.display())]
    InvalidCompose { path: PathBuf, message: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
