use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("プランの形式が不正です: {0}")]
    InvalidPlan(String),

    #[error("コマンドを起動できません: {command}\n理由: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("'{target}' でのコマンド実行に失敗しました: {message}")]
    ExecFailed { target: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
