//! コンソールロガー
//!
//! `スペーサー * インデント + 先頭文字列 + メッセージ` の形式で出力します。
//! 出力形式は互換性のため固定です（例: `====> Command: uptime`）。
//! 並行タスクから呼ばれるため、書き込みは行単位でロックします。

use crate::env::RuntimeEnvironment;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

/// インデントレベル
pub mod indent {
    pub const STAGE: usize = 0;
    pub const SERVICE: usize = 2;
    pub const CONTAINER: usize = 4;
    pub const COMMAND: usize = 6;
}

/// 詳細度の段階
pub mod verbosity {
    /// コマンド出力
    pub const OUTPUT: u8 = 1;
    /// ステージ・サービス・コンテナ・コマンドの表示
    pub const STATUS: u8 = 2;
}

type Sink = Mutex<Box<dyn Write + Send>>;

pub struct Logger {
    spacer: String,
    head: String,
    verbosity: u8,
    out: Sink,
    err: Sink,
}

impl Logger {
    /// 標準出力・標準エラーに書き込むロガー
    pub fn new(env: &RuntimeEnvironment) -> Self {
        Self::with_writers(env, std::io::stdout(), std::io::stderr())
    }

    pub fn with_writers(
        env: &RuntimeEnvironment,
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
    ) -> Self {
        Self {
            spacer: env.spacer().to_string(),
            head: env.out_head().to_string(),
            verbosity: 0,
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        }
    }

    /// 詳細度を設定
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn enabled(&self, level: u8) -> bool {
        self.verbosity >= level
    }

    /// ログ行を整形
    pub fn format(&self, message: &str, indent: usize) -> String {
        format!("{}{}{}", self.spacer.repeat(indent), self.head, message)
    }

    /// 詳細度に関係なく出力
    pub fn log(&self, message: &str, indent: usize) {
        write_line(&self.out, &self.format(message, indent));
    }

    /// ステータス行（詳細度2以上）
    pub fn status(&self, message: &str, indent: usize) {
        if self.enabled(verbosity::STATUS) {
            self.log(message, indent);
        }
    }

    /// コマンド出力（詳細度1以上）。前後の改行は取り除く
    pub fn output(&self, text: &str) {
        if self.enabled(verbosity::OUTPUT) {
            write_line(&self.out, text.trim_matches('\n'));
        }
    }

    /// 標準エラーへの診断メッセージ
    pub fn diagnostic(&self, message: &str) {
        write_line(&self.err, message);
    }
}

fn lock(sink: &Sink) -> MutexGuard<'_, Box<dyn Write + Send>> {
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_line(sink: &Sink, line: &str) {
    let mut writer = lock(sink);
    // 出力先が閉じられていても実行は継続する
    let _ = writeln!(writer, "{line}");
    let _ = writer.flush();
}

/// メモリ上に出力を溜める書き込み先
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
