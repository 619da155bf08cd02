use crate::utils;
use chapy_core::RuntimeEnvironment;

/// 追跡対象の環境変数をキー順のJSONで表示
pub fn handle(env: &RuntimeEnvironment) -> anyhow::Result<()> {
    println!("{}", utils::to_json_pretty(&env.tracked(), env.indent_width())?);
    Ok(())
}
