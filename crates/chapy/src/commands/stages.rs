use chapy_config::load_plan_file;
use chapy_core::RuntimeEnvironment;
use std::path::PathBuf;

/// プランファイルのステージ名を定義順に表示
pub fn handle(args: &[String], env: &RuntimeEnvironment) -> anyhow::Result<()> {
    let path = PathBuf::from(
        args.first()
            .map(String::as_str)
            .unwrap_or_else(|| env.plan_file()),
    );
    if !path.is_file() {
        return Err(chapy_config::ConfigError::PlanNotFound { path }.into());
    }

    let plan = load_plan_file(&path)?;
    for name in plan.stage_names() {
        println!("{name}");
    }
    Ok(())
}
