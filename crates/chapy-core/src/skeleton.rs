//! 設定ファイルのひな形生成

use crate::model::{Stage, StagePlan};

/// 各ステージに全サービスを空のコマンド列で並べたプランを作成
///
/// 同名のステージが重複して指定された場合は最初のものだけを残します。
pub fn build_skeleton(stages: &[String], services: &[String]) -> StagePlan {
    let mut result: Vec<Stage> = Vec::with_capacity(stages.len());

    for name in stages {
        if result.iter().any(|s| &s.name == name) {
            continue;
        }
        let stage = services
            .iter()
            .fold(Stage::new(name.clone()), |stage, service| {
                if stage.commands(service).is_some() {
                    stage
                } else {
                    stage.with_service(service.clone(), Vec::new())
                }
            });
        result.push(stage);
    }

    // 重複は上で除去済み
    StagePlan::new(result).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_build_skeleton() {
        let plan = build_skeleton(
            &strings(&["configure", "run"]),
            &strings(&["shop-web-1", "shop-db-1"]),
        );

        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(
            json,
            r#"{"configure":{"shop-web-1":[],"shop-db-1":[]},"run":{"shop-web-1":[],"shop-db-1":[]}}"#
        );
    }

    #[test]
    fn test_build_skeleton_dedupes() {
        let plan = build_skeleton(&strings(&["run", "run"]), &strings(&["web", "web"]));
        assert_eq!(plan.stages().len(), 1);
        assert_eq!(plan.stages()[0].services.len(), 1);
    }

    #[test]
    fn test_build_skeleton_without_services() {
        let plan = build_skeleton(&strings(&["run"]), &[]);
        assert_eq!(serde_json::to_string(&plan).unwrap(), r#"{"run":{}}"#);
    }
}
