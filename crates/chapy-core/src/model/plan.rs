//! ステージプラン
//!
//! `{ stage: { service: [command, ...] } }` 形式のドキュメントを、
//! ドキュメント上の順序を保ったまま表現します。

use crate::error::{CoreError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 引数から合成されるステージ名
pub const ADHOC_STAGE: &str = "run";

/// サービスと、その順序付きコマンド列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCommands {
    pub service: String,
    pub commands: Vec<String>,
}

/// ステージ定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub services: Vec<ServiceCommands>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: Vec::new(),
        }
    }

    /// サービスを追加
    pub fn with_service(mut self, service: impl Into<String>, commands: Vec<String>) -> Self {
        self.services.push(ServiceCommands {
            service: service.into(),
            commands,
        });
        self
    }

    /// サービスのコマンド列を取得
    pub fn commands(&self, service: &str) -> Option<&[String]> {
        self.services
            .iter()
            .find(|s| s.service == service)
            .map(|s| s.commands.as_slice())
    }
}

/// ステージプラン（ステージ名は一意）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    /// ステージ列から構築（重複名はエラー）
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].iter().any(|s| s.name == stage.name) {
                return Err(CoreError::InvalidPlan(format!(
                    "ステージ '{}' が重複しています",
                    stage.name
                )));
            }
        }
        Ok(Self { stages })
    }

    /// コマンドライン引数から単一ステージのプランを合成
    pub fn adhoc(service: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            stages: vec![Stage::new(ADHOC_STAGE).with_service(service, commands)],
        }
    }

    /// JSONからパース
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::InvalidPlan(e.to_string()))
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }
}

impl Serialize for StagePlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stages.len()))?;
        for stage in &self.stages {
            map.serialize_entry(&stage.name, &StageServicesRef(&stage.services))?;
        }
        map.end()
    }
}

struct StageServicesRef<'a>(&'a [ServiceCommands]);

impl Serialize for StageServicesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.service, &entry.commands)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StagePlan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PlanVisitor;

        impl<'de> Visitor<'de> for PlanVisitor {
            type Value = StagePlan;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of stage names to services")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<StagePlan, A::Error> {
                let mut stages: Vec<Stage> = Vec::new();
                while let Some((name, services)) = map.next_entry::<String, StageServices>()? {
                    if stages.iter().any(|s| s.name == name) {
                        return Err(de::Error::custom(format!("duplicate stage `{name}`")));
                    }
                    stages.push(Stage {
                        name,
                        services: services.0,
                    });
                }
                Ok(StagePlan { stages })
            }
        }

        deserializer.deserialize_map(PlanVisitor)
    }
}

struct StageServices(Vec<ServiceCommands>);

impl<'de> Deserialize<'de> for StageServices {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ServicesVisitor;

        impl<'de> Visitor<'de> for ServicesVisitor {
            type Value = StageServices;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of service names to command lists")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<StageServices, A::Error> {
                let mut services: Vec<ServiceCommands> = Vec::new();
                while let Some((service, commands)) = map.next_entry::<String, Vec<String>>()? {
                    if services.iter().any(|s| s.service == service) {
                        return Err(de::Error::custom(format!("duplicate service `{service}`")));
                    }
                    services.push(ServiceCommands { service, commands });
                }
                Ok(StageServices(services))
            }
        }

        deserializer.deserialize_map(ServicesVisitor)
    }
}
