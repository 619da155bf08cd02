//! コンテナのネットワーク構成

use crate::docker::DockerDirectory;
use crate::error::Result;
use bollard::models::ContainerInspectResponse;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

/// 1コンテナ分のネットワーク情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerTopology {
    /// ネットワーク名 -> IPアドレス
    #[serde(rename = "Networks")]
    pub networks: BTreeMap<String, String>,
    /// コンテナポート -> "host_ip:host_port" の一覧（未公開は null）
    #[serde(rename = "Ports", skip_serializing_if = "Option::is_none")]
    pub ports: Option<BTreeMap<String, Option<Vec<String>>>>,
}

/// コンテナ名 -> ネットワーク情報
pub type Topology = BTreeMap<String, ContainerTopology>;

impl ContainerTopology {
    pub fn from_inspect(inspect: &ContainerInspectResponse, include_ports: bool) -> Self {
        let settings = inspect.network_settings.as_ref();

        let networks = settings
            .and_then(|s| s.networks.as_ref())
            .map(|networks| {
                networks
                    .iter()
                    .map(|(name, endpoint)| {
                        (name.clone(), endpoint.ip_address.clone().unwrap_or_default())
                    })
                    .collect()
            })
            .unwrap_or_default();

        let ports = include_ports.then(|| {
            settings
                .and_then(|s| s.ports.as_ref())
                .map(|ports| {
                    ports
                        .iter()
                        .map(|(port, bindings)| {
                            let bindings = bindings.as_ref().map(|bindings| {
                                bindings
                                    .iter()
                                    .map(|b| {
                                        format!(
                                            "{}:{}",
                                            b.host_ip.as_deref().unwrap_or_default(),
                                            b.host_port.as_deref().unwrap_or_default()
                                        )
                                    })
                                    .collect()
                            });
                            (port.clone(), bindings)
                        })
                        .collect()
                })
                .unwrap_or_default()
        });

        Self { networks, ports }
    }
}

/// フィルタに一致するコンテナのネットワーク構成を収集
#[instrument(skip(directory))]
pub async fn collect_topology(
    directory: &DockerDirectory,
    filter: &str,
    include_ports: bool,
) -> Result<Topology> {
    let mut topology = Topology::new();
    for container in directory.matching(filter) {
        let inspect = directory.inspect(&container.name).await?;
        topology.insert(
            container.name.clone(),
            ContainerTopology::from_inspect(&inspect, include_ports),
        );
    }
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{EndpointSettings, NetworkSettings, PortBinding};
    use std::collections::HashMap;

    fn inspect() -> ContainerInspectResponse {
        ContainerInspectResponse {
            network_settings: Some(NetworkSettings {
                networks: Some(HashMap::from([
                    (
                        "shop_default".to_string(),
                        EndpointSettings {
                            ip_address: Some("172.18.0.2".to_string()),
                            ..Default::default()
                        },
                    ),
                    (
                        "shop_backend".to_string(),
                        EndpointSettings {
                            ip_address: Some("172.19.0.3".to_string()),
                            ..Default::default()
                        },
                    ),
                ])),
                ports: Some(HashMap::from([
                    (
                        "80/tcp".to_string(),
                        Some(vec![PortBinding {
                            host_ip: Some("0.0.0.0".to_string()),
                            host_port: Some("8080".to_string()),
                        }]),
                    ),
                    ("443/tcp".to_string(), None),
                ])),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_networks_only() {
        let topology = ContainerTopology::from_inspect(&inspect(), false);

        assert_eq!(topology.networks.len(), 2);
        assert_eq!(topology.networks["shop_default"], "172.18.0.2");
        assert!(topology.ports.is_none());

        let json = serde_json::to_value(&topology).unwrap();
        assert_eq!(json["Networks"]["shop_backend"], "172.19.0.3");
        assert!(json.get("Ports").is_none());
    }

    #[test]
    fn test_with_ports() {
        let topology = ContainerTopology::from_inspect(&inspect(), true);
        let ports = topology.ports.as_ref().unwrap();

        assert_eq!(ports["80/tcp"], Some(vec!["0.0.0.0:8080".to_string()]));
        assert_eq!(ports["443/tcp"], None);

        let json = serde_json::to_value(&topology).unwrap();
        assert_eq!(json["Ports"]["80/tcp"][0], "0.0.0.0:8080");
        assert!(json["Ports"]["443/tcp"].is_null());
    }

    #[test]
    fn test_missing_network_settings() {
        let topology = ContainerTopology::from_inspect(&ContainerInspectResponse::default(), true);
        assert!(topology.networks.is_empty());
        assert_eq!(topology.ports, Some(BTreeMap::new()));
    }
}
