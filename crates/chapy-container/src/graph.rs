//! ネットワーク構成のGraphviz DOT出力
//!
//! コンテナとネットワークをノードに、所属をエッジ（ラベルはIPアドレス）にします。

use crate::topology::Topology;
use std::collections::BTreeSet;
use std::fmt::Write;

/// ネットワークノード名の接頭辞
pub const NETWORK_PREFIX: &str = "NET:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStyle {
    /// ラベルのフォントサイズ
    pub font_size: usize,
    /// ノードの面積（ポイントの2乗）
    pub node_size: usize,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            font_size: 8,
            node_size: 200,
        }
    }
}

impl GraphStyle {
    /// ノードの幅（インチ）
    fn node_width(&self) -> f64 {
        (self.node_size as f64).sqrt() / 72.0
    }

    fn edge_font_size(&self) -> usize {
        self.font_size.saturating_sub(2).max(1)
    }
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// DOT形式で描画
pub fn render_dot(topology: &Topology, style: &GraphStyle) -> String {
    let width = style.node_width();
    let mut dot = String::new();

    // String への書き込みは失敗しない
    let _ = writeln!(dot, "graph topology {{");
    let _ = writeln!(dot, "    node [fontsize={}];", style.font_size);

    let networks: BTreeSet<&str> = topology
        .values()
        .flat_map(|c| c.networks.keys().map(String::as_str))
        .collect();

    for container in topology.keys() {
        let _ = writeln!(
            dot,
            "    {} [shape=circle, style=filled, fillcolor=green, fixedsize=true, width={width:.2}];",
            quote(container)
        );
    }
    for network in &networks {
        let _ = writeln!(
            dot,
            "    {} [shape=box, style=filled, fillcolor=grey];",
            quote(&format!("{NETWORK_PREFIX}{network}"))
        );
    }
    for (container, info) in topology {
        for (network, ip) in &info.networks {
            let _ = writeln!(
                dot,
                "    {} -- {} [label={}, fontsize={}];",
                quote(container),
                quote(&format!("{NETWORK_PREFIX}{network}")),
                quote(ip),
                style.edge_font_size()
            );
        }
    }

    dot.push_str("}\n");
    dot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::ContainerTopology;
    use std::collections::BTreeMap;

    fn topology() -> Topology {
        let mut topology = Topology::new();
        topology.insert(
            "shop-web-1".to_string(),
            ContainerTopology {
                networks: BTreeMap::from([("shop_default".to_string(), "172.18.0.2".to_string())]),
                ports: None,
            },
        );
        topology.insert(
            "shop-db-1".to_string(),
            ContainerTopology {
                networks: BTreeMap::from([
                    ("shop_default".to_string(), "172.18.0.3".to_string()),
                    ("shop_backend".to_string(), "172.19.0.2".to_string()),
                ]),
                ports: None,
            },
        );
        topology
    }

    #[test]
    fn test_render_dot() {
        let dot = render_dot(&topology(), &GraphStyle::default());

        assert!(dot.starts_with("graph topology {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("node [fontsize=8];"));
        assert!(dot.contains("\"shop-web-1\" [shape=circle"));
        assert!(dot.contains("width=0.20"));
        // 共有ネットワークは1ノード
        assert_eq!(dot.matches("\"NET:shop_default\" [shape=box").count(), 1);
        assert!(dot.contains("\"NET:shop_backend\" [shape=box"));
        assert!(dot.contains(
            "\"shop-db-1\" -- \"NET:shop_backend\" [label=\"172.19.0.2\", fontsize=6];"
        ));
        assert_eq!(dot.matches(" -- ").count(), 3);
    }

    #[test]
    fn test_style_from_values() {
        let style = GraphStyle {
            font_size: 12,
            node_size: 400,
        };
        let dot = render_dot(&topology(), &style);

        assert!(dot.contains("node [fontsize=12];"));
        assert!(dot.contains("fontsize=10];"));
        assert!(dot.contains("width=0.28"));
    }

    #[test]
    fn test_empty_topology() {
        let dot = render_dot(&Topology::new(), &GraphStyle::default());
        assert_eq!(dot, "graph topology {\n    node [fontsize=8];\n}\n");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
